use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::models::{
    Capacity, HackathonTeam, HackathonTeamMate, NewMate, NewSubmission, Removal, Submission, Team,
    TeamInvite, TeamMate,
};
use super::store::{BrandTeamStore, HackathonTeamStore, InviteStore, StoreError, SubmissionStore};

/// First key of the two-key advisory lock serialising roster growth per hackathon.
const REGISTRY_LOCK_NAMESPACE: i32 = 0x7465_616d;

const MATE_COLUMNS: &str = "team_id, user_id, is_captain, role_desc";
const HACKATHON_MATE_COLUMNS: &str = "team_id, hackathon_id, user_id, is_captain, role_desc";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn lock_hackathon(
    tx: &mut Transaction<'_, Postgres>,
    hackathon_id: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(REGISTRY_LOCK_NAMESPACE)
        .bind(hackathon_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

async fn participants_in(
    tx: &mut Transaction<'_, Postgres>,
    hackathon_id: i32,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM hackathon_team_mates WHERE hackathon_id = $1")
        .bind(hackathon_id)
        .fetch_one(&mut **tx)
        .await
}

#[async_trait]
impl BrandTeamStore for PgStore {
    async fn create_team_with_captain(
        &self,
        name: &str,
        captain_user_id: i32,
    ) -> Result<(Team, TeamMate), StoreError> {
        let mut tx = self.pool.begin().await?;

        let team: Team = sqlx::query_as("INSERT INTO teams (name) VALUES ($1) RETURNING id, name")
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        let captain: TeamMate = sqlx::query_as(&format!(
            "INSERT INTO team_mates (team_id, user_id, is_captain)
             VALUES ($1, $2, TRUE)
             RETURNING {MATE_COLUMNS}"
        ))
        .bind(team.id)
        .bind(captain_user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((team, captain))
    }

    async fn find_team(&self, team_id: i32) -> Result<Option<Team>, StoreError> {
        Ok(sqlx::query_as("SELECT id, name FROM teams WHERE id = $1")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        Ok(sqlx::query_as("SELECT id, name FROM teams ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn rename_team(&self, team_id: i32, name: &str) -> Result<Option<Team>, StoreError> {
        Ok(
            sqlx::query_as("UPDATE teams SET name = $2 WHERE id = $1 RETURNING id, name")
                .bind(team_id)
                .bind(name)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn delete_team(&self, team_id: i32) -> Result<bool, StoreError> {
        let rows = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(team_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn find_mate(&self, user_id: i32) -> Result<Option<TeamMate>, StoreError> {
        Ok(sqlx::query_as(&format!(
            "SELECT {MATE_COLUMNS} FROM team_mates WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_mates(&self, team_id: i32) -> Result<Vec<TeamMate>, StoreError> {
        Ok(sqlx::query_as(&format!(
            "SELECT {MATE_COLUMNS} FROM team_mates WHERE team_id = $1 ORDER BY user_id"
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_captains(&self, team_id: i32) -> Result<Vec<TeamMate>, StoreError> {
        Ok(sqlx::query_as(&format!(
            "SELECT {MATE_COLUMNS} FROM team_mates
              WHERE team_id = $1 AND is_captain
              ORDER BY user_id"
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn count_mates(&self, team_id: i32) -> Result<i64, StoreError> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM team_mates WHERE team_id = $1")
                .bind(team_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn insert_mate(&self, team_id: i32, mate: NewMate) -> Result<TeamMate, StoreError> {
        Ok(sqlx::query_as(&format!(
            "INSERT INTO team_mates (team_id, user_id, is_captain, role_desc)
             VALUES ($1, $2, $3, $4)
             RETURNING {MATE_COLUMNS}"
        ))
        .bind(team_id)
        .bind(mate.user_id)
        .bind(mate.is_captain)
        .bind(mate.role_desc)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn set_mate_captain(
        &self,
        user_id: i32,
        is_captain: bool,
    ) -> Result<Option<TeamMate>, StoreError> {
        Ok(sqlx::query_as(&format!(
            "UPDATE team_mates SET is_captain = $2 WHERE user_id = $1 RETURNING {MATE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(is_captain)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_mate_role(
        &self,
        user_id: i32,
        role_desc: Option<&str>,
    ) -> Result<Option<TeamMate>, StoreError> {
        Ok(sqlx::query_as(&format!(
            "UPDATE team_mates SET role_desc = $2 WHERE user_id = $1 RETURNING {MATE_COLUMNS}"
        ))
        .bind(user_id)
        .bind(role_desc)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn remove_mate(
        &self,
        user_id: i32,
    ) -> Result<Option<Removal<TeamMate, Team>>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let team_id: Option<i32> =
            sqlx::query_scalar("SELECT team_id FROM team_mates WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(team_id) = team_id else {
            return Ok(None);
        };

        // Serialise concurrent removals from the same team.
        sqlx::query("SELECT id FROM teams WHERE id = $1 FOR UPDATE")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        let mate: Option<TeamMate> = sqlx::query_as(&format!(
            "DELETE FROM team_mates WHERE user_id = $1 RETURNING {MATE_COLUMNS}"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(mate) = mate else {
            return Ok(None);
        };

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM team_mates WHERE team_id = $1")
            .bind(mate.team_id)
            .fetch_one(&mut *tx)
            .await?;

        let dissolved = if remaining == 0 {
            sqlx::query_as("DELETE FROM teams WHERE id = $1 RETURNING id, name")
                .bind(mate.team_id)
                .fetch_optional(&mut *tx)
                .await?
        } else {
            None
        };

        tx.commit().await?;
        Ok(Some(Removal { mate, dissolved }))
    }
}

#[async_trait]
impl InviteStore for PgStore {
    async fn insert_invite(&self, team_id: i32, user_id: i32) -> Result<TeamInvite, StoreError> {
        Ok(sqlx::query_as(
            "INSERT INTO team_invites (team_id, user_id) VALUES ($1, $2)
             RETURNING team_id, user_id",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_invite(
        &self,
        team_id: i32,
        user_id: i32,
    ) -> Result<Option<TeamInvite>, StoreError> {
        Ok(sqlx::query_as(
            "SELECT team_id, user_id FROM team_invites WHERE team_id = $1 AND user_id = $2",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn invites_for_user(&self, user_id: i32) -> Result<Vec<TeamInvite>, StoreError> {
        Ok(sqlx::query_as(
            "SELECT team_id, user_id FROM team_invites WHERE user_id = $1 ORDER BY team_id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete_invite(&self, team_id: i32, user_id: i32) -> Result<bool, StoreError> {
        let rows = sqlx::query("DELETE FROM team_invites WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(rows > 0)
    }

    async fn delete_invites_for_user(&self, user_id: i32) -> Result<u64, StoreError> {
        Ok(sqlx::query("DELETE FROM team_invites WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected())
    }
}

#[async_trait]
impl HackathonTeamStore for PgStore {
    async fn register_team(
        &self,
        hackathon_id: i32,
        name: &str,
        mates: &[NewMate],
        capacity: Capacity,
    ) -> Result<(HackathonTeam, Vec<HackathonTeamMate>), StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_hackathon(&mut tx, hackathon_id).await?;

        let registered = participants_in(&mut tx, hackathon_id).await?;
        capacity
            .check(mates.len() as i64, registered + mates.len() as i64)
            .map_err(StoreError::Capacity)?;

        let team: HackathonTeam = sqlx::query_as(
            "INSERT INTO hackathon_teams (hackathon_id, name) VALUES ($1, $2)
             RETURNING id, hackathon_id, name",
        )
        .bind(hackathon_id)
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        let mut rows = Vec::with_capacity(mates.len());
        for mate in mates {
            let row: HackathonTeamMate = sqlx::query_as(&format!(
                "INSERT INTO hackathon_team_mates
                        (team_id, hackathon_id, user_id, is_captain, role_desc)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING {HACKATHON_MATE_COLUMNS}"
            ))
            .bind(team.id)
            .bind(hackathon_id)
            .bind(mate.user_id)
            .bind(mate.is_captain)
            .bind(mate.role_desc.as_deref())
            .fetch_one(&mut *tx)
            .await?;
            rows.push(row);
        }

        tx.commit().await?;
        Ok((team, rows))
    }

    async fn add_mate(
        &self,
        team: &HackathonTeam,
        mate: NewMate,
        capacity: Capacity,
    ) -> Result<HackathonTeamMate, StoreError> {
        let mut tx = self.pool.begin().await?;
        lock_hackathon(&mut tx, team.hackathon_id).await?;

        let team_size: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM hackathon_team_mates WHERE team_id = $1")
                .bind(team.id)
                .fetch_one(&mut *tx)
                .await?;
        let registered = participants_in(&mut tx, team.hackathon_id).await?;
        capacity
            .check(team_size + 1, registered + 1)
            .map_err(StoreError::Capacity)?;

        let row: HackathonTeamMate = sqlx::query_as(&format!(
            "INSERT INTO hackathon_team_mates
                    (team_id, hackathon_id, user_id, is_captain, role_desc)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {HACKATHON_MATE_COLUMNS}"
        ))
        .bind(team.id)
        .bind(team.hackathon_id)
        .bind(mate.user_id)
        .bind(mate.is_captain)
        .bind(mate.role_desc)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn find_team(&self, team_id: i32) -> Result<Option<HackathonTeam>, StoreError> {
        Ok(
            sqlx::query_as("SELECT id, hackathon_id, name FROM hackathon_teams WHERE id = $1")
                .bind(team_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn teams_for_hackathon(
        &self,
        hackathon_id: i32,
    ) -> Result<Vec<HackathonTeam>, StoreError> {
        Ok(sqlx::query_as(
            "SELECT id, hackathon_id, name FROM hackathon_teams
              WHERE hackathon_id = $1
              ORDER BY id",
        )
        .bind(hackathon_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn teams_by_ids(&self, team_ids: &[i32]) -> Result<Vec<HackathonTeam>, StoreError> {
        Ok(sqlx::query_as(
            "SELECT id, hackathon_id, name FROM hackathon_teams WHERE id = ANY($1) ORDER BY id",
        )
        .bind(team_ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn team_name_taken(&self, name: &str, hackathon_id: i32) -> Result<bool, StoreError> {
        Ok(sqlx::query_scalar(
            "SELECT EXISTS(
                 SELECT 1 FROM hackathon_teams WHERE name = $1 AND hackathon_id = $2
             )",
        )
        .bind(name)
        .bind(hackathon_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_mate(
        &self,
        user_id: i32,
        hackathon_id: i32,
    ) -> Result<Option<HackathonTeamMate>, StoreError> {
        Ok(sqlx::query_as(&format!(
            "SELECT {HACKATHON_MATE_COLUMNS} FROM hackathon_team_mates
              WHERE user_id = $1 AND hackathon_id = $2"
        ))
        .bind(user_id)
        .bind(hackathon_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn mates_of_user(&self, user_id: i32) -> Result<Vec<HackathonTeamMate>, StoreError> {
        Ok(sqlx::query_as(&format!(
            "SELECT {HACKATHON_MATE_COLUMNS} FROM hackathon_team_mates
              WHERE user_id = $1
              ORDER BY hackathon_id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_mates(&self, team_id: i32) -> Result<Vec<HackathonTeamMate>, StoreError> {
        Ok(sqlx::query_as(&format!(
            "SELECT {HACKATHON_MATE_COLUMNS} FROM hackathon_team_mates
              WHERE team_id = $1
              ORDER BY user_id"
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn list_captains(&self, team_id: i32) -> Result<Vec<HackathonTeamMate>, StoreError> {
        Ok(sqlx::query_as(&format!(
            "SELECT {HACKATHON_MATE_COLUMNS} FROM hackathon_team_mates
              WHERE team_id = $1 AND is_captain
              ORDER BY user_id"
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn count_mates(&self, team_id: i32) -> Result<i64, StoreError> {
        Ok(
            sqlx::query_scalar("SELECT COUNT(*) FROM hackathon_team_mates WHERE team_id = $1")
                .bind(team_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn count_participants(&self, hackathon_id: i32) -> Result<i64, StoreError> {
        Ok(sqlx::query_scalar(
            "SELECT COUNT(*) FROM hackathon_team_mates WHERE hackathon_id = $1",
        )
        .bind(hackathon_id)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn set_mate_captain(
        &self,
        hackathon_id: i32,
        user_id: i32,
        is_captain: bool,
    ) -> Result<Option<HackathonTeamMate>, StoreError> {
        Ok(sqlx::query_as(&format!(
            "UPDATE hackathon_team_mates SET is_captain = $3
              WHERE hackathon_id = $1 AND user_id = $2
              RETURNING {HACKATHON_MATE_COLUMNS}"
        ))
        .bind(hackathon_id)
        .bind(user_id)
        .bind(is_captain)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_mate_role(
        &self,
        hackathon_id: i32,
        user_id: i32,
        role_desc: Option<&str>,
    ) -> Result<Option<HackathonTeamMate>, StoreError> {
        Ok(sqlx::query_as(&format!(
            "UPDATE hackathon_team_mates SET role_desc = $3
              WHERE hackathon_id = $1 AND user_id = $2
              RETURNING {HACKATHON_MATE_COLUMNS}"
        ))
        .bind(hackathon_id)
        .bind(user_id)
        .bind(role_desc)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn remove_mate(
        &self,
        hackathon_id: i32,
        user_id: i32,
    ) -> Result<Option<Removal<HackathonTeamMate, HackathonTeam>>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let team_id: Option<i32> = sqlx::query_scalar(
            "SELECT team_id FROM hackathon_team_mates WHERE hackathon_id = $1 AND user_id = $2",
        )
        .bind(hackathon_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(team_id) = team_id else {
            return Ok(None);
        };

        sqlx::query("SELECT id FROM hackathon_teams WHERE id = $1 FOR UPDATE")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;

        let mate: Option<HackathonTeamMate> = sqlx::query_as(&format!(
            "DELETE FROM hackathon_team_mates
              WHERE hackathon_id = $1 AND user_id = $2
              RETURNING {HACKATHON_MATE_COLUMNS}"
        ))
        .bind(hackathon_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(mate) = mate else {
            return Ok(None);
        };

        let remaining: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM hackathon_team_mates WHERE team_id = $1")
                .bind(mate.team_id)
                .fetch_one(&mut *tx)
                .await?;

        let dissolved = if remaining == 0 {
            sqlx::query_as(
                "DELETE FROM hackathon_teams WHERE id = $1 RETURNING id, hackathon_id, name",
            )
            .bind(mate.team_id)
            .fetch_optional(&mut *tx)
            .await?
        } else {
            None
        };

        tx.commit().await?;
        Ok(Some(Removal { mate, dissolved }))
    }

    async fn delete_team(&self, team_id: i32) -> Result<Option<HackathonTeam>, StoreError> {
        Ok(sqlx::query_as(
            "DELETE FROM hackathon_teams WHERE id = $1 RETURNING id, hackathon_id, name",
        )
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn delete_teams_for_hackathon(&self, hackathon_id: i32) -> Result<u64, StoreError> {
        Ok(
            sqlx::query("DELETE FROM hackathon_teams WHERE hackathon_id = $1")
                .bind(hackathon_id)
                .execute(&self.pool)
                .await?
                .rows_affected(),
        )
    }
}

#[async_trait]
impl SubmissionStore for PgStore {
    async fn upsert_submission(&self, data: NewSubmission) -> Result<Submission, StoreError> {
        Ok(sqlx::query_as(
            r#"
            INSERT INTO team_submissions (team_id, hackathon_id, name, s3_key, content_type)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (team_id, hackathon_id)
            DO UPDATE SET name         = EXCLUDED.name,
                          s3_key       = EXCLUDED.s3_key,
                          content_type = EXCLUDED.content_type,
                          uploaded_at  = NOW()
            RETURNING id, team_id, hackathon_id, name, s3_key, content_type, uploaded_at
            "#,
        )
        .bind(data.team_id)
        .bind(data.hackathon_id)
        .bind(data.name)
        .bind(data.s3_key)
        .bind(data.content_type)
        .fetch_one(&self.pool)
        .await?)
    }

    async fn find_submission(
        &self,
        hackathon_id: i32,
        team_id: i32,
    ) -> Result<Option<Submission>, StoreError> {
        Ok(sqlx::query_as(
            "SELECT id, team_id, hackathon_id, name, s3_key, content_type, uploaded_at
               FROM team_submissions
              WHERE hackathon_id = $1 AND team_id = $2",
        )
        .bind(hackathon_id)
        .bind(team_id)
        .fetch_optional(&self.pool)
        .await?)
    }
}
