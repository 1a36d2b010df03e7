use async_trait::async_trait;

use super::models::{
    Capacity, CapacityBreach, HackathonTeam, HackathonTeamMate, NewMate, NewSubmission, Removal,
    Submission, Team, TeamInvite, TeamMate,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint {0} violated")]
    Conflict(String),
    #[error("referenced row does not exist ({0})")]
    MissingParent(String),
    #[error("capacity exceeded: {0:?}")]
    Capacity(CapacityBreach),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    pub fn is_conflict_on(&self, constraint: &str) -> bool {
        matches!(self, StoreError::Conflict(c) if c == constraint)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            let constraint = db_err.constraint().unwrap_or_default().to_owned();
            match db_err.code().as_deref() {
                Some("23505") => return StoreError::Conflict(constraint),
                Some("23503") => return StoreError::MissingParent(constraint),
                _ => {}
            }
        }
        StoreError::Database(err)
    }
}

/// Brand teams and their memberships.
#[async_trait]
pub trait BrandTeamStore: Send + Sync {
    /// Inserts the team and its captain membership atomically.
    async fn create_team_with_captain(
        &self,
        name: &str,
        captain_user_id: i32,
    ) -> Result<(Team, TeamMate), StoreError>;
    async fn find_team(&self, team_id: i32) -> Result<Option<Team>, StoreError>;
    async fn list_teams(&self) -> Result<Vec<Team>, StoreError>;
    async fn rename_team(&self, team_id: i32, name: &str) -> Result<Option<Team>, StoreError>;
    /// Cascades to memberships and invites. Returns false if nothing was deleted.
    async fn delete_team(&self, team_id: i32) -> Result<bool, StoreError>;

    async fn find_mate(&self, user_id: i32) -> Result<Option<TeamMate>, StoreError>;
    async fn list_mates(&self, team_id: i32) -> Result<Vec<TeamMate>, StoreError>;
    async fn list_captains(&self, team_id: i32) -> Result<Vec<TeamMate>, StoreError>;
    async fn count_mates(&self, team_id: i32) -> Result<i64, StoreError>;
    async fn insert_mate(&self, team_id: i32, mate: NewMate) -> Result<TeamMate, StoreError>;
    async fn set_mate_captain(
        &self,
        user_id: i32,
        is_captain: bool,
    ) -> Result<Option<TeamMate>, StoreError>;
    async fn set_mate_role(
        &self,
        user_id: i32,
        role_desc: Option<&str>,
    ) -> Result<Option<TeamMate>, StoreError>;
    /// Deletes the membership, and the team with it when it was the last one.
    async fn remove_mate(&self, user_id: i32)
        -> Result<Option<Removal<TeamMate, Team>>, StoreError>;
}

#[async_trait]
pub trait InviteStore: Send + Sync {
    async fn insert_invite(&self, team_id: i32, user_id: i32) -> Result<TeamInvite, StoreError>;
    async fn find_invite(&self, team_id: i32, user_id: i32)
        -> Result<Option<TeamInvite>, StoreError>;
    async fn invites_for_user(&self, user_id: i32) -> Result<Vec<TeamInvite>, StoreError>;
    async fn delete_invite(&self, team_id: i32, user_id: i32) -> Result<bool, StoreError>;
    async fn delete_invites_for_user(&self, user_id: i32) -> Result<u64, StoreError>;
}

/// Hackathon-scoped teams and their memberships.
#[async_trait]
pub trait HackathonTeamStore: Send + Sync {
    /// Creates the team and all its memberships in one transaction, re-checking
    /// `capacity` against the live participant count while holding a
    /// per-hackathon lock.
    async fn register_team(
        &self,
        hackathon_id: i32,
        name: &str,
        mates: &[NewMate],
        capacity: Capacity,
    ) -> Result<(HackathonTeam, Vec<HackathonTeamMate>), StoreError>;
    /// Adds one membership under the same lock and capacity re-check.
    async fn add_mate(
        &self,
        team: &HackathonTeam,
        mate: NewMate,
        capacity: Capacity,
    ) -> Result<HackathonTeamMate, StoreError>;

    async fn find_team(&self, team_id: i32) -> Result<Option<HackathonTeam>, StoreError>;
    async fn teams_for_hackathon(&self, hackathon_id: i32)
        -> Result<Vec<HackathonTeam>, StoreError>;
    async fn teams_by_ids(&self, team_ids: &[i32]) -> Result<Vec<HackathonTeam>, StoreError>;
    async fn team_name_taken(&self, name: &str, hackathon_id: i32) -> Result<bool, StoreError>;

    async fn find_mate(
        &self,
        user_id: i32,
        hackathon_id: i32,
    ) -> Result<Option<HackathonTeamMate>, StoreError>;
    /// Every hackathon membership of a user, across all hackathons.
    async fn mates_of_user(&self, user_id: i32) -> Result<Vec<HackathonTeamMate>, StoreError>;
    async fn list_mates(&self, team_id: i32) -> Result<Vec<HackathonTeamMate>, StoreError>;
    async fn list_captains(&self, team_id: i32) -> Result<Vec<HackathonTeamMate>, StoreError>;
    async fn count_mates(&self, team_id: i32) -> Result<i64, StoreError>;
    async fn count_participants(&self, hackathon_id: i32) -> Result<i64, StoreError>;
    async fn set_mate_captain(
        &self,
        hackathon_id: i32,
        user_id: i32,
        is_captain: bool,
    ) -> Result<Option<HackathonTeamMate>, StoreError>;
    async fn set_mate_role(
        &self,
        hackathon_id: i32,
        user_id: i32,
        role_desc: Option<&str>,
    ) -> Result<Option<HackathonTeamMate>, StoreError>;
    async fn remove_mate(
        &self,
        hackathon_id: i32,
        user_id: i32,
    ) -> Result<Option<Removal<HackathonTeamMate, HackathonTeam>>, StoreError>;

    /// Cascades to memberships and submissions.
    async fn delete_team(&self, team_id: i32) -> Result<Option<HackathonTeam>, StoreError>;
    async fn delete_teams_for_hackathon(&self, hackathon_id: i32) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait SubmissionStore: Send + Sync {
    /// Insert or replace the submission keyed by `(team_id, hackathon_id)`.
    async fn upsert_submission(&self, data: NewSubmission) -> Result<Submission, StoreError>;
    async fn find_submission(
        &self,
        hackathon_id: i32,
        team_id: i32,
    ) -> Result<Option<Submission>, StoreError>;
}
