use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Team {
    pub id: i32,
    pub name: String,
}

/// Brand-team membership. `user_id` is unique across all brand teams.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TeamMate {
    pub team_id: i32,
    pub user_id: i32,
    pub is_captain: bool,
    pub role_desc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct TeamInvite {
    pub team_id: i32,
    pub user_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct HackathonTeam {
    pub id: i32,
    pub hackathon_id: i32,
    pub name: String,
}

/// Hackathon-team membership. `(hackathon_id, user_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct HackathonTeamMate {
    pub team_id: i32,
    pub hackathon_id: i32,
    pub user_id: i32,
    pub is_captain: bool,
    pub role_desc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Submission {
    pub id: i32,
    pub team_id: i32,
    pub hackathon_id: i32,
    pub name: String,
    pub s3_key: String,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
}

//////////////////////////////////////////////////
// Write inputs
//////////////////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMate {
    pub user_id: i32,
    pub is_captain: bool,
    pub role_desc: Option<String>,
}

impl From<&TeamMate> for NewMate {
    fn from(mate: &TeamMate) -> Self {
        NewMate {
            user_id: mate.user_id,
            is_captain: mate.is_captain,
            role_desc: mate.role_desc.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
    pub team_id: i32,
    pub hackathon_id: i32,
    pub name: String,
    pub s3_key: String,
    pub content_type: String,
}

/// Hackathon limits re-checked by the store inside the inserting transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub max_team_mates: i64,
    pub max_participants: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityBreach {
    TeamSize,
    Participants,
}

impl Capacity {
    /// Strict comparison: reaching a limit exactly is allowed.
    pub fn check(&self, team_size: i64, participants: i64) -> Result<(), CapacityBreach> {
        if team_size > self.max_team_mates {
            return Err(CapacityBreach::TeamSize);
        }
        if participants > self.max_participants {
            return Err(CapacityBreach::Participants);
        }
        Ok(())
    }
}

/// Result of deleting a membership; `dissolved` is set when it was the last one
/// and the team row went with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal<M, T> {
    pub mate: M,
    pub dissolved: Option<T>,
}
