//! Response shapes. Profile fields are filled live and may be absent.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::clients::{Profile, Upload};
use crate::db::models::{HackathonTeam, HackathonTeamMate, Submission, Team, TeamMate};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MateView {
    pub team_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hackathon_id: Option<i32>,
    pub user_id: i32,
    pub user_name: Option<String>,
    pub user_uploads: Option<Vec<Upload>>,
    pub is_captain: bool,
    pub role_desc: Option<String>,
}

impl MateView {
    pub fn with_profile(mut self, profile: Option<&Profile>) -> Self {
        if let Some(p) = profile {
            self.user_name = Some(p.formatted_name.clone());
            self.user_uploads = p.uploads.clone();
        }
        self
    }
}

impl From<&TeamMate> for MateView {
    fn from(m: &TeamMate) -> Self {
        MateView {
            team_id: m.team_id,
            hackathon_id: None,
            user_id: m.user_id,
            user_name: None,
            user_uploads: None,
            is_captain: m.is_captain,
            role_desc: m.role_desc.clone(),
        }
    }
}

impl From<&HackathonTeamMate> for MateView {
    fn from(m: &HackathonTeamMate) -> Self {
        MateView {
            team_id: m.team_id,
            hackathon_id: Some(m.hackathon_id),
            user_id: m.user_id,
            user_name: None,
            user_uploads: None,
            is_captain: m.is_captain,
            role_desc: m.role_desc.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamView {
    pub id: i32,
    pub name: String,
    pub mates: Vec<MateView>,
}

impl TeamView {
    pub fn new(team: Team, mates: Vec<MateView>) -> Self {
        TeamView {
            id: team.id,
            name: team.name,
            mates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteView {
    pub team_id: i32,
    pub user_id: i32,
    pub team_name: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionView {
    pub id: i32,
    pub team_id: i32,
    pub hackathon_id: i32,
    pub name: String,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    /// Download link routed through this service.
    pub url: String,
}

impl SubmissionView {
    pub fn new(row: Submission, url: String) -> Self {
        SubmissionView {
            id: row.id,
            team_id: row.team_id,
            hackathon_id: row.hackathon_id,
            name: row.name,
            content_type: row.content_type,
            uploaded_at: row.uploaded_at,
            url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HackathonTeamView {
    pub id: i32,
    pub hackathon_id: i32,
    pub name: String,
    pub hackathon_name: Option<String>,
    pub submission: Option<SubmissionView>,
}

impl HackathonTeamView {
    pub fn new(
        team: HackathonTeam,
        hackathon_name: Option<String>,
        submission: Option<SubmissionView>,
    ) -> Self {
        HackathonTeamView {
            id: team.id,
            hackathon_id: team.hackathon_id,
            name: team.name,
            hackathon_name,
            submission,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HackathonTeamWithMates {
    #[serde(flatten)]
    pub team: HackathonTeamView,
    pub mates: Vec<MateView>,
}
