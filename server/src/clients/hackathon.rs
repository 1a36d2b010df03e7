use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ServiceClient, UpstreamError};
use crate::db::models::Capacity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hackathon {
    pub id: i32,
    pub name: String,
    pub max_participant_count: i64,
    pub max_team_mates_count: i64,
    pub start_date: DateTime<Utc>,
    pub score_start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl Hackathon {
    pub fn capacity(&self) -> Capacity {
        Capacity {
            max_team_mates: self.max_team_mates_count,
            max_participants: self.max_participant_count,
        }
    }
}

#[async_trait]
pub trait HackathonDirectory: Send + Sync {
    async fn get_hackathon(&self, hackathon_id: i32) -> Result<Hackathon, UpstreamError>;
    async fn can_edit_team_registry(&self, hackathon_id: i32) -> Result<bool, UpstreamError>;
    async fn can_upload_submissions(&self, hackathon_id: i32) -> Result<bool, UpstreamError>;

    async fn try_get_hackathon(&self, hackathon_id: i32) -> Option<Hackathon> {
        match self.get_hackathon(hackathon_id).await {
            Ok(h) => Some(h),
            Err(e) => {
                log::debug!("hackathon {hackathon_id} lookup skipped: {e}");
                None
            }
        }
    }
}

#[derive(Deserialize)]
struct CanEdit {
    can_edit: bool,
}

#[derive(Deserialize)]
struct CanUpload {
    can_upload: bool,
}

pub struct HttpHackathonDirectory {
    client: ServiceClient,
}

impl HttpHackathonDirectory {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HackathonDirectory for HttpHackathonDirectory {
    async fn get_hackathon(&self, hackathon_id: i32) -> Result<Hackathon, UpstreamError> {
        self.client.get_json(&hackathon_id.to_string()).await
    }

    async fn can_edit_team_registry(&self, hackathon_id: i32) -> Result<bool, UpstreamError> {
        let body: CanEdit = self
            .client
            .get_json(&format!("{hackathon_id}/can-edit-team-registry"))
            .await?;
        Ok(body.can_edit)
    }

    async fn can_upload_submissions(&self, hackathon_id: i32) -> Result<bool, UpstreamError> {
        let body: CanUpload = self
            .client
            .get_json(&format!("{hackathon_id}/can-upload-submissions"))
            .await?;
        Ok(body.can_upload)
    }
}
