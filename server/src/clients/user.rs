use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ServiceClient, UpstreamError};
use crate::acl::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadKind {
    Avatar,
    Cover,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upload {
    pub user_id: i32,
    #[serde(rename = "type")]
    pub kind: UploadKind,
    pub s3_key: String,
    pub content_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub url: Option<String>,
}

/// User as exposed by the user service. Never persisted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i32,
    pub is_banned: bool,
    pub formatted_name: String,
    pub role: UserRole,
    #[serde(default)]
    pub uploads: Option<Vec<Upload>>,
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, user_id: i32) -> Result<Profile, UpstreamError>;

    /// Profiles for the given ids; unknown ids are simply absent.
    async fn get_users_many(&self, user_ids: &[i32]) -> Result<Vec<Profile>, UpstreamError>;

    async fn exists(&self, user_id: i32) -> Result<bool, UpstreamError> {
        match self.get_user(user_id).await {
            Ok(_) => Ok(true),
            Err(UpstreamError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn try_get_user(&self, user_id: i32) -> Option<Profile> {
        match self.get_user(user_id).await {
            Ok(profile) => Some(profile),
            Err(e) => {
                log::debug!("profile lookup for user {user_id} skipped: {e}");
                None
            }
        }
    }

    async fn try_get_users_many(&self, user_ids: &[i32]) -> Vec<Profile> {
        if user_ids.is_empty() {
            return Vec::new();
        }
        match self.get_users_many(user_ids).await {
            Ok(profiles) => profiles,
            Err(e) => {
                log::debug!("bulk profile lookup for {} users skipped: {e}", user_ids.len());
                Vec::new()
            }
        }
    }
}

pub struct HttpUserDirectory {
    client: ServiceClient,
}

impl HttpUserDirectory {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn get_user(&self, user_id: i32) -> Result<Profile, UpstreamError> {
        self.client.get_json(&user_id.to_string()).await
    }

    async fn get_users_many(&self, user_ids: &[i32]) -> Result<Vec<Profile>, UpstreamError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.client.post_json("info-many", user_ids).await
    }
}
