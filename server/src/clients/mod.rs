//! Outbound collaborators: user directory, hackathon directory, object storage.

pub mod hackathon;
pub mod storage;
pub mod user;

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

pub use hackathon::{Hackathon, HackathonDirectory, HttpHackathonDirectory};
pub use storage::{MemoryObjectStorage, ObjectStorage, S3Storage, StorageError, StoredObject};
pub use user::{HttpUserDirectory, Profile, Upload, UploadKind, UserDirectory};

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("resource not found upstream")]
    NotFound,
    #[error("upstream unavailable: {0}")]
    Unavailable(String),
    #[error("upstream rejected the request ({status}): {detail}")]
    Rejected { status: u16, detail: String },
    #[error("unexpected upstream payload: {0}")]
    Decode(String),
    #[error("invalid upstream configuration: {0}")]
    Config(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Bearer-authenticated JSON client for one internal service.
#[derive(Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
}

impl ServiceClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        // `Url::join` replaces the last segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized).map_err(|e| UpstreamError::Config(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base,
            api_key: api_key.to_owned(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, UpstreamError> {
        self.base
            .join(path)
            .map_err(|e| UpstreamError::Config(e.to_string()))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, UpstreamError> {
        let resp = self
            .http
            .get(self.endpoint(path)?)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;
        read_json(resp).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, UpstreamError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .post(self.endpoint(path)?)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| UpstreamError::Unavailable(e.to_string()))?;
        read_json(resp).await
    }
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, UpstreamError> {
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return Err(UpstreamError::NotFound);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let detail = match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody {
                detail: serde_json::Value::String(s),
            }) => s,
            Ok(ErrorBody { detail }) => detail.to_string(),
            Err(_) => body,
        };
        return Err(UpstreamError::Rejected {
            status: status.as_u16(),
            detail,
        });
    }
    resp.json::<T>()
        .await
        .map_err(|e| UpstreamError::Decode(e.to_string()))
}
