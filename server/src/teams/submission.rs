use std::sync::Arc;

use bytes::Bytes;
use url::Url;

use super::dto::SubmissionView;
use super::filetype;
use crate::clients::{HackathonDirectory, ObjectStorage, StoredObject};
use crate::db::models::{NewSubmission, Submission};
use crate::db::{StoreError, SubmissionStore};
use crate::error::TeamError;

#[derive(Debug, Clone)]
pub struct SubmissionConfig {
    pub bucket: String,
    /// Public base URL of this service; download links hang off it.
    pub public_api_url: Url,
}

impl SubmissionConfig {
    pub fn new(bucket: &str, public_api_url: &str) -> Result<Self, url::ParseError> {
        let base = if public_api_url.ends_with('/') {
            public_api_url.to_owned()
        } else {
            format!("{public_api_url}/")
        };
        Ok(Self {
            bucket: bucket.to_owned(),
            public_api_url: Url::parse(&base)?,
        })
    }
}

/// Deterministic object key for a team's submission file.
pub fn storage_key(hackathon_id: i32, team_id: i32, filename: &str) -> String {
    format!("team_submissions/{hackathon_id}/{team_id}/{filename}")
}

/// Link that streams the file back through this service.
pub fn redirect_url(base: &Url, hackathon_id: i32, team_id: i32) -> String {
    let path = format!("download/submission/{hackathon_id}/{team_id}");
    match base.join(&path) {
        Ok(url) => url.into(),
        Err(_) => format!("{base}{path}"),
    }
}

/// Keeps only the final path segment so a client cannot steer the key.
fn file_name(raw: &str) -> Option<&str> {
    raw.rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

pub struct SubmissionEngine {
    store: Arc<dyn SubmissionStore>,
    hackathons: Arc<dyn HackathonDirectory>,
    storage: Arc<dyn ObjectStorage>,
    config: SubmissionConfig,
}

impl SubmissionEngine {
    pub fn new(
        store: Arc<dyn SubmissionStore>,
        hackathons: Arc<dyn HackathonDirectory>,
        storage: Arc<dyn ObjectStorage>,
        config: SubmissionConfig,
    ) -> Self {
        Self {
            store,
            hackathons,
            storage,
            config,
        }
    }

    fn view(&self, row: Submission) -> SubmissionView {
        let url = redirect_url(&self.config.public_api_url, row.hackathon_id, row.team_id);
        SubmissionView::new(row, url)
    }

    pub async fn get(
        &self,
        hackathon_id: i32,
        team_id: i32,
    ) -> Result<Option<SubmissionView>, TeamError> {
        Ok(self
            .store
            .find_submission(hackathon_id, team_id)
            .await?
            .map(|row| self.view(row)))
    }

    /// Stores the file and records it, replacing any earlier submission of the
    /// team for this hackathon.
    pub async fn upload(
        &self,
        hackathon_id: i32,
        filename: &str,
        team_id: i32,
        body: Bytes,
    ) -> Result<SubmissionView, TeamError> {
        if !self
            .hackathons
            .can_upload_submissions(hackathon_id)
            .await
            .map_err(TeamError::hackathon_lookup)?
        {
            return Err(TeamError::UploadWindowClosed);
        }

        let name = file_name(filename).ok_or(TeamError::FileTypeRestricted)?;
        let content_type = filetype::detect(name, &body).ok_or(TeamError::FileTypeRestricted)?;
        let s3_key = storage_key(hackathon_id, team_id, name);

        self.storage
            .put_object(&self.config.bucket, &s3_key, body, content_type)
            .await?;

        let row = self
            .store
            .upsert_submission(NewSubmission {
                team_id,
                hackathon_id,
                name: name.to_owned(),
                s3_key,
                content_type: content_type.to_owned(),
            })
            .await
            .map_err(|e| match e {
                StoreError::MissingParent(_) => TeamError::TeamNotFound,
                other => TeamError::Store(other),
            })?;
        log::info!(
            "team {team_id} submitted {} ({}) for hackathon {hackathon_id}",
            row.name,
            row.content_type
        );
        Ok(self.view(row))
    }

    pub async fn download(
        &self,
        hackathon_id: i32,
        team_id: i32,
    ) -> Result<(Submission, StoredObject), TeamError> {
        let row = self
            .store
            .find_submission(hackathon_id, team_id)
            .await?
            .ok_or(TeamError::SubmissionNotFound)?;
        let object = self.storage.get_object(&self.config.bucket, &row.s3_key).await?;
        Ok((row, object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_is_relative_to_public_base() {
        let cfg = SubmissionConfig::new("hackathons", "https://api.example.com/teams").unwrap();
        assert_eq!(
            redirect_url(&cfg.public_api_url, 5, 9),
            "https://api.example.com/teams/download/submission/5/9"
        );
    }

    #[test]
    fn keys_are_deterministic() {
        assert_eq!(storage_key(5, 9, "report.docx"), "team_submissions/5/9/report.docx");
    }

    #[test]
    fn file_names_lose_their_directories() {
        assert_eq!(file_name("../../etc/passwd.txt"), Some("passwd.txt"));
        assert_eq!(file_name("C:\\work\\slides.pptx"), Some("slides.pptx"));
        assert_eq!(file_name("dir/"), None);
        assert_eq!(file_name(".."), None);
    }
}
