//! Domain errors raised by the engines, and their HTTP mapping.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;

use crate::clients::{StorageError, UpstreamError};
use crate::db::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Policy,
    Forbidden,
    Upstream,
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum TeamError {
    // not found
    #[error("team not found")]
    TeamNotFound,
    #[error("user not found")]
    UserNotFound,
    #[error("hackathon not found")]
    HackathonNotFound,
    #[error("user is not a member of any team")]
    NotAMember,
    #[error("user is not in a team")]
    UserNotInTeam,
    #[error("user was not invited to this team")]
    NoSuchInvite,
    #[error("submission not found")]
    SubmissionNotFound,

    // conflict
    #[error("user is already a team member")]
    AlreadyMember,
    #[error("team name is already taken")]
    NameAlreadyUsed,
    #[error("user is already invited to this team")]
    AlreadyInvited,
    #[error("this brand team already participates in the hackathon")]
    AlreadyParticipating,
    #[error("one of the users already participates in this hackathon")]
    AlreadyParticipatingInHackathon,

    // policy
    #[error("user role may not take part in teams")]
    IneligibleRole,
    #[error("user is not the team captain")]
    UserIsNotOwner,
    #[error("team rosters can no longer change in this hackathon")]
    RegistryClosed,
    #[error("submissions are only accepted before scoring starts")]
    UploadWindowClosed,
    #[error("this file type may not be uploaded")]
    FileTypeRestricted,
    #[error("a team cannot exist without members")]
    EmptyTeam,
    #[error("a team cannot be created without a captain")]
    NoCaptain,
    #[error("team is too large for this hackathon")]
    TeamTooLarge,
    #[error("team does not fit into the hackathon participant list")]
    HackathonFull,
    #[error("user belongs to another team")]
    Mismatch,
    #[error("the only captain cannot step down while other members remain")]
    LastCaptain,
    #[error("user is not a member of your team")]
    NotYourMate,

    #[error("action not permitted for this role")]
    Forbidden,

    #[error("upstream service unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("object storage failure: {0}")]
    Storage(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TeamError {
    pub fn kind(&self) -> ErrorKind {
        use TeamError::*;
        match self {
            TeamNotFound | UserNotFound | HackathonNotFound | NotAMember | UserNotInTeam
            | NoSuchInvite | SubmissionNotFound => ErrorKind::NotFound,
            AlreadyMember | NameAlreadyUsed | AlreadyInvited | AlreadyParticipating
            | AlreadyParticipatingInHackathon => ErrorKind::Conflict,
            IneligibleRole | UserIsNotOwner | RegistryClosed | UploadWindowClosed
            | FileTypeRestricted | EmptyTeam | NoCaptain | TeamTooLarge | HackathonFull
            | Mismatch | LastCaptain | NotYourMate => ErrorKind::Policy,
            Forbidden => ErrorKind::Forbidden,
            ServiceUnavailable(_) => ErrorKind::Upstream,
            Storage(_) | Store(_) => ErrorKind::Internal,
        }
    }

    /// Authoritative user lookup: 404 is a domain miss, anything else an outage.
    pub fn user_lookup(err: UpstreamError) -> Self {
        match err {
            UpstreamError::NotFound => TeamError::UserNotFound,
            other => TeamError::ServiceUnavailable(other.to_string()),
        }
    }

    pub fn hackathon_lookup(err: UpstreamError) -> Self {
        match err {
            UpstreamError::NotFound => TeamError::HackathonNotFound,
            other => TeamError::ServiceUnavailable(other.to_string()),
        }
    }
}

impl From<StorageError> for TeamError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => TeamError::SubmissionNotFound,
            StorageError::Backend(detail) => TeamError::Storage(detail),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl ResponseError for TeamError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Policy => StatusCode::BAD_REQUEST,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Upstream => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self.kind() {
            ErrorKind::Internal => {
                log::error!("internal error: {self}");
                "internal server error".to_owned()
            }
            _ => self.to_string(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { detail })
    }
}
