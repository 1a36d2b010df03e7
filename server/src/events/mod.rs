//! Domain events exchanged with the other platform services.
//
//  Every bus message is an envelope `{"event_name": "...", "data": {...}}`
//  published on one shared channel.

pub mod consumer;
pub mod publisher;
pub mod relay;

use serde::{Deserialize, Serialize};

use crate::db::models::HackathonTeam;

pub use publisher::{EventPublisher, PublishError, RecordingPublisher, RedisPublisher};
pub use relay::{EventHandler, EventRelay};

pub const USER_DELETED: &str = "user.deleted";
pub const USER_BANNED: &str = "user.banned";
pub const HACKATHON_DELETED: &str = "hackathon.deleted";
pub const HACKATHON_TEAM_DELETED: &str = "team.hackathon_team_deleted";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event_name: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("unknown event {0}")]
    Unknown(String),
    #[error("malformed {event} payload: {source}")]
    Payload {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct IdPayload {
    id: i32,
}

#[derive(Deserialize)]
struct BanPayload {
    id: i32,
    is_banned: bool,
}

/// Events this service reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEvent {
    UserDeleted { id: i32 },
    UserBanned { id: i32, is_banned: bool },
    HackathonDeleted { id: i32 },
}

fn payload<T: serde::de::DeserializeOwned>(
    event: &'static str,
    data: serde_json::Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError::Payload { event, source })
}

impl InboundEvent {
    pub fn decode(raw: &str) -> Result<Self, DecodeError> {
        let envelope: Envelope = serde_json::from_str(raw).map_err(DecodeError::Envelope)?;
        Self::from_envelope(envelope)
    }

    pub fn from_envelope(envelope: Envelope) -> Result<Self, DecodeError> {
        match envelope.event_name.as_str() {
            USER_DELETED => {
                let IdPayload { id } = payload(USER_DELETED, envelope.data)?;
                Ok(InboundEvent::UserDeleted { id })
            }
            USER_BANNED => {
                let BanPayload { id, is_banned } = payload(USER_BANNED, envelope.data)?;
                Ok(InboundEvent::UserBanned { id, is_banned })
            }
            HACKATHON_DELETED => {
                let IdPayload { id } = payload(HACKATHON_DELETED, envelope.data)?;
                Ok(InboundEvent::HackathonDeleted { id })
            }
            _ => Err(DecodeError::Unknown(envelope.event_name)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::UserDeleted { .. } => USER_DELETED,
            InboundEvent::UserBanned { .. } => USER_BANNED,
            InboundEvent::HackathonDeleted { .. } => HACKATHON_DELETED,
        }
    }

    /// The user whose memberships must go: deleted, or banned (not unbanned).
    pub fn departed_user(&self) -> Option<i32> {
        match *self {
            InboundEvent::UserDeleted { id } => Some(id),
            InboundEvent::UserBanned {
                id,
                is_banned: true,
            } => Some(id),
            _ => None,
        }
    }
}

/// Events this service announces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    HackathonTeamDeleted(HackathonTeam),
}

impl OutboundEvent {
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::HackathonTeamDeleted(_) => HACKATHON_TEAM_DELETED,
        }
    }

    pub fn to_envelope(&self) -> Result<Envelope, serde_json::Error> {
        let data = match self {
            OutboundEvent::HackathonTeamDeleted(team) => serde_json::to_value(team)?,
        };
        Ok(Envelope {
            event_name: self.name().to_owned(),
            data,
        })
    }
}
