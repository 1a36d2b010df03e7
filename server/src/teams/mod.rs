//! Team engines: brand teams, their mates and invites, hackathon teams and
//! their submissions.

pub mod dto;
pub mod enrich;
pub mod filetype;
pub mod hackathon;
pub mod invite;
pub mod mate;
pub mod submission;
pub mod team;

pub use hackathon::HackathonTeamEngine;
pub use invite::InviteEngine;
pub use mate::MateEngine;
pub use submission::{SubmissionConfig, SubmissionEngine};
pub use team::TeamEngine;

use crate::db::StoreError;
use crate::error::TeamError;

/// Translate a unique violation on `constraint` into `domain`; anything else
/// stays a store error.
pub(crate) fn on_conflict(
    constraint: &'static str,
    domain: TeamError,
) -> impl FnOnce(StoreError) -> TeamError {
    move |err| {
        if err.is_conflict_on(constraint) {
            domain
        } else {
            TeamError::Store(err)
        }
    }
}
