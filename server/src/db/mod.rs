//! Membership store: persisted teams, memberships, invites and submissions.

pub mod memory;
pub mod models;
pub mod postgres;
mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{BrandTeamStore, HackathonTeamStore, InviteStore, StoreError, SubmissionStore};

/// Unique constraint names, shared by both backends so engines can tell
/// which conflict they hit.
pub mod constraint {
    pub const TEAM_NAME: &str = "uq_teams_name";
    pub const TEAM_MATE_USER: &str = "uq_team_mates_user";
    pub const TEAM_INVITE: &str = "uq_team_invites_pair";
    pub const HACKATHON_TEAM_NAME: &str = "uq_hackathon_teams_name";
    pub const HACKATHON_SEAT: &str = "uq_hackathon_team_mates_seat";
    /// Implied by the seat constraint; Postgres may report either.
    pub const HACKATHON_TEAM_PAIR: &str = "uq_hackathon_team_mates_pair";
}
