//! Roles carried in tokens and user profiles, and what each may do.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Organizer,
    Admin,
    #[serde(other)]
    Unknown,
}

impl UserRole {
    pub fn is_privileged(self) -> bool {
        matches!(self, UserRole::Organizer | UserRole::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    CanBeInTeam,
    UpdateSelf,
    CreateTeam,
    GetTeamInfo,
    AcceptInvite,
    DeclineInvite,
    GetAllTeams,
    UpdateBrandTeam,
    DeleteBrandTeam,
    UpdateHackathonTeam,
    DeleteHackathonTeam,
}

impl Permission {
    pub fn allows(self, role: UserRole) -> bool {
        use Permission::*;
        match self {
            GetTeamInfo | DeclineInvite => true,
            CanBeInTeam | UpdateSelf | CreateTeam | AcceptInvite => role == UserRole::User,
            GetAllTeams | UpdateBrandTeam | DeleteBrandTeam | UpdateHackathonTeam
            | DeleteHackathonTeam => role.is_privileged(),
        }
    }
}
