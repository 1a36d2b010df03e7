//! actix-web surface. Handlers only resolve the actor and call an engine.

pub mod admin;
pub mod auth;
pub mod download;
pub mod hackathon_teams;
pub mod health;
pub mod internal;
pub mod invites;
pub mod mates;
pub mod routes;
pub mod teams;

use serde::Deserialize;

use crate::acl::Permission;
use crate::app::Engines;
use crate::db::models::Team;
use crate::error::TeamError;
use auth::JwtAuth;

/// The brand team the actor captains.
pub(crate) async fn captain_team(engines: &Engines, actor: &JwtAuth) -> Result<Team, TeamError> {
    actor.require(Permission::CanBeInTeam)?;
    engines.teams.get_by_captain(actor.user_id).await
}

//////////////////////////////////////////////////
// Shared request bodies
//////////////////////////////////////////////////

#[derive(Deserialize)]
pub struct NameReq {
    pub name: String,
}

#[derive(Deserialize)]
pub struct RoleDescReq {
    pub role_desc: Option<String>,
}

#[derive(Deserialize)]
pub struct CaptainRightsReq {
    pub user_id: i32,
    pub is_captain: bool,
}

#[derive(Deserialize)]
pub struct CaptainFlagReq {
    pub is_captain: bool,
}
