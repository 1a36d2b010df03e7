//! Organizer / admin tools over brand and hackathon teams

use actix_web::{delete, get, put, web, HttpResponse};

use super::auth::JwtAuth;
use super::{CaptainFlagReq, NameReq, RoleDescReq};
use crate::acl::Permission;
use crate::app::Engines;
use crate::error::TeamError;

//////////////////////////////////////////////////
// Brand teams
//////////////////////////////////////////////////

/// GET /admin/teams
#[get("/admin/teams")]
pub async fn list_teams(actor: JwtAuth, engines: web::Data<Engines>) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::GetAllTeams)?;
    Ok(HttpResponse::Ok().json(engines.teams.list_all().await?))
}

/// GET /admin/teams/{team_id}
#[get("/admin/teams/{team_id}")]
pub async fn team_info(
    actor: JwtAuth,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::GetAllTeams)?;
    Ok(HttpResponse::Ok().json(engines.teams.get_info(path.into_inner()).await?))
}

/// PUT /admin/teams/{team_id}
#[put("/admin/teams/{team_id}")]
pub async fn rename_team(
    actor: JwtAuth,
    path: web::Path<i32>,
    body: web::Json<NameReq>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::UpdateBrandTeam)?;
    let team = engines.teams.rename(path.into_inner(), &body.name).await?;
    Ok(HttpResponse::Ok().json(team))
}

/// DELETE /admin/teams/{team_id}
#[delete("/admin/teams/{team_id}")]
pub async fn delete_team(
    actor: JwtAuth,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::DeleteBrandTeam)?;
    engines.teams.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// PUT /admin/teams/{team_id}/mate/{user_id}/captain-rights
#[put("/admin/teams/{team_id}/mate/{user_id}/captain-rights")]
pub async fn team_captain_rights(
    actor: JwtAuth,
    path: web::Path<(i32, i32)>,
    body: web::Json<CaptainFlagReq>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::UpdateBrandTeam)?;
    let (team_id, user_id) = path.into_inner();
    let mate = engines
        .teams
        .set_captain(team_id, user_id, body.is_captain)
        .await?;
    Ok(HttpResponse::Ok().json(mate))
}

//////////////////////////////////////////////////
// Hackathon teams
//////////////////////////////////////////////////

/// GET /admin/hackathon/{hackathon_id}/teams
#[get("/admin/hackathon/{hackathon_id}/teams")]
pub async fn hackathon_teams(
    actor: JwtAuth,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::GetAllTeams)?;
    let teams = engines
        .hackathon_teams
        .list_for_hackathon(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(teams))
}

/// GET /admin/hackathon-teams/{team_id}
#[get("/admin/hackathon-teams/{team_id}")]
pub async fn hackathon_team_info(
    actor: JwtAuth,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::GetAllTeams)?;
    Ok(HttpResponse::Ok().json(engines.hackathon_teams.get_total(path.into_inner()).await?))
}

/// DELETE /admin/hackathon-teams/{team_id}
#[delete("/admin/hackathon-teams/{team_id}")]
pub async fn delete_hackathon_team(
    actor: JwtAuth,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::DeleteHackathonTeam)?;
    let team = engines.hackathon_teams.delete_team(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(team))
}

/// PUT /admin/hackathon/{hackathon_id}/mate/{user_id}/role-desc
#[put("/admin/hackathon/{hackathon_id}/mate/{user_id}/role-desc")]
pub async fn hackathon_role_desc(
    actor: JwtAuth,
    path: web::Path<(i32, i32)>,
    body: web::Json<RoleDescReq>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::UpdateHackathonTeam)?;
    let (hackathon_id, user_id) = path.into_inner();
    let mate = engines
        .hackathon_teams
        .set_role_description(hackathon_id, user_id, body.role_desc.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(mate))
}

/// PUT /admin/hackathon/{hackathon_id}/mate/{user_id}/captain-rights
#[put("/admin/hackathon/{hackathon_id}/mate/{user_id}/captain-rights")]
pub async fn hackathon_captain_rights(
    actor: JwtAuth,
    path: web::Path<(i32, i32)>,
    body: web::Json<CaptainFlagReq>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::UpdateHackathonTeam)?;
    let (hackathon_id, user_id) = path.into_inner();
    let mate = engines
        .hackathon_teams
        .set_captain(hackathon_id, user_id, body.is_captain)
        .await?;
    Ok(HttpResponse::Ok().json(mate))
}

/// DELETE /admin/hackathon/{hackathon_id}/mate/{user_id}
#[delete("/admin/hackathon/{hackathon_id}/mate/{user_id}")]
pub async fn hackathon_remove_mate(
    actor: JwtAuth,
    path: web::Path<(i32, i32)>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::UpdateHackathonTeam)?;
    let (hackathon_id, user_id) = path.into_inner();
    let mate = engines
        .hackathon_teams
        .remove_member(hackathon_id, user_id, false)
        .await?;
    Ok(HttpResponse::Ok().json(mate))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_teams)
        .service(team_info)
        .service(rename_team)
        .service(delete_team)
        .service(team_captain_rights)
        .service(hackathon_teams)
        .service(hackathon_team_info)
        .service(delete_hackathon_team)
        .service(hackathon_role_desc)
        .service(hackathon_captain_rights)
        .service(hackathon_remove_mate);
}
