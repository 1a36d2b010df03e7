//! Brand-team mates (list / leave / kick / role description / captaincy)

use actix_web::{delete, get, put, web, HttpResponse};

use super::auth::JwtAuth;
use super::{captain_team, CaptainRightsReq, RoleDescReq};
use crate::acl::Permission;
use crate::app::Engines;
use crate::error::TeamError;

/// GET /mate
#[get("/mate")]
pub async fn list(actor: JwtAuth, engines: web::Data<Engines>) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::GetTeamInfo)?;
    let mate = engines
        .mates
        .find(actor.user_id)
        .await?
        .ok_or(TeamError::NotAMember)?;
    Ok(HttpResponse::Ok().json(engines.mates.list(mate.team_id).await?))
}

/// DELETE /mate
#[delete("/mate")]
pub async fn leave(actor: JwtAuth, engines: web::Data<Engines>) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::UpdateSelf)?;
    Ok(HttpResponse::Ok().json(engines.teams.remove_member(actor.user_id, None).await?))
}

/// DELETE /mate/{user_id}
#[delete("/mate/{user_id}")]
pub async fn kick(
    actor: JwtAuth,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    let team = captain_team(&engines, &actor).await?;
    let mate = engines
        .teams
        .remove_member(path.into_inner(), Some(team.id))
        .await?;
    Ok(HttpResponse::Ok().json(mate))
}

/// PUT /mate/role-desc
#[put("/mate/role-desc")]
pub async fn role_desc(
    actor: JwtAuth,
    body: web::Json<RoleDescReq>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::UpdateSelf)?;
    let mate = engines
        .mates
        .set_role_description(actor.user_id, body.role_desc.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(mate))
}

/// PUT /mate/captain-rights
#[put("/mate/captain-rights")]
pub async fn captain_rights(
    actor: JwtAuth,
    body: web::Json<CaptainRightsReq>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    let team = captain_team(&engines, &actor).await?;
    let mate = engines
        .teams
        .set_captain(team.id, body.user_id, body.is_captain)
        .await?;
    Ok(HttpResponse::Ok().json(mate))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(leave)
        .service(role_desc)
        .service(captain_rights)
        .service(kick);
}
