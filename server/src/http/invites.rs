//! Invitations (own list / invite / accept / decline)

use actix_web::{delete, get, post, web, HttpResponse};

use super::auth::JwtAuth;
use super::captain_team;
use crate::acl::Permission;
use crate::app::Engines;
use crate::error::TeamError;

/// GET /invite
#[get("/invite")]
pub async fn list(actor: JwtAuth, engines: web::Data<Engines>) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::UpdateSelf)?;
    Ok(HttpResponse::Ok().json(engines.invites.list_for_user(actor.user_id).await?))
}

/// POST /invite/create/{user_id}
#[post("/invite/create/{user_id}")]
pub async fn create(
    actor: JwtAuth,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    let team = captain_team(&engines, &actor).await?;
    let invite = engines.invites.invite(team.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(invite))
}

/// POST /invite/{team_id}
#[post("/invite/{team_id}")]
pub async fn accept(
    actor: JwtAuth,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::AcceptInvite)?;
    let mate = engines.invites.accept(path.into_inner(), actor.user_id).await?;
    Ok(HttpResponse::Ok().json(mate))
}

/// DELETE /invite/{team_id}
#[delete("/invite/{team_id}")]
pub async fn decline(
    actor: JwtAuth,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::DeclineInvite)?;
    engines.invites.decline(path.into_inner(), actor.user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list)
        .service(create)
        .service(accept)
        .service(decline);
}
