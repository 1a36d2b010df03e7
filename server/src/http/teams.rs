//! Brand teams (create / own info / any team's info / rename)

use actix_web::{get, post, web, HttpResponse};

use super::auth::JwtAuth;
use super::{captain_team, NameReq};
use crate::acl::Permission;
use crate::app::Engines;
use crate::error::TeamError;

/// POST /
#[post("/")]
pub async fn create(
    actor: JwtAuth,
    body: web::Json<NameReq>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::CreateTeam)?;
    let team = engines.teams.create(&body.name, actor.user_id).await?;
    Ok(HttpResponse::Ok().json(team))
}

/// GET /info
#[get("/info")]
pub async fn own_info(actor: JwtAuth, engines: web::Data<Engines>) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::GetTeamInfo)?;
    Ok(HttpResponse::Ok().json(engines.teams.get_by_member(actor.user_id).await?))
}

/// GET /info/{team_id}
#[get("/info/{team_id}")]
pub async fn info(
    actor: JwtAuth,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::GetTeamInfo)?;
    Ok(HttpResponse::Ok().json(engines.teams.get_info(path.into_inner()).await?))
}

/// POST /name
#[post("/name")]
pub async fn rename(
    actor: JwtAuth,
    body: web::Json<NameReq>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    let team = captain_team(&engines, &actor).await?;
    Ok(HttpResponse::Ok().json(engines.teams.rename(team.id, &body.name).await?))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create)
        .service(own_info)
        .service(info)
        .service(rename);
}
