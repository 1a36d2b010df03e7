//! Hackathon teams (register / own team / mates / submission upload)

use actix_web::{delete, get, post, put, web, HttpResponse};
use bytes::Bytes;
use serde::Deserialize;
use uuid::Uuid;

use super::auth::JwtAuth;
use super::{captain_team, CaptainRightsReq, RoleDescReq};
use crate::acl::Permission;
use crate::app::Engines;
use crate::error::TeamError;

//////////////////////////////////////////////////
// Requests
//////////////////////////////////////////////////

#[derive(Deserialize)]
pub struct CreateReq {
    pub hackathon_id: i32,
    pub mate_user_ids: Vec<i32>,
}

#[derive(Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

//////////////////////////////////////////////////
// Handlers
//////////////////////////////////////////////////

/// POST /hackathon
#[post("/hackathon")]
pub async fn create(
    actor: JwtAuth,
    body: web::Json<CreateReq>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    let brand = captain_team(&engines, &actor).await?;
    let team = engines
        .hackathon_teams
        .create(brand.id, body.hackathon_id, &body.mate_user_ids)
        .await?;
    Ok(HttpResponse::Ok().json(team))
}

/// GET /hackathon/{hackathon_id}/my
#[get("/hackathon/{hackathon_id}/my")]
pub async fn my_team(
    actor: JwtAuth,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::CreateTeam)?;
    let mate = engines
        .hackathon_teams
        .get_mate(actor.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(engines.hackathon_teams.get_total(mate.team_id).await?))
}

/// PUT /hackathon/{hackathon_id}/mate/role-desc
#[put("/hackathon/{hackathon_id}/mate/role-desc")]
pub async fn role_desc(
    actor: JwtAuth,
    path: web::Path<i32>,
    body: web::Json<RoleDescReq>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::UpdateSelf)?;
    let mate = engines
        .hackathon_teams
        .set_role_description(path.into_inner(), actor.user_id, body.role_desc.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(mate))
}

/// PUT /hackathon/{hackathon_id}/mate/captain-rights
#[put("/hackathon/{hackathon_id}/mate/captain-rights")]
pub async fn captain_rights(
    actor: JwtAuth,
    path: web::Path<i32>,
    body: web::Json<CaptainRightsReq>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    let hackathon_id = path.into_inner();
    captain_team(&engines, &actor).await?;
    engines
        .hackathon_teams
        .ensure_teammates(hackathon_id, actor.user_id, body.user_id)
        .await?;
    let mate = engines
        .hackathon_teams
        .set_captain(hackathon_id, body.user_id, body.is_captain)
        .await?;
    Ok(HttpResponse::Ok().json(mate))
}

/// DELETE /hackathon/{hackathon_id}/mate
#[delete("/hackathon/{hackathon_id}/mate")]
pub async fn leave(
    actor: JwtAuth,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    actor.require(Permission::UpdateSelf)?;
    let mate = engines
        .hackathon_teams
        .remove_member(path.into_inner(), actor.user_id, false)
        .await?;
    Ok(HttpResponse::Ok().json(mate))
}

/// DELETE /hackathon/{hackathon_id}/mate/{user_id}
#[delete("/hackathon/{hackathon_id}/mate/{user_id}")]
pub async fn kick(
    actor: JwtAuth,
    path: web::Path<(i32, i32)>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    let (hackathon_id, user_id) = path.into_inner();
    captain_team(&engines, &actor).await?;
    engines
        .hackathon_teams
        .ensure_teammates(hackathon_id, actor.user_id, user_id)
        .await?;
    let mate = engines
        .hackathon_teams
        .remove_member(hackathon_id, user_id, false)
        .await?;
    Ok(HttpResponse::Ok().json(mate))
}

/// POST /hackathon/{hackathon_id}/mate/{user_id}
#[post("/hackathon/{hackathon_id}/mate/{user_id}")]
pub async fn add_mate(
    actor: JwtAuth,
    path: web::Path<(i32, i32)>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    let (hackathon_id, user_id) = path.into_inner();
    let brand = captain_team(&engines, &actor).await?;
    let own = engines
        .hackathon_teams
        .get_mate(actor.user_id, hackathon_id)
        .await?;
    let mate = engines
        .hackathon_teams
        .add_member(brand.id, own.team_id, user_id)
        .await?;
    Ok(HttpResponse::Ok().json(mate))
}

/// PUT /hackathon/{hackathon_id}/submission?filename=...  (raw file body)
#[put("/hackathon/{hackathon_id}/submission")]
pub async fn upload_submission(
    actor: JwtAuth,
    path: web::Path<i32>,
    query: web::Query<UploadQuery>,
    body: Bytes,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    let hackathon_id = path.into_inner();
    captain_team(&engines, &actor).await?;
    let own = engines
        .hackathon_teams
        .get_mate(actor.user_id, hackathon_id)
        .await?;

    let filename = match query.into_inner().filename {
        Some(name) if !name.trim().is_empty() => name,
        _ => format!("{}_{}_{}", own.team_id, own.user_id, Uuid::new_v4()),
    };
    let submission = engines
        .submissions
        .upload(hackathon_id, &filename, own.team_id, body)
        .await?;
    Ok(HttpResponse::Ok().json(submission))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create)
        .service(my_team)
        .service(role_desc)
        .service(captain_rights)
        .service(leave)
        .service(kick)
        .service(add_mate)
        .service(upload_submission);
}
