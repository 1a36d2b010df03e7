//! Service-to-service lookups, guarded by the internal API key

use actix_web::{get, post, web, HttpResponse};

use super::auth::InternalKey;
use crate::app::Engines;
use crate::error::TeamError;

/// GET /internal/{team_id}  → whether the brand team exists
#[get("/internal/{team_id}")]
pub async fn team_exists(
    _key: InternalKey,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    Ok(HttpResponse::Ok().json(engines.teams.exists(path.into_inner()).await?))
}

/// GET /internal/hackathon/{hackathon_id}/teams
#[get("/internal/hackathon/{hackathon_id}/teams")]
pub async fn hackathon_teams(
    _key: InternalKey,
    path: web::Path<i32>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    let teams = engines
        .hackathon_teams
        .list_for_hackathon(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(teams))
}

/// GET /internal/hackathon/{hackathon_id}/teams/{team_id}
#[get("/internal/hackathon/{hackathon_id}/teams/{team_id}")]
pub async fn hackathon_team(
    _key: InternalKey,
    path: web::Path<(i32, i32)>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    let (hackathon_id, team_id) = path.into_inner();
    let team = engines.hackathon_teams.get_total(team_id).await?;
    if team.team.hackathon_id != hackathon_id {
        return Err(TeamError::TeamNotFound);
    }
    Ok(HttpResponse::Ok().json(team))
}

/// POST /internal/hackathon-teams/many  (JSON array of team ids)
#[post("/internal/hackathon-teams/many")]
pub async fn hackathon_teams_many(
    _key: InternalKey,
    body: web::Json<Vec<i32>>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    Ok(HttpResponse::Ok().json(engines.hackathon_teams.list_many(&body).await?))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(hackathon_teams_many)
        .service(hackathon_teams)
        .service(hackathon_team)
        .service(team_exists);
}
