//! Streams submission files back out of object storage

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{get, web, HttpResponse};

use crate::app::Engines;
use crate::error::TeamError;

/// GET /download/submission/{hackathon_id}/{team_id}
#[get("/download/submission/{hackathon_id}/{team_id}")]
pub async fn submission(
    path: web::Path<(i32, i32)>,
    engines: web::Data<Engines>,
) -> Result<HttpResponse, TeamError> {
    let (hackathon_id, team_id) = path.into_inner();
    let (row, object) = engines.submissions.download(hackathon_id, team_id).await?;

    let content_type = object.content_type.unwrap_or(row.content_type);
    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(row.name)],
        })
        .body(object.body))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(submission);
}
