use crate::http;
use actix_web::web;

/// Mount every HTTP sub-module at the service root.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(http::health::init_routes)
        .configure(http::teams::init_routes)
        .configure(http::mates::init_routes)
        .configure(http::invites::init_routes)
        .configure(http::hackathon_teams::init_routes)
        .configure(http::admin::init_routes)
        .configure(http::internal::init_routes)
        .configure(http::download::init_routes);
}
