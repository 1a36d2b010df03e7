//! Simple liveness / readiness probe, plus the domain counters

use actix_web::{get, web, HttpResponse, Responder};
use redis::{AsyncCommands, Client as RedisClient};
use sqlx::PgPool;

use crate::metrics;

/// Backends the probe checks; absent ones are skipped (in-memory runs, tests).
#[derive(Clone, Default)]
pub struct Probes {
    pub db: Option<PgPool>,
    pub redis: Option<RedisClient>,
}

#[get("/healthz")]
pub async fn healthz(probes: web::Data<Probes>) -> impl Responder {
    // Check Postgres
    if let Some(db) = &probes.db {
        if sqlx::query("SELECT 1").execute(db).await.is_err() {
            return HttpResponse::ServiceUnavailable().body("db");
        }
    }

    // Check Redis
    if let Some(redis) = &probes.redis {
        let mut conn = match redis.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(_) => return HttpResponse::ServiceUnavailable().body("redis"),
        };
        // Annotate ping return type so compiler can infer RV
        if conn.ping::<String>().await.is_err() {
            return HttpResponse::ServiceUnavailable().body("redis");
        }
    }

    HttpResponse::Ok().body("ok")
}

#[get("/metrics/domain")]
pub async fn domain_metrics() -> impl Responder {
    match metrics::encode_domain() {
        Ok(buf) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(buf),
        Err(e) => {
            log::error!("cannot encode domain metrics: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(healthz).service(domain_metrics);
}
