use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use redis::Client as RedisClient;
use sqlx::postgres::PgPoolOptions;
use team_service::app::{Collaborators, Engines, Stores};
use team_service::clients::{HttpHackathonDirectory, HttpUserDirectory, S3Storage, ServiceClient};
use team_service::config::settings;
use team_service::events::{consumer, RedisPublisher};
use team_service::http::{self, auth::AuthKeys, health::Probes};
use team_service::metrics;
use team_service::teams::SubmissionConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cfg = settings();

    // Store: Postgres when configured, in-memory otherwise
    let (stores, db_pool) = match &cfg.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(cfg.db_max_connections)
                .connect(url)
                .await
                .context("failed to create Postgres pool")?;
            (Stores::postgres(pool.clone()), Some(pool))
        }
        None => {
            log::warn!("DATABASE_URL not set; using the in-memory store, data will not survive a restart");
            (Stores::memory(), None)
        }
    };

    // Redis client
    let redis_client = RedisClient::open(cfg.redis_url.as_str()).context("invalid REDIS_URL")?;

    let users = ServiceClient::new(
        &cfg.user_service_url,
        &cfg.user_service_api_key,
        cfg.upstream_timeout,
    )
    .context("user service client")?;
    let hackathons = ServiceClient::new(
        &cfg.hackathon_service_url,
        &cfg.hackathon_service_api_key,
        cfg.upstream_timeout,
    )
    .context("hackathon service client")?;

    let collab = Collaborators {
        users: Arc::new(HttpUserDirectory::new(users)),
        hackathons: Arc::new(HttpHackathonDirectory::new(hackathons)),
        storage: Arc::new(S3Storage::connect(cfg.s3_endpoint.as_deref()).await),
        publisher: Arc::new(RedisPublisher::new(redis_client.clone(), cfg.events_channel.clone())),
    };
    let submission = SubmissionConfig::new(&cfg.s3_bucket, &cfg.public_api_url)
        .context("invalid PUBLIC_API_URL")?;
    let engines = Engines::build(stores, collab, submission);

    // Start the background event consumer
    consumer::start(
        redis_client.clone(),
        cfg.events_channel.clone(),
        Arc::new(engines.relay()),
    );

    let keys = AuthKeys {
        jwt_secret: cfg.jwt_secret.clone(),
        internal_api_key: cfg.internal_api_key.clone(),
    };
    let probes = Probes {
        db: db_pool,
        redis: Some(redis_client),
    };
    let max_upload = cfg.max_upload_bytes;

    log::info!("team service listening on {}", cfg.server_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(metrics::METRICS.clone())
            .app_data(web::PayloadConfig::new(max_upload))
            .app_data(web::Data::new(engines.clone()))
            .app_data(web::Data::new(keys.clone()))
            .app_data(web::Data::new(probes.clone()))
            .configure(http::routes::init_routes)
    })
    .bind(&cfg.server_addr)?
    .run()
    .await?;

    Ok(())
}
