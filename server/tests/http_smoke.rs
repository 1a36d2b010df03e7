mod common;

use actix_web::{http::StatusCode, test, web, App};
use chrono::Duration;
use serde_json::{json, Value};

use common::Harness;
use team_service::acl::UserRole;
use team_service::http::auth::{issue_token, AuthKeys};
use team_service::http::health::Probes;
use team_service::http::routes::init_routes;

const SECRET: &str = "test-secret";
const INTERNAL_KEY: &str = "internal-key";

fn keys() -> AuthKeys {
    AuthKeys {
        jwt_secret: SECRET.into(),
        internal_api_key: INTERNAL_KEY.into(),
    }
}

fn bearer(user_id: i32, role: UserRole) -> (&'static str, String) {
    let token = issue_token(SECRET, user_id, role, Duration::minutes(5)).unwrap();
    ("Authorization", format!("Bearer {token}"))
}

macro_rules! app {
    ($h:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($h.engines.clone()))
                .app_data(web::Data::new(keys()))
                .app_data(web::Data::new(Probes::default()))
                .configure(init_routes),
        )
        .await
    };
}

#[actix_rt::test]
async fn create_then_read_own_team() {
    let h = Harness::new();
    h.register_users(&[1]);
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/")
        .insert_header(bearer(1, UserRole::User))
        .set_json(json!({ "name": "Falcons" }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(created["name"], "Falcons");
    assert_eq!(created["mates"][0]["is_captain"], true);

    let req = test::TestRequest::get()
        .uri("/info")
        .insert_header(bearer(1, UserRole::User))
        .to_request();
    let info: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(info["id"], created["id"]);

    // a second team with the same name is a conflict
    h.register_users(&[2]);
    let req = test::TestRequest::post()
        .uri("/")
        .insert_header(bearer(2, UserRole::User))
        .set_json(json!({ "name": "Falcons" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_rt::test]
async fn requests_without_a_valid_token_are_rejected() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::get().uri("/info").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/info")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn organizers_cannot_found_teams() {
    let h = Harness::new();
    h.users.add(9, UserRole::Organizer);
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/")
        .insert_header(bearer(9, UserRole::Organizer))
        .set_json(json!({ "name": "Judges" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn internal_routes_need_the_service_key() {
    let h = Harness::new();
    let team = h.brand_team("Falcons", 1, &[]).await;
    let app = app!(h);

    let uri = format!("/internal/{}", team.id);
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(("Authorization", "Bearer wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(("Authorization", format!("Bearer {INTERNAL_KEY}")))
        .to_request();
    let exists: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(exists, Value::Bool(true));
}

#[actix_rt::test]
async fn submissions_download_through_the_redirect_url() {
    let h = Harness::new();
    h.hackathons.add(5, 4, 100);
    h.brand_team("Falcons", 1, &[]).await;
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/hackathon")
        .insert_header(bearer(1, UserRole::User))
        .set_json(json!({ "hackathon_id": 5, "mate_user_ids": [1] }))
        .to_request();
    let registered: Value = test::call_and_read_body_json(&app, req).await;
    let team_id = registered["id"].as_i64().unwrap();
    assert_eq!(registered["hackathon_name"], "Hackathon 5");

    let req = test::TestRequest::put()
        .uri("/hackathon/5/submission?filename=notes.txt")
        .insert_header(bearer(1, UserRole::User))
        .set_payload("final notes")
        .to_request();
    let submission: Value = test::call_and_read_body_json(&app, req).await;
    let url = submission["url"].as_str().unwrap().to_owned();
    assert_eq!(url, format!("http://teams.test/download/submission/5/{team_id}"));

    let req = test::TestRequest::get()
        .uri(url.trim_start_matches("http://teams.test"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    assert!(disposition.contains("notes.txt"));
    assert_eq!(test::read_body(resp).await, web::Bytes::from_static(b"final notes"));
}

#[actix_rt::test]
async fn health_probe_without_backends_is_ok() {
    let h = Harness::new();
    let app = app!(h);

    let req = test::TestRequest::get().uri("/healthz").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
