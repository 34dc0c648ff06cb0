//! Admin API integration tests
//!
//! Drives the /v1 routes through the auth middleware against a temporary
//! SQLite database. The task tracker is a stub that knows no tasks.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, web};
use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use trackdesk::affiliate::TrackerComment;
use trackdesk::api::middleware::AdminAuth;
use trackdesk::api::services::admin::routes::admin_v1_routes;
use trackdesk::api::services::admin::{AdminServices, ApiResponse};
use trackdesk::api::services::{AppStartTime, health_routes};
use trackdesk::config::{ApiConfig, DatabaseConfig, TrackerConfig};
use trackdesk::errors::{Result, TrackdeskError};
use trackdesk::storage::SeaOrmStorage;
use trackdesk::tracker::{PostedComment, Task, TaskComment, TaskTracker};

const TOKEN: &str = "test-admin-token";

// =============================================================================
// Test Setup
// =============================================================================

struct NoTasks;

#[async_trait]
impl TaskTracker for NoTasks {
    async fn get_task(&self, task_id: &str) -> Result<Task> {
        Err(TrackdeskError::tracker_not_found(format!("Task {} not found", task_id)))
    }

    async fn list_comments(&self, _task_id: &str) -> Result<Vec<TaskComment>> {
        Ok(Vec::new())
    }

    async fn post_comment(&self, task_id: &str, _comment: &TrackerComment) -> Result<PostedComment> {
        Err(TrackdeskError::tracker_not_found(format!("Task {} not found", task_id)))
    }
}

async fn setup() -> (TempDir, Arc<SeaOrmStorage>, AdminServices) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("admin_api_test.db");
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

    let storage = Arc::new(
        SeaOrmStorage::new(&db_url, "sqlite", &DatabaseConfig::default())
            .await
            .expect("Failed to create storage"),
    );
    let services = AdminServices::new(
        storage.clone(),
        Arc::new(NoTasks),
        &ApiConfig::default(),
        &TrackerConfig::default(),
    );
    (temp_dir, storage, services)
}

macro_rules! admin_app {
    ($services:expr, $token:expr) => {{
        let services = $services.clone();
        test::init_service(
            App::new()
                .configure(move |cfg| services.configure(cfg))
                .service(
                    web::scope("/api")
                        .wrap(AdminAuth::new($token))
                        .service(admin_v1_routes()),
                ),
        )
        .await
    }};
}

fn authed(req: TestRequest) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {}", TOKEN)))
}

// =============================================================================
// Auth
// =============================================================================

#[actix_web::test]
async fn test_admin_api_hidden_without_token() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, "");

    let req = authed(TestRequest::get().uri("/api/v1/websites")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_admin_api_rejects_bad_token() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, TOKEN);

    let req = TestRequest::get().uri("/api/v1/websites").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: ApiResponse<Value> = test::read_body_json(resp).await;
    assert_eq!(body.code, 1001);

    let req = TestRequest::get()
        .uri("/api/v1/websites")
        .insert_header(("Authorization", "Bearer wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_admin_api_preflight_passes() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, TOKEN);

    let req = TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/api/v1/websites")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// =============================================================================
// Websites & Sub-IDs
// =============================================================================

#[actix_web::test]
async fn test_website_and_sub_id_flow() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, TOKEN);

    let req = authed(TestRequest::post().uri("/api/v1/websites"))
        .set_json(json!({ "name": "api-site", "format_pattern": "API-{SEQ:3}" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ApiResponse<Value> = test::read_body_json(resp).await;
    assert_eq!(body.code, 0);
    let site_id = body.data.unwrap()["id"].as_i64().unwrap();

    let req = authed(TestRequest::post().uri(&format!("/api/v1/websites/{}/sub-ids/generate", site_id)))
        .set_json(json!({ "count": 2 }))
        .to_request();
    let body: ApiResponse<Value> = test::read_body_json(test::call_service(&app, req).await).await;
    let data = body.data.unwrap();
    assert_eq!(data["success"].as_array().unwrap().len(), 2);
    assert_eq!(data["success"][0]["value"], "API-001");

    let req = authed(TestRequest::post().uri(&format!("/api/v1/websites/{}/sub-ids", site_id)))
        .set_json(json!({
            "value": "API-LOCK",
            "url": "https://api-site.example.com/review",
            "task_id": "86abc"
        }))
        .to_request();
    let body: ApiResponse<Value> = test::read_body_json(test::call_service(&app, req).await).await;
    let locked = body.data.unwrap();
    assert_eq!(locked["is_immutable"], true);
    let locked_id = locked["id"].as_i64().unwrap();

    // immutable Sub-ID cannot be deleted
    let req = authed(TestRequest::delete().uri(&format!("/api/v1/sub-ids/{}", locked_id))).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: ApiResponse<Value> = test::read_body_json(resp).await;
    assert_eq!(body.code, 3000);

    // linked filter
    let req = authed(TestRequest::get().uri(&format!(
        "/api/v1/websites/{}/sub-ids?linked=true",
        site_id
    )))
    .to_request();
    let body: ApiResponse<Vec<Value>> = test::read_body_json(test::call_service(&app, req).await).await;
    let linked = body.data.unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0]["value"], "API-LOCK");

    // website with an immutable Sub-ID cannot be deleted
    let req = authed(TestRequest::delete().uri(&format!("/api/v1/websites/{}", site_id))).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_unknown_website_is_404() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, TOKEN);

    let req = authed(TestRequest::get().uri("/api/v1/websites/4242")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ApiResponse<Value> = test::read_body_json(resp).await;
    assert_eq!(body.code, 1004);
}

#[actix_web::test]
async fn test_malformed_json_is_400() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, TOKEN);

    let req = authed(TestRequest::post().uri("/api/v1/websites"))
        .insert_header(("Content-Type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ApiResponse<Value> = test::read_body_json(resp).await;
    assert_eq!(body.code, 1000);
}

#[actix_web::test]
async fn test_import_and_export_csv() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, TOKEN);

    let req = authed(TestRequest::post().uri("/api/v1/websites"))
        .set_json(json!({ "name": "Export Site" }))
        .to_request();
    let body: ApiResponse<Value> = test::read_body_json(test::call_service(&app, req).await).await;
    let site_id = body.data.unwrap()["id"].as_i64().unwrap();

    let req = authed(TestRequest::post().uri(&format!("/api/v1/websites/{}/sub-ids/import", site_id)))
        .set_json(json!({ "items": [
            { "value": "EXP-1", "url": "https://export.example.com/" },
            { "value": "EXP-1" },
            { "value": "EXP 2" }
        ]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ApiResponse<Value> = test::read_body_json(resp).await;
    let data = body.data.unwrap();
    assert_eq!(data["success"].as_array().unwrap().len(), 1);
    assert_eq!(data["failed"].as_array().unwrap().len(), 2);

    let req = authed(TestRequest::get().uri(&format!(
        "/api/v1/websites/{}/sub-ids/export?columns=2",
        site_id
    )))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let disposition = resp
        .headers()
        .get("Content-Disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("sub_ids_export_site_"));
    let body = test::read_body(resp).await;
    let csv = String::from_utf8(body.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("sub_id,url"));
    assert_eq!(lines.next(), Some("EXP-1,https://export.example.com/"));

    let req = authed(TestRequest::get().uri(&format!(
        "/api/v1/websites/{}/sub-ids/export?columns=3",
        site_id
    )))
    .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// GEOs, brands, rankings
// =============================================================================

#[actix_web::test]
async fn test_ranking_position_conflict() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, TOKEN);

    let req = authed(TestRequest::post().uri("/api/v1/geos"))
        .set_json(json!({ "code": "Great Britain" }))
        .to_request();
    let body: ApiResponse<Value> = test::read_body_json(test::call_service(&app, req).await).await;
    let geo = body.data.unwrap();
    assert_eq!(geo["code"], "UK");
    let geo_id = geo["id"].as_i64().unwrap();

    let mut brand_ids = Vec::new();
    for name in ["Alpha", "Beta"] {
        let req = authed(TestRequest::post().uri("/api/v1/brands"))
            .set_json(json!({ "name": name, "default_url": "https://brand.example.com/?subid=X" }))
            .to_request();
        let body: ApiResponse<Value> = test::read_body_json(test::call_service(&app, req).await).await;
        brand_ids.push(body.data.unwrap()["id"].as_i64().unwrap());
    }

    let rankings_uri = format!("/api/v1/geos/{}/rankings", geo_id);
    let req = authed(TestRequest::post().uri(&rankings_uri))
        .set_json(json!({ "brand_id": brand_ids[0], "position": 1 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = authed(TestRequest::post().uri(&rankings_uri))
        .set_json(json!({ "brand_id": brand_ids[1], "position": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: ApiResponse<Value> = test::read_body_json(resp).await;
    assert_eq!(body.code, 5000);

    let req = authed(TestRequest::get().uri(&format!(
        "/api/v1/geos/{}/lineup?sub_id=SID-5",
        geo_id
    )))
    .to_request();
    let body: ApiResponse<Vec<Value>> = test::read_body_json(test::call_service(&app, req).await).await;
    let lineup = body.data.unwrap();
    assert_eq!(lineup.len(), 1);
    assert_eq!(lineup[0]["link"], "https://brand.example.com/?subid=SID-5");
}

#[actix_web::test]
async fn test_geo_resolve_endpoint() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, TOKEN);

    let req = authed(TestRequest::get().uri("/api/v1/geos/resolve?label=Deutschland")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ApiResponse<Value> = test::read_body_json(resp).await;
    let data = body.data.unwrap();
    assert_eq!(data["known"], false);
}

#[actix_web::test]
async fn test_task_summary_unknown_task() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, TOKEN);

    let req = authed(TestRequest::get().uri("/api/v1/tasks/86missing")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ApiResponse<Value> = test::read_body_json(resp).await;
    assert_eq!(body.code, 6002);
}

// =============================================================================
// Tools
// =============================================================================

#[actix_web::test]
async fn test_tracking_param_tool() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, TOKEN);

    let req = authed(TestRequest::post().uri("/api/v1/tools/tracking-param"))
        .set_json(json!({
            "url": "https://aff.example.com/c?lang=en&clickid=abc",
            "new_value": "SID-1"
        }))
        .to_request();
    let body: ApiResponse<Value> = test::read_body_json(test::call_service(&app, req).await).await;
    let data = body.data.unwrap();
    assert_eq!(data["param"]["name"], "clickid");
    assert_eq!(data["param"]["value"], "abc");
    assert_eq!(data["cloaked"], false);
    assert_eq!(data["rewritten"], "https://aff.example.com/c?lang=en&clickid=SID-1");
}

#[actix_web::test]
async fn test_comment_tool_falls_back() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, TOKEN);

    let req = authed(TestRequest::post().uri("/api/v1/tools/comment"))
        .set_json(json!({ "description": "no lineup", "task_id": "t1", "sub_id": "S-1" }))
        .to_request();
    let body: ApiResponse<Value> = test::read_body_json(test::call_service(&app, req).await).await;
    let data = body.data.unwrap();
    assert_eq!(data["fallback"], true);
    assert_eq!(data["text"], "Sub-ID: S-1");
    assert_eq!(data["links"], json!([]));
}

#[actix_web::test]
async fn test_geo_tool() {
    let (_dir, _storage, services) = setup().await;
    let app = admin_app!(services, TOKEN);

    let req = authed(TestRequest::get().uri("/api/v1/tools/geo?label=united%20kingdom")).to_request();
    let body: ApiResponse<Value> = test::read_body_json(test::call_service(&app, req).await).await;
    let data = body.data.unwrap();
    assert_eq!(data["code"], "UK");
    assert_eq!(data["alias_matched"], true);
}

// =============================================================================
// Health
// =============================================================================

#[actix_web::test]
async fn test_health_routes_need_no_token() {
    let (_dir, storage, _services) = setup().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(AppStartTime::now()))
            .service(health_routes("/health")),
    )
    .await;

    let resp = test::call_service(&app, TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: ApiResponse<Value> = test::read_body_json(resp).await;
    assert_eq!(body.code, 0);
    assert_eq!(body.data.unwrap()["checks"]["storage"]["status"], "healthy");

    let resp = test::call_service(&app, TestRequest::get().uri("/health/live").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}
