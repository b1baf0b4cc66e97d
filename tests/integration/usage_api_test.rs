//! Integration tests for the usage readback endpoints

use actix_web::{test, web, App};
use quotrak::routes;
use quotrak::services::{QuotaService, UsageService};

use crate::common::db::TestDb;
use crate::common::fixtures::{create_admin_token, create_test_user, quota_config};

macro_rules! usage_app {
    ($db:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.pool.clone()))
                .configure(routes::usage::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn test_usage_endpoints_require_auth() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let app = usage_app!(db);

    let req = test::TestRequest::get()
        .uri(&format!("/api/usage/{}", user.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn test_get_total_returns_lifetime_counter() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let token = create_admin_token(&db.pool).await;

    for service in ["shodan", "intelx"] {
        UsageService::record_query(&db.pool, user.id, service)
            .await
            .unwrap();
    }

    let app = usage_app!(db);
    let req = test::TestRequest::get()
        .uri(&format!("/api/usage/{}", user.id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["user_id"], user.id.to_string());
    assert_eq!(body["queries_used"], 2);
}

#[actix_web::test]
async fn test_get_total_is_404_for_unrecorded_user() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let token = create_admin_token(&db.pool).await;

    let app = usage_app!(db);
    let req = test::TestRequest::get()
        .uri(&format!("/api/usage/{}", user.id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_recent_searches_endpoint_lists_events() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let token = create_admin_token(&db.pool).await;

    UsageService::record_query(&db.pool, user.id, "shodan")
        .await
        .unwrap();

    let app = usage_app!(db);
    let req = test::TestRequest::get()
        .uri(&format!("/api/usage/{}/searches", user.id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    let events = body.as_array().expect("array of search events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["search_type"], "shodan");
}

#[actix_web::test]
async fn test_daily_usage_endpoint_reports_todays_count() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let token = create_admin_token(&db.pool).await;
    let config = quota_config(200);

    QuotaService::can_make_query(&db.pool, &config, user.id, "shodan")
        .await
        .unwrap();

    let app = usage_app!(db);

    let req = test::TestRequest::get()
        .uri(&format!("/api/usage/{}/daily/shodan", user.id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["service"], "shodan");
    assert_eq!(body["queries_used"], 1);

    // An untouched service has no row today
    let req = test::TestRequest::get()
        .uri(&format!("/api/usage/{}/daily/censys", user.id))
        .insert_header(("Authorization", format!("Bearer {}", token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
