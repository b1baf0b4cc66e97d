//! Integration tests for the Service Quota Limiter
//!
//! Daily budgets, lazy default-limit creation, per-(user, service) isolation,
//! and the zero-limit first-call policy under both flag settings.

use pretty_assertions::assert_eq;
use quotrak::services::QuotaService;
use uuid::Uuid;

use crate::common::db::TestDb;
use crate::common::fixtures::{create_test_user, quota_config, quota_config_strict};

async fn daily_row(pool: &sqlx::PgPool, user_id: Uuid, service: &str) -> Option<i32> {
    QuotaService::get_daily_usage(pool, user_id, service)
        .await
        .unwrap()
        .map(|usage| usage.queries_used)
}

#[actix_web::test]
async fn test_quota_monotonic_denial() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let config = quota_config(200);

    QuotaService::set_limit(&db.pool, "serviceX", 3).await.unwrap();

    let mut results = Vec::new();
    for _ in 0..4 {
        results.push(
            QuotaService::can_make_query(&db.pool, &config, user.id, "serviceX")
                .await
                .unwrap(),
        );
    }

    assert_eq!(results, vec![true, true, true, false]);
    assert_eq!(daily_row(&db.pool, user.id, "serviceX").await, Some(3));
}

#[actix_web::test]
async fn test_quota_isolated_per_user_and_service() {
    let db = TestDb::new().await;
    let user_a = create_test_user(&db.pool).await;
    let user_b = create_test_user(&db.pool).await;
    let config = quota_config(200);

    QuotaService::set_limit(&db.pool, "serviceX", 2).await.unwrap();
    QuotaService::set_limit(&db.pool, "serviceY", 2).await.unwrap();

    // Exhaust user A on service X
    for _ in 0..2 {
        assert!(QuotaService::can_make_query(&db.pool, &config, user_a.id, "serviceX")
            .await
            .unwrap());
    }
    assert!(!QuotaService::can_make_query(&db.pool, &config, user_a.id, "serviceX")
        .await
        .unwrap());

    // Same service, different user: unaffected
    assert!(QuotaService::can_make_query(&db.pool, &config, user_b.id, "serviceX")
        .await
        .unwrap());

    // Same user, different service: unaffected
    assert!(QuotaService::can_make_query(&db.pool, &config, user_a.id, "serviceY")
        .await
        .unwrap());
}

#[actix_web::test]
async fn test_first_check_creates_limit_row_with_default() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let config = quota_config(200);

    assert!(QuotaService::can_make_query(&db.pool, &config, user.id, "new-service")
        .await
        .unwrap());

    let limit: i32 =
        sqlx::query_scalar("SELECT daily_limit FROM service_query_limits WHERE service = $1")
            .bind("new-service")
            .fetch_one(&db.pool)
            .await
            .unwrap();
    assert_eq!(limit, 200);
}

#[actix_web::test]
async fn test_per_service_default_overrides_global_default() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let mut config = quota_config(200);
    config.service_defaults.insert("intelx".to_string(), 25);

    assert!(QuotaService::can_make_query(&db.pool, &config, user.id, "intelx")
        .await
        .unwrap());

    let limit: i32 =
        sqlx::query_scalar("SELECT daily_limit FROM service_query_limits WHERE service = $1")
            .bind("intelx")
            .fetch_one(&db.pool)
            .await
            .unwrap();
    assert_eq!(limit, 25);
}

#[actix_web::test]
async fn test_configured_limit_survives_quota_checks() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let config = quota_config(200);

    // Scenario: admin sets limit 5, six calls in one day
    QuotaService::set_limit(&db.pool, "shodan", 5).await.unwrap();

    for i in 0..5 {
        assert!(
            QuotaService::can_make_query(&db.pool, &config, user.id, "shodan")
                .await
                .unwrap(),
            "call {} should be allowed",
            i + 1
        );
    }
    assert!(!QuotaService::can_make_query(&db.pool, &config, user.id, "shodan")
        .await
        .unwrap());
}

#[actix_web::test]
async fn test_daily_usage_readback_reflects_consumption() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let config = quota_config(200);

    assert!(QuotaService::get_daily_usage(&db.pool, user.id, "shodan")
        .await
        .unwrap()
        .is_none());

    for _ in 0..2 {
        assert!(QuotaService::can_make_query(&db.pool, &config, user.id, "shodan")
            .await
            .unwrap());
    }

    let usage = QuotaService::get_daily_usage(&db.pool, user.id, "shodan")
        .await
        .unwrap()
        .expect("usage row should exist after consumption");
    assert_eq!(usage.user_id, user.id);
    assert_eq!(usage.service, "shodan");
    assert_eq!(usage.day, chrono::Utc::now().date_naive());
    assert_eq!(usage.queries_used, 2);
}

#[actix_web::test]
async fn test_set_limit_upserts() {
    let db = TestDb::new().await;

    let created = QuotaService::set_limit(&db.pool, "censys", 10).await.unwrap();
    assert_eq!(created.daily_limit, 10);

    let updated = QuotaService::set_limit(&db.pool, "censys", 50).await.unwrap();
    assert_eq!(updated.daily_limit, 50);

    let limits = QuotaService::list_limits(&db.pool).await.unwrap();
    let row = limits.iter().find(|l| l.service == "censys").unwrap();
    assert_eq!(row.daily_limit, 50);
}

#[actix_web::test]
async fn test_set_limit_validation() {
    let db = TestDb::new().await;

    assert!(QuotaService::set_limit(&db.pool, "", 10).await.is_err());
    assert!(QuotaService::set_limit(&db.pool, "shodan", -1).await.is_err());
}

#[actix_web::test]
async fn test_empty_service_is_a_validation_error_not_a_deny() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let config = quota_config(200);

    let result = QuotaService::can_make_query(&db.pool, &config, user.id, "").await;
    assert!(result.is_err());
}

// Historical policy: the first call of the day inserts the usage row before
// the limit is consulted, so a limit of 0 still admits one call.
#[actix_web::test]
async fn test_zero_limit_with_grace_allows_exactly_one_call() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let config = quota_config(200);

    QuotaService::set_limit(&db.pool, "blocked", 0).await.unwrap();

    assert!(QuotaService::can_make_query(&db.pool, &config, user.id, "blocked")
        .await
        .unwrap());
    assert!(!QuotaService::can_make_query(&db.pool, &config, user.id, "blocked")
        .await
        .unwrap());

    assert_eq!(daily_row(&db.pool, user.id, "blocked").await, Some(1));
}

#[actix_web::test]
async fn test_zero_limit_strict_denies_immediately() {
    let db = TestDb::new().await;
    let user = create_test_user(&db.pool).await;
    let config = quota_config_strict(200);

    QuotaService::set_limit(&db.pool, "blocked", 0).await.unwrap();

    assert!(!QuotaService::can_make_query(&db.pool, &config, user.id, "blocked")
        .await
        .unwrap());

    // Strict mode denies without creating a usage row
    assert_eq!(daily_row(&db.pool, user.id, "blocked").await, None);
}
