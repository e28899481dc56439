//! Shared harness for HTTP integration tests.
//!
//! Builds the production router over a `#[sqlx::test]` pool, mints tokens
//! with a fixed test secret and seeds a small tenant.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chairbook_api::auth::jwt::{generate_access_token, generate_customer_token, JwtConfig};
use chairbook_api::config::{SchedulingConfig, ServerConfig};
use chairbook_api::router::build_app_router;
use chairbook_api::state::AppState;
use chairbook_core::types::DbId;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        scheduling: SchedulingConfig::default(),
    }
}

/// The full application router (same middleware stack as production).
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

pub fn staff_token(user_id: DbId, role: &str, tenant_id: DbId) -> String {
    generate_access_token(user_id, role, tenant_id, &test_config().jwt).unwrap()
}

pub fn customer_token(customer_id: DbId, tenant_id: DbId) -> String {
    generate_customer_token(customer_id, tenant_id, &test_config().jwt).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seed data
// ---------------------------------------------------------------------------

/// One tenant with a branch open Monday to Friday 09:00-17:00, two barbers,
/// two customers and a 30-minute service; plus a second tenant.
#[derive(Debug, Clone, Copy)]
pub struct Seed {
    pub tenant_id: DbId,
    pub branch_id: DbId,
    pub barber_id: DbId,
    pub second_barber_id: DbId,
    pub customer_id: DbId,
    pub other_customer_id: DbId,
    pub service_id: DbId,
    pub foreign_tenant_id: DbId,
}

async fn insert(pool: &PgPool, sql: &str, binds: &[DbId], text: &str) -> DbId {
    let mut query = sqlx::query_as::<_, (DbId,)>(sql);
    for b in binds {
        query = query.bind(*b);
    }
    query.bind(text).fetch_one(pool).await.unwrap().0
}

pub async fn seed(pool: &PgPool) -> Seed {
    let tenant_id = insert(pool, "INSERT INTO tenants (name) VALUES ($1) RETURNING id", &[], "Fade Co").await;
    let foreign_tenant_id =
        insert(pool, "INSERT INTO tenants (name) VALUES ($1) RETURNING id", &[], "Other Co").await;
    let branch_id = insert(
        pool,
        "INSERT INTO branches (tenant_id, name) VALUES ($1, $2) RETURNING id",
        &[tenant_id],
        "Downtown",
    )
    .await;

    let barber_sql =
        "INSERT INTO barbers (tenant_id, branch_id, display_name) VALUES ($1, $2, $3) RETURNING id";
    let barber_id = insert(pool, barber_sql, &[tenant_id, branch_id], "Marco").await;
    let second_barber_id = insert(pool, barber_sql, &[tenant_id, branch_id], "Lena").await;

    let customer_sql = "INSERT INTO customers (tenant_id, name) VALUES ($1, $2) RETURNING id";
    let customer_id = insert(pool, customer_sql, &[tenant_id], "Sam").await;
    let other_customer_id = insert(pool, customer_sql, &[tenant_id], "Alex").await;

    let service_id = insert(
        pool,
        "INSERT INTO services (tenant_id, branch_id, duration_mins, price_cents, name) \
         VALUES ($1, $2, 30, 2000, $3) RETURNING id",
        &[tenant_id, branch_id],
        "Classic cut",
    )
    .await;

    for weekday in 1..=5i16 {
        sqlx::query(
            "INSERT INTO working_hours (branch_id, weekday, is_open, start_time, end_time) \
             VALUES ($1, $2, TRUE, '09:00', '17:00')",
        )
        .bind(branch_id)
        .bind(weekday)
        .execute(pool)
        .await
        .unwrap();
    }

    Seed {
        tenant_id,
        branch_id,
        barber_id,
        second_barber_id,
        customer_id,
        other_customer_id,
        service_id,
        foreign_tenant_id,
    }
}

/// Monday 2030-07-01 at `hh:mm` UTC, as an RFC 3339 string.
pub fn monday(hh_mm: &str) -> String {
    format!("2030-07-01T{hh_mm}:00Z")
}
