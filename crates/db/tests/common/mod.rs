//! Seed data for repository integration tests.
//!
//! The collaborator tables (tenants, branches, barbers, customers, services)
//! have no repositories of their own, so fixtures insert them directly.

use chairbook_core::types::{DbId, Timestamp};
use chairbook_db::models::appointment::CreateAppointment;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use sqlx::PgPool;

/// IDs of one seeded tenant with a branch, two barbers, two customers and a
/// 45-minute service.
#[derive(Debug, Clone, Copy)]
pub struct Fixture {
    pub tenant_id: DbId,
    pub branch_id: DbId,
    pub other_branch_id: DbId,
    pub barber_id: DbId,
    pub second_barber_id: DbId,
    pub other_branch_barber_id: DbId,
    pub customer_id: DbId,
    pub other_customer_id: DbId,
    pub service_id: DbId,
}

async fn insert_id(pool: &PgPool, sql: &str) -> DbId {
    let row: (DbId,) = sqlx::query_as(sql).fetch_one(pool).await.unwrap();
    row.0
}

pub async fn seed(pool: &PgPool) -> Fixture {
    let tenant_id = insert_id(pool, "INSERT INTO tenants (name) VALUES ('Fade Co') RETURNING id").await;

    let branch_id: (DbId,) =
        sqlx::query_as("INSERT INTO branches (tenant_id, name) VALUES ($1, 'Downtown') RETURNING id")
            .bind(tenant_id)
            .fetch_one(pool)
            .await
            .unwrap();
    let other_branch_id: (DbId,) =
        sqlx::query_as("INSERT INTO branches (tenant_id, name) VALUES ($1, 'Harbour') RETURNING id")
            .bind(tenant_id)
            .fetch_one(pool)
            .await
            .unwrap();

    let barber_id = insert_barber(pool, tenant_id, branch_id.0, "Marco").await;
    let second_barber_id = insert_barber(pool, tenant_id, branch_id.0, "Lena").await;
    let other_branch_barber_id = insert_barber(pool, tenant_id, other_branch_id.0, "Theo").await;

    let customer_id = insert_customer(pool, tenant_id, "Sam").await;
    let other_customer_id = insert_customer(pool, tenant_id, "Alex").await;

    let service_id = insert_service(pool, tenant_id, Some(branch_id.0), "Skin fade", 45).await;

    Fixture {
        tenant_id,
        branch_id: branch_id.0,
        other_branch_id: other_branch_id.0,
        barber_id,
        second_barber_id,
        other_branch_barber_id,
        customer_id,
        other_customer_id,
        service_id,
    }
}

pub async fn insert_barber(pool: &PgPool, tenant_id: DbId, branch_id: DbId, name: &str) -> DbId {
    let row: (DbId,) = sqlx::query_as(
        "INSERT INTO barbers (tenant_id, branch_id, display_name) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(tenant_id)
    .bind(branch_id)
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap();
    row.0
}

pub async fn insert_customer(pool: &PgPool, tenant_id: DbId, name: &str) -> DbId {
    let row: (DbId,) =
        sqlx::query_as("INSERT INTO customers (tenant_id, name) VALUES ($1, $2) RETURNING id")
            .bind(tenant_id)
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap();
    row.0
}

pub async fn insert_service(
    pool: &PgPool,
    tenant_id: DbId,
    branch_id: Option<DbId>,
    name: &str,
    duration_mins: i32,
) -> DbId {
    let row: (DbId,) = sqlx::query_as(
        "INSERT INTO services (tenant_id, branch_id, name, duration_mins, price_cents) \
         VALUES ($1, $2, $3, $4, 2500) RETURNING id",
    )
    .bind(tenant_id)
    .bind(branch_id)
    .bind(name)
    .bind(duration_mins)
    .fetch_one(pool)
    .await
    .unwrap();
    row.0
}

/// Open Monday to Friday, 09:00 to 17:00.
pub async fn open_weekdays(pool: &PgPool, branch_id: DbId) {
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
}

/// A UTC instant on 2030-07-01 (a Monday), far enough ahead for lock tests.
pub fn at(hour: u32, minute: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2030, 7, 1, hour, minute, 0).unwrap()
}

pub fn booking_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 7, 1).unwrap()
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// A complete booking request for the fixture's first barber.
pub fn booking(fx: &Fixture, start: Timestamp) -> CreateAppointment {
    CreateAppointment {
        tenant_id: Some(fx.tenant_id),
        branch_id: Some(fx.branch_id),
        service_id: Some(fx.service_id),
        barber_id: Some(fx.barber_id),
        customer_id: Some(fx.customer_id),
        start_time: Some(start),
        notes: None,
        lock_id: None,
    }
}
