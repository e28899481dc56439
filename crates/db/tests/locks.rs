//! Integration tests for the reservation lock manager.
//!
//! Exercises `AppointmentLockRepo` and its interplay with booking:
//! - Overlapping holds on one barber are rejected with `SlotLocked`, also
//!   when both are requested at the same time
//! - Holds are only placed for customers of the lock's tenant
//! - Releasing a hold frees the range; releasing twice or after expiry is
//!   `LockNotFound`
//! - Expired holds never block, swept or not
//! - Booking with and without converting a hold

mod common;

use assert_matches::assert_matches;
use chairbook_core::booking::{Actor, SchedulingError};
use chairbook_core::types::Timestamp;
use chairbook_db::models::appointment_lock::CreateAppointmentLock;
use chairbook_db::repositories::{AppointmentLockRepo, AppointmentRepo};
use chairbook_db::EngineError;
use chrono::{Duration, Utc};
use sqlx::PgPool;

use common::{at, booking, booking_day, insert_customer, seed, Fixture};

fn hold() -> Duration {
    Duration::minutes(7)
}

fn lock_input(fx: &Fixture, customer_id: i64, start: Timestamp, end: Timestamp) -> CreateAppointmentLock {
    CreateAppointmentLock {
        tenant_id: fx.tenant_id,
        branch_id: fx.branch_id,
        barber_id: fx.barber_id,
        customer_id,
        start_time: start,
        end_time: end,
    }
}

fn scheduling(err: EngineError) -> SchedulingError {
    match err {
        EngineError::Scheduling(e) => e,
        EngineError::Database(e) => panic!("unexpected database error: {e}"),
    }
}

async fn expire(pool: &PgPool, lock_id: i64) {
    sqlx::query("UPDATE appointment_locks SET expires_at = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(lock_id)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// Create / release
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overlapping_lock_is_rejected_until_released(pool: PgPool) {
    let fx = seed(&pool).await;

    let first = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(10, 0), at(10, 30)),
        hold(),
    )
    .await
    .unwrap();
    assert!(first.is_active);

    let second = lock_input(&fx, fx.other_customer_id, at(10, 15), at(10, 45));
    let err = AppointmentLockRepo::create(&pool, &second, hold())
        .await
        .unwrap_err();
    assert_eq!(scheduling(err), SchedulingError::SlotLocked);

    let released = AppointmentLockRepo::release(&pool, first.id).await.unwrap();
    assert!(!released.is_active);

    AppointmentLockRepo::create(&pool, &second, hold())
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_new_lock_expires_after_hold(pool: PgPool) {
    let fx = seed(&pool).await;
    let before = Utc::now();

    let lock = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(10, 0), at(10, 30)),
        hold(),
    )
    .await
    .unwrap();

    assert!(lock.expires_at >= before + hold());
    assert!(lock.expires_at <= Utc::now() + hold());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_release_twice_is_not_found(pool: PgPool) {
    let fx = seed(&pool).await;
    let lock = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(10, 0), at(10, 30)),
        hold(),
    )
    .await
    .unwrap();

    AppointmentLockRepo::release(&pool, lock.id).await.unwrap();
    let err = AppointmentLockRepo::release(&pool, lock.id).await.unwrap_err();
    assert_eq!(scheduling(err), SchedulingError::LockNotFound(lock.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_lock_cannot_be_released(pool: PgPool) {
    let fx = seed(&pool).await;
    let lock = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(10, 0), at(10, 30)),
        hold(),
    )
    .await
    .unwrap();
    expire(&pool, lock.id).await;

    let err = AppointmentLockRepo::release(&pool, lock.id).await.unwrap_err();
    assert_eq!(scheduling(err), SchedulingError::LockNotFound(lock.id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_overlapping_locks_one_wins(pool: PgPool) {
    let fx = seed(&pool).await;

    let mut handles = Vec::new();
    for (customer_id, start, end) in [
        (fx.customer_id, at(10, 0), at(10, 30)),
        (fx.other_customer_id, at(10, 15), at(10, 45)),
    ] {
        let pool = pool.clone();
        let input = lock_input(&fx, customer_id, start, end);
        handles.push(tokio::spawn(async move {
            AppointmentLockRepo::create(&pool, &input, hold()).await
        }));
    }

    let mut ok = 0;
    let mut locked = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(err) => {
                assert_eq!(scheduling(err), SchedulingError::SlotLocked);
                locked += 1;
            }
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(locked, 1);

    let live = AppointmentLockRepo::list_active(
        &pool,
        fx.branch_id,
        Some(fx.barber_id),
        booking_day(),
        Utc::now(),
    )
    .await
    .unwrap();
    assert_eq!(live.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lock_for_customer_of_another_tenant_is_rejected(pool: PgPool) {
    let fx = seed(&pool).await;
    let (other_tenant,): (i64,) =
        sqlx::query_as("INSERT INTO tenants (name) VALUES ('Other Co') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();
    let outsider = insert_customer(&pool, other_tenant, "Jo").await;

    let err = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, outsider, at(10, 0), at(10, 45)),
        hold(),
    )
    .await
    .unwrap_err();
    assert_matches!(scheduling(err), SchedulingError::InvalidInput(_));

    // Nothing was held, so a customer of the tenant can take the range.
    AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(10, 0), at(10, 45)),
        hold(),
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lock_over_booked_slot_is_taken(pool: PgPool) {
    let fx = seed(&pool).await;
    AppointmentRepo::create(&pool, &booking(&fx, at(10, 0)), Actor::Customer(fx.customer_id))
        .await
        .unwrap();

    let err = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.other_customer_id, at(10, 30), at(11, 0)),
        hold(),
    )
    .await
    .unwrap_err();
    assert_eq!(scheduling(err), SchedulingError::SlotTaken);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lock_rejects_bad_windows_and_barbers(pool: PgPool) {
    let fx = seed(&pool).await;

    let inverted = lock_input(&fx, fx.customer_id, at(11, 0), at(10, 0));
    let err = AppointmentLockRepo::create(&pool, &inverted, hold())
        .await
        .unwrap_err();
    assert_matches!(scheduling(err), SchedulingError::InvalidInput(_));

    let past_start = Utc::now() - Duration::hours(2);
    let past = lock_input(&fx, fx.customer_id, past_start, past_start + Duration::minutes(30));
    let err = AppointmentLockRepo::create(&pool, &past, hold())
        .await
        .unwrap_err();
    assert_matches!(scheduling(err), SchedulingError::InvalidInput(_));

    let mut foreign = lock_input(&fx, fx.customer_id, at(10, 0), at(10, 30));
    foreign.barber_id = fx.other_branch_barber_id;
    let err = AppointmentLockRepo::create(&pool, &foreign, hold())
        .await
        .unwrap_err();
    assert_matches!(scheduling(err), SchedulingError::BarberMismatch { .. });
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_lock_never_blocks(pool: PgPool) {
    let fx = seed(&pool).await;
    let stale = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(10, 0), at(10, 30)),
        hold(),
    )
    .await
    .unwrap();
    expire(&pool, stale.id).await;

    // Still flagged active: the sweeper has not run.
    let row = AppointmentLockRepo::find_by_id(&pool, stale.id)
        .await
        .unwrap()
        .unwrap();
    assert!(row.is_active);

    AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.other_customer_id, at(10, 0), at(10, 30)),
        hold(),
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_lock_does_not_block_booking(pool: PgPool) {
    let fx = seed(&pool).await;
    let stale = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.other_customer_id, at(10, 0), at(10, 45)),
        hold(),
    )
    .await
    .unwrap();
    expire(&pool, stale.id).await;

    AppointmentRepo::create(&pool, &booking(&fx, at(10, 0)), Actor::Customer(fx.customer_id))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cleanup_deactivates_only_expired_locks(pool: PgPool) {
    let fx = seed(&pool).await;
    let stale = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(10, 0), at(10, 30)),
        hold(),
    )
    .await
    .unwrap();
    let fresh = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(11, 0), at(11, 30)),
        hold(),
    )
    .await
    .unwrap();
    expire(&pool, stale.id).await;

    let swept = AppointmentLockRepo::cleanup_expired(&pool, Utc::now()).await.unwrap();
    assert_eq!(swept, 1);
    assert_eq!(
        AppointmentLockRepo::cleanup_expired(&pool, Utc::now()).await.unwrap(),
        0
    );

    let stale = AppointmentLockRepo::find_by_id(&pool, stale.id).await.unwrap().unwrap();
    let fresh = AppointmentLockRepo::find_by_id(&pool, fresh.id).await.unwrap().unwrap();
    assert!(!stale.is_active);
    assert!(fresh.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_active_returns_live_locks_by_start(pool: PgPool) {
    let fx = seed(&pool).await;
    let late = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(15, 0), at(15, 30)),
        hold(),
    )
    .await
    .unwrap();
    let early = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(9, 0), at(9, 30)),
        hold(),
    )
    .await
    .unwrap();
    let stale = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(12, 0), at(12, 30)),
        hold(),
    )
    .await
    .unwrap();
    expire(&pool, stale.id).await;

    let locks = AppointmentLockRepo::list_active(
        &pool,
        fx.branch_id,
        Some(fx.barber_id),
        booking_day(),
        Utc::now(),
    )
    .await
    .unwrap();
    let ids: Vec<_> = locks.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![early.id, late.id]);
}

// ---------------------------------------------------------------------------
// Booking with holds
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_booking_converts_own_lock(pool: PgPool) {
    let fx = seed(&pool).await;
    let lock = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(10, 0), at(10, 45)),
        hold(),
    )
    .await
    .unwrap();

    let mut input = booking(&fx, at(10, 0));
    input.lock_id = Some(lock.id);
    AppointmentRepo::create(&pool, &input, Actor::Customer(fx.customer_id))
        .await
        .unwrap();

    let consumed = AppointmentLockRepo::find_by_id(&pool, lock.id).await.unwrap().unwrap();
    assert!(!consumed.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_own_lock_does_not_block_own_booking(pool: PgPool) {
    let fx = seed(&pool).await;
    AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(10, 0), at(10, 30)),
        hold(),
    )
    .await
    .unwrap();

    AppointmentRepo::create(&pool, &booking(&fx, at(10, 0)), Actor::Customer(fx.customer_id))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_another_customers_lock_blocks_booking(pool: PgPool) {
    let fx = seed(&pool).await;
    AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.other_customer_id, at(10, 30), at(11, 0)),
        hold(),
    )
    .await
    .unwrap();

    let err = AppointmentRepo::create(&pool, &booking(&fx, at(10, 0)), Actor::Customer(fx.customer_id))
        .await
        .unwrap_err();
    assert_eq!(scheduling(err), SchedulingError::SlotLocked);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_lock_window_must_match_booking(pool: PgPool) {
    let fx = seed(&pool).await;
    // 30-minute hold, but the service takes 45 minutes.
    let lock = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(10, 0), at(10, 30)),
        hold(),
    )
    .await
    .unwrap();

    let mut input = booking(&fx, at(10, 0));
    input.lock_id = Some(lock.id);
    let err = AppointmentRepo::create(&pool, &input, Actor::Customer(fx.customer_id))
        .await
        .unwrap_err();
    assert_matches!(scheduling(err), SchedulingError::LockMismatch(_));

    // The failed booking rolled back, so the hold is still live.
    let still = AppointmentLockRepo::find_by_id(&pool, lock.id).await.unwrap().unwrap();
    assert!(still.is_active);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_foreign_lock_cannot_be_converted(pool: PgPool) {
    let fx = seed(&pool).await;
    let lock = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.other_customer_id, at(10, 0), at(10, 45)),
        hold(),
    )
    .await
    .unwrap();

    let mut input = booking(&fx, at(10, 0));
    input.lock_id = Some(lock.id);
    let err = AppointmentRepo::create(&pool, &input, Actor::Customer(fx.customer_id))
        .await
        .unwrap_err();
    assert_matches!(scheduling(err), SchedulingError::LockMismatch(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_released_lock_cannot_be_converted(pool: PgPool) {
    let fx = seed(&pool).await;
    let lock = AppointmentLockRepo::create(
        &pool,
        &lock_input(&fx, fx.customer_id, at(10, 0), at(10, 45)),
        hold(),
    )
    .await
    .unwrap();
    AppointmentLockRepo::release(&pool, lock.id).await.unwrap();

    let mut input = booking(&fx, at(10, 0));
    input.lock_id = Some(lock.id);
    let err = AppointmentRepo::create(&pool, &input, Actor::Customer(fx.customer_id))
        .await
        .unwrap_err();
    assert_eq!(scheduling(err), SchedulingError::LockNotFound(lock.id));
}
