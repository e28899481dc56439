//! Integration tests for the workload aggregator.
//!
//! Totals are recomputed inside every booking transaction and counted from
//! PENDING, CONFIRMED and COMPLETED appointments.

mod common;

use chairbook_core::appointment::AppointmentStatus;
use chairbook_core::booking::Actor;
use chairbook_core::workload::WorkloadTotals;
use chairbook_db::models::appointment::RescheduleAppointment;
use chairbook_db::repositories::{AppointmentRepo, WorkloadRepo};
use chrono::{Duration, NaiveDate};
use sqlx::PgPool;

use common::{at, booking, booking_day, seed};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bookings_update_barber_workload(pool: PgPool) {
    let fx = seed(&pool).await;
    for hour in [9, 11] {
        AppointmentRepo::create(&pool, &booking(&fx, at(hour, 0)), Actor::Customer(fx.customer_id))
            .await
            .unwrap();
    }

    let workload = WorkloadRepo::find_by_barber(&pool, fx.barber_id, booking_day())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(workload.total_appointments, 2);
    assert!(approx(workload.total_hours, 1.5));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cancel_and_completion_adjust_totals(pool: PgPool) {
    let fx = seed(&pool).await;
    let kept = AppointmentRepo::create(&pool, &booking(&fx, at(9, 0)), Actor::Customer(fx.customer_id))
        .await
        .unwrap();
    let dropped = AppointmentRepo::create(&pool, &booking(&fx, at(11, 0)), Actor::Customer(fx.customer_id))
        .await
        .unwrap();

    AppointmentRepo::cancel(&pool, dropped.id, Actor::Customer(fx.customer_id), None)
        .await
        .unwrap();
    AppointmentRepo::update_status(&pool, kept.id, AppointmentStatus::Confirmed, Actor::User(1), None)
        .await
        .unwrap();
    AppointmentRepo::update_status(&pool, kept.id, AppointmentStatus::Completed, Actor::User(1), None)
        .await
        .unwrap();

    let workload = WorkloadRepo::find_by_barber(&pool, fx.barber_id, booking_day())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(workload.total_appointments, 1);
    assert!(approx(workload.total_hours, 0.75));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reschedule_across_days_moves_workload(pool: PgPool) {
    let fx = seed(&pool).await;
    let appt = AppointmentRepo::create(&pool, &booking(&fx, at(10, 0)), Actor::Customer(fx.customer_id))
        .await
        .unwrap();

    AppointmentRepo::reschedule(
        &pool,
        appt.id,
        &RescheduleAppointment {
            start_time: at(10, 0) + Duration::days(1),
            notes: None,
        },
        Actor::Customer(fx.customer_id),
    )
    .await
    .unwrap();

    let day_one = WorkloadRepo::find_by_barber(&pool, fx.barber_id, booking_day())
        .await
        .unwrap()
        .unwrap();
    let day_two = WorkloadRepo::find_by_barber(&pool, fx.barber_id, NaiveDate::from_ymd_opt(2030, 7, 2).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(day_one.total_appointments, 0);
    assert_eq!(day_two.total_appointments, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upsert_overwrites_instead_of_accumulating(pool: PgPool) {
    let fx = seed(&pool).await;
    let totals = WorkloadTotals {
        total_appointments: 3,
        total_hours: 2.5,
    };

    WorkloadRepo::upsert(&pool, fx.barber_id, booking_day(), totals).await.unwrap();
    let row = WorkloadRepo::upsert(&pool, fx.barber_id, booking_day(), totals).await.unwrap();

    assert_eq!(row.total_appointments, 3);
    assert!(approx(row.total_hours, 2.5));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_branch_summary_counts_worked_barbers(pool: PgPool) {
    let fx = seed(&pool).await;
    AppointmentRepo::create(&pool, &booking(&fx, at(9, 0)), Actor::Customer(fx.customer_id))
        .await
        .unwrap();

    let summary = WorkloadRepo::branch_summary(&pool, fx.tenant_id, fx.branch_id, booking_day())
        .await
        .unwrap();
    assert_eq!(summary.total_barbers, 2);
    assert_eq!(summary.worked_barbers, 1);
    assert_eq!(summary.total_appointments, 1);
    assert!(approx(summary.total_hours, 0.75));
    assert!(approx(summary.utilisation_percent, 50.0));
}
