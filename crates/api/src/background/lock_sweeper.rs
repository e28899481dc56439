//! Periodic deactivation of expired checkout locks.
//!
//! Expired locks never block bookings (every check filters on
//! `expires_at`), so the sweep only keeps `is_active` truthful for listings
//! and reporting.

use std::time::Duration;

use chairbook_db::repositories::AppointmentLockRepo;
use chrono::Utc;
use sqlx::PgPool;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Run the sweep loop every `interval` until `cancel` is triggered.
///
/// A failed sweep is logged and retried on the next tick.
pub async fn run(pool: PgPool, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Lock sweeper started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("Lock sweeper stopping");
                break;
            }
            _ = ticker.tick() => {
                sweep_once(&pool).await;
            }
        }
    }
}

/// One sweep. Returns the number of locks deactivated (0 on failure).
pub async fn sweep_once(pool: &PgPool) -> u64 {
    match AppointmentLockRepo::cleanup_expired(pool, Utc::now()).await {
        Ok(0) => {
            tracing::debug!("Lock sweeper: no expired locks");
            0
        }
        Ok(deactivated) => {
            tracing::info!(deactivated, "Lock sweeper: deactivated expired locks");
            deactivated
        }
        Err(e) => {
            tracing::error!(error = %e, "Lock sweeper: cleanup failed");
            0
        }
    }
}
