//! Per-barber, per-day workload arithmetic.
//!
//! Totals are always recomputed from the appointments of the day and written
//! whole, so repeated upserts converge instead of drifting.

use serde::Serialize;

use crate::booking::TimeWindow;

/// Recomputed totals for one barber on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct WorkloadTotals {
    pub total_appointments: i32,
    pub total_hours: f64,
}

/// Sum appointment windows into workload totals.
pub fn tally<'a>(windows: impl IntoIterator<Item = &'a TimeWindow>) -> WorkloadTotals {
    let (count, minutes) = windows
        .into_iter()
        .fold((0i32, 0i64), |(count, minutes), w| {
            (count + 1, minutes + w.duration().num_minutes())
        });
    WorkloadTotals {
        total_appointments: count,
        total_hours: minutes as f64 / 60.0,
    }
}

/// Share of registered barbers that worked on a day, as a percentage.
pub fn utilisation_percent(worked_barbers: i64, total_barbers: i64) -> f64 {
    if total_barbers <= 0 {
        return 0.0;
    }
    (worked_barbers as f64 / total_barbers as f64) * 100.0
}
