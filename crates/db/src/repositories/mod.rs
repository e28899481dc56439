//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Helpers that must run inside a
//! caller's transaction take `&mut PgConnection` instead, and single-query
//! lookups shared by both paths take any `PgExecutor`.
//!
//! Lock order inside booking transactions is always barber row, then
//! appointment row, then workload row.

pub mod appointment_lock_repo;
pub mod appointment_repo;
pub mod availability_repo;
pub mod barber_repo;
pub mod branch_repo;
pub mod customer_repo;
pub mod service_repo;
pub mod status_log_repo;
pub mod unavailability_repo;
pub mod working_day_override_repo;
pub mod working_hour_repo;
pub mod workload_repo;

pub use appointment_lock_repo::AppointmentLockRepo;
pub use appointment_repo::AppointmentRepo;
pub use availability_repo::AvailabilityRepo;
pub use barber_repo::BarberRepo;
pub use branch_repo::BranchRepo;
pub use customer_repo::CustomerRepo;
pub use service_repo::ServiceRepo;
pub use status_log_repo::StatusLogRepo;
pub use unavailability_repo::UnavailabilityRepo;
pub use working_day_override_repo::WorkingDayOverrideRepo;
pub use working_hour_repo::WorkingHourRepo;
pub use workload_repo::WorkloadRepo;
