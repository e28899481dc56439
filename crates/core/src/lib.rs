pub mod appointment;
pub mod availability;
pub mod booking;
pub mod error;
pub mod reservation;
pub mod roles;
pub mod types;
pub mod workload;
