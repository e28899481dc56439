pub mod appointment;
pub mod appointment_lock;
pub mod barber;
pub mod branch;
pub mod calendar;
pub mod service;
pub mod status_log;
pub mod workload;
