//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//!
//! Tokens are issued by the upstream identity service; the generators here
//! exist for tooling and tests.

pub mod jwt;
