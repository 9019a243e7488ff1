//! # Domain Layer
//!
//! Pure policy and key logic: no I/O, no transactions, no panics in
//! non-test code. The service layer drives these types through the
//! outbound ports.

pub mod eid;
pub mod entities;
pub mod errors;
pub mod rules;
pub mod time_index;
