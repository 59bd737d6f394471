//! HTTP server library for the care-marketplace wallet ledger.
//!
//! The binary in `main.rs` wires configuration and the database pool into
//! [`api::create_router`]; integration tests use this library to drive the
//! same router in-process.

pub mod api;
pub mod config;
pub mod logging;
