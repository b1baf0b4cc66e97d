//! Quotrak Server Library
//!
//! Subscription ledger, per-service daily quota limiter, and usage recorder
//! behind a small HTTP API. Exposed as a library for integration tests.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
