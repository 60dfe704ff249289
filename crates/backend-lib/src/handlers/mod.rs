// crates/backend-lib/src/handlers/mod.rs

//! HTTP handlers for the Parley backend.

pub mod auth;
