//! Stanchion API server library.
//!
//! Exposes the core building blocks (config, state, error handling, session
//! auth, routes) so integration tests and the binary entrypoint can both
//! access them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod router;
pub mod routes;
pub mod state;
