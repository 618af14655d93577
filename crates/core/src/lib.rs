//! Shared domain types for the stanchion workspace.
//!
//! This crate has no internal dependencies so it can be used by both the
//! repository layer and the API server.

pub mod error;
pub mod paging;
pub mod types;
pub mod validation;
