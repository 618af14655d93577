//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - A `Serialize` response struct safe for API output

pub mod user;

pub use user::{CreateUser, UpdateUser, User, UserResponse};
