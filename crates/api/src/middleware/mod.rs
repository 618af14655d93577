//! Identity middleware extractors.
//!
//! - [`identity::CurrentUser`] -- the validated session identity; rejects
//!   unauthenticated requests with a redirect to the login route.
//! - [`identity::OptionalUser`] -- never rejects; defaults for anonymous.

pub mod identity;
