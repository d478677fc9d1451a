//! Request extractors.
//!
//! - [`auth::AuthUser`] -- the caller identified by a Bearer token.

pub mod auth;
