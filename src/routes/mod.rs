//! Router Module Index
//!
//! Routing is split by access level; the authentication layer is applied to
//! the authenticated module as a whole in `create_router`.

/// Routes accessible without credentials.
pub mod public;

/// Routes protected by the `AuthUser` middleware.
pub mod authenticated;
