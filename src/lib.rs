//! Launchpad Auth - permission-gated authentication for the Launchpad platform
//!
//! Administrators, startup owners, investors, and regular users sign in with
//! salted HS256 session tokens. Every action is gated on a capability bitmask.
//!
//! - [`auth::TokenService`] issues and verifies access, refresh, and
//!   email-verification tokens.
//! - [`auth::permissions`] defines the capability bits, role presets, and
//!   predicates.
//! - [`routes`] wires both into an axum API backed by the in-memory
//!   [`users::UserStore`].

pub mod auth;
pub mod config;
pub mod error;
pub mod mailer;
pub mod routes;
pub mod state;
pub mod users;
