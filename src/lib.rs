//! Bestiary Backend Library
//!
//! Gated content service (sessions, rank and school guards) and the
//! JSON-file collections behind it. Used by the `bestiary-server` and
//! `bestiary` binaries.

pub mod alchemy;
pub mod api;
pub mod auth;
pub mod config;
pub mod contracts;
pub mod middleware;
pub mod store;
