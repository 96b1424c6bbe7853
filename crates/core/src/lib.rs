//! Localmart Core - Shared types library.
//!
//! This crate provides common types used across all Localmart components:
//! - `server` - The marketplace API service
//! - `cli` - Command-line tools for migrations, search-index sync, and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles, geo points,
//!   stock statuses, and session tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
