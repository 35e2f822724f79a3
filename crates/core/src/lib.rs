//! Navdana Core - Shared types library.
//!
//! This crate provides the domain types used across all Navdana components:
//! - `storefront` - Catalog, cart, session and login flow over the remote API
//! - `admin` - Dashboard client for users, contact messages and subscribers
//! - `cli` - Command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no HTTP
//! clients. Wire formats follow the remote API (`_id` keys, camelCase fields).
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, roles, users, catalog and cart records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
