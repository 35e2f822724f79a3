//! Navdana storefront client library.
//!
//! Typed client and state layer over the Navdana REST API: catalog and live
//! search, the shopping cart, email OTP login, the persisted session and the
//! client-side route guard. Front ends (the `navdana` CLI, tests) build an
//! [`AppState`](state::AppState) and drive these components from it.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod guard;
pub mod notify;
pub mod routes;
pub mod search;
pub mod session;
pub mod state;
