//! Core types for Navdana.
//!
//! This module provides type-safe wrappers for the records exchanged with the
//! remote API and shared between the storefront, admin and CLI crates.

pub mod cart;
pub mod catalog;
pub mod contact;
pub mod id;
pub mod price;
pub mod role;
pub mod user;

pub use cart::CartLine;
pub use catalog::{Category, Product, ProductImage, ProductVariant};
pub use contact::{ContactMessage, Subscriber};
pub use id::*;
pub use price::{Price, PriceError};
pub use role::Role;
pub use user::User;
