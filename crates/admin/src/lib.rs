//! Navdana admin dashboard client.
//!
//! Typed access to the dashboard endpoints of the Navdana API: user
//! accounts, contact page messages and newsletter subscribers. Requests are
//! authenticated with the bearer token of the signed-in admin taken from the
//! storefront's session store.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod client;
mod error;
mod types;

pub use client::AdminClient;
pub use error::AdminError;
pub use types::{ContactList, MailRequest, SubscriberList, UserForm, UserList, UserPayload};
