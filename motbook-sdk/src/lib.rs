//! SDK for the MOT booking backend.
//!
//! `objects` holds the wire types shared by every crate in the workspace,
//! `config` the validated runtime settings, and `client` (behind the
//! `client` feature) the typed HTTP clients.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

#[cfg(feature = "client")]
pub mod client;
pub mod config;
pub mod objects;
