//! Core types and trait definitions for the codehint service.
//!
//! This crate is free of HTTP, SMTP and database dependencies. Storage, mail
//! and model backends implement the traits defined here; the API layer is
//! generic over them.

// We intentionally use native `async fn` in trait impls. Trait declarations
// spell out `impl Future + Send` so the futures can cross axum handlers.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod ledger;
pub mod mail;
pub mod model;
pub mod otp;
pub mod prompt;
pub mod store;
pub mod user;

pub use error::{Error, Result};
