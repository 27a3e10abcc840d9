//! Core types and trait definitions for the subtrack subscription service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

// Native `async fn` in traits; the `Send` bounds are spelled out on the
// `SubscriptionStore` signatures instead.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod month;
pub mod store;
pub mod subscription;

pub use error::{Error, Result};
