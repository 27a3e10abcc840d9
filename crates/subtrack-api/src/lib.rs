//! JSON REST API for subtrack.
//!
//! Exposes an axum [`Router`] backed by any
//! [`subtrack_core::store::SubscriptionStore`]. TLS, timeouts and request
//! tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! axum::serve(listener, subtrack_api::router(Arc::new(store))).await?;
//! ```

pub mod cost;
pub mod error;
pub mod subscriptions;

use std::sync::Arc;

use axum::{Router, routing::get};
use subtrack_core::store::SubscriptionStore;

pub use error::ApiError;

/// Path prefix every endpoint is served under.
pub const API_PREFIX: &str = "/api/v1";

/// Build the subscription routes for `store`, without the version prefix.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SubscriptionStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/subscriptions",
      get(subscriptions::list::<S>).post(subscriptions::create::<S>),
    )
    .route("/subscriptions/cost", get(cost::total::<S>))
    .route(
      "/subscriptions/{id}",
      get(subscriptions::get_one::<S>)
        .put(subscriptions::update::<S>)
        .delete(subscriptions::delete::<S>),
    )
    .route("/subscriptions/{id}/cost", get(cost::for_period::<S>))
    .with_state(store)
}

/// [`api_router`] nested under [`API_PREFIX`].
pub fn router<S>(store: Arc<S>) -> Router<()>
where
  S: SubscriptionStore + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new().nest(API_PREFIX, api_router(store))
}

#[cfg(test)]
mod tests;
