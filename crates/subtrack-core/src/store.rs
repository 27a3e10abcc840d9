//! The `SubscriptionStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `subtrack-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::subscription::{NewSubscription, Subscription};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Filters for [`SubscriptionStore::list`] and
/// [`SubscriptionStore::total_cost`]. Unset fields do not constrain the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
  pub service_name:    Option<String>,
  pub user_id:         Option<String>,
  /// Lower bound (inclusive) on `start_date`.
  pub start_date_from: Option<NaiveDate>,
  /// Upper bound (inclusive) on `start_date`.
  pub start_date_to:   Option<NaiveDate>,
}

impl SubscriptionFilter {
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// In-memory equivalent of the predicate a SQL backend builds.
  pub fn matches(&self, sub: &Subscription) -> bool {
    self.service_name.as_ref().is_none_or(|n| *n == sub.service_name)
      && self.user_id.as_ref().is_none_or(|u| *u == sub.user_id)
      && self.start_date_from.is_none_or(|from| sub.start_date >= from)
      && self.start_date_to.is_none_or(|to| sub.start_date <= to)
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a subscription store backend.
///
/// Each method is a single independent statement; there are no
/// multi-operation transactions. Missing ids are reported through `Option`
/// or `bool`, never through `Self::Error`.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SubscriptionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a validated subscription and return it with its new id.
  fn create(
    &self,
    input: NewSubscription,
  ) -> impl Future<Output = Result<Subscription, Self::Error>> + Send + '_;

  /// Retrieve a subscription by id. Returns `None` if not found.
  fn get(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + '_;

  /// Replace the mutable fields of subscription `id`. Returns the stored
  /// result, or `None` if no such subscription exists.
  fn update(
    &self,
    id: Uuid,
    changes: NewSubscription,
  ) -> impl Future<Output = Result<Option<Subscription>, Self::Error>> + Send + '_;

  /// Delete subscription `id`. Returns `false` if it did not exist.
  fn delete(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All subscriptions matching `filter`, ordered by start month then
  /// creation time.
  fn list<'a>(
    &'a self,
    filter: &'a SubscriptionFilter,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + 'a;

  /// Sum of `price` over all subscriptions matching `filter`; `0` when
  /// nothing matches.
  fn total_cost<'a>(
    &'a self,
    filter: &'a SubscriptionFilter,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + 'a;
}
