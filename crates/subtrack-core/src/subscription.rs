//! Subscription: a user's billed access to a named service over a range of
//! months.
//!
//! [`NewSubscription`] is the only way to build a valid record: its
//! constructor trims and validates every field. The store turns it into a
//! persisted [`Subscription`] by assigning an id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  month::{self, first_of_month, months_between},
};

/// Inclusive bounds on the trimmed service name length, in characters.
pub const SERVICE_NAME_LEN: std::ops::RangeInclusive<usize> = 2..=100;

/// Exact length of a user id (hyphenated UUID shape).
pub const USER_ID_LEN: usize = 36;

// ─── Validation ──────────────────────────────────────────────────────────────

/// Check every field invariant, first failure wins. Strings are trimmed here
/// even if the caller already trimmed them.
fn check_fields(
  service_name: &str,
  price:        i64,
  user_id:      &str,
  start_date:   NaiveDate,
  end_date:     Option<NaiveDate>,
) -> Result<()> {
  if !SERVICE_NAME_LEN.contains(&service_name.trim().chars().count()) {
    return Err(Error::InvalidServiceName);
  }
  if price <= 0 {
    return Err(Error::InvalidPrice);
  }
  if user_id.trim().chars().count() != USER_ID_LEN {
    return Err(Error::InvalidUserId);
  }
  if end_date.is_some_and(|end| end < start_date) {
    return Err(Error::InvalidDateRange);
  }
  Ok(())
}

// ─── NewSubscription ─────────────────────────────────────────────────────────

/// A validated subscription that has not been persisted yet.
///
/// Input to [`crate::store::SubscriptionStore::create`] and
/// [`crate::store::SubscriptionStore::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
  pub service_name: String,
  pub price:        i64,
  pub user_id:      String,
  pub start_date:   NaiveDate,
  pub end_date:     Option<NaiveDate>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl NewSubscription {
  /// Trim, normalise to whole months, and validate.
  pub fn new(
    service_name: &str,
    price:        i64,
    user_id:      &str,
    start_date:   NaiveDate,
    end_date:     Option<NaiveDate>,
  ) -> Result<Self> {
    let now = Utc::now();
    let input = Self {
      service_name: service_name.trim().to_owned(),
      price,
      user_id: user_id.trim().to_owned(),
      start_date: first_of_month(start_date),
      end_date: end_date.map(first_of_month),
      created_at: now,
      updated_at: now,
    };
    input.validate()?;
    Ok(input)
  }

  pub fn validate(&self) -> Result<()> {
    check_fields(
      &self.service_name,
      self.price,
      &self.user_id,
      self.start_date,
      self.end_date,
    )
  }

  /// Attach a store-assigned id.
  pub fn into_subscription(self, id: Uuid) -> Subscription {
    Subscription {
      id,
      service_name: self.service_name,
      price: self.price,
      user_id: self.user_id,
      start_date: self.start_date,
      end_date: self.end_date,
      created_at: self.created_at,
      updated_at: self.updated_at,
    }
  }
}

// ─── Subscription ────────────────────────────────────────────────────────────

/// A persisted subscription.
///
/// `end_date == None` means the subscription is still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  pub id:           Uuid,
  pub service_name: String,
  pub price:        i64,
  pub user_id:      String,
  #[serde(with = "month::serde_month")]
  pub start_date:   NaiveDate,
  #[serde(
    with = "month::serde_month_opt",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub end_date:     Option<NaiveDate>,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

impl Subscription {
  pub fn validate(&self) -> Result<()> {
    check_fields(
      &self.service_name,
      self.price,
      &self.user_id,
      self.start_date,
      self.end_date,
    )
  }

  /// Replace every mutable field with `changes`. The id and `created_at`
  /// survive; `updated_at` comes from `changes`.
  pub fn apply(self, changes: NewSubscription) -> Subscription {
    Subscription {
      created_at: self.created_at,
      ..changes.into_subscription(self.id)
    }
  }

  /// Whether the whole `[from, to]` window lies inside the subscription's
  /// span. Merely overlapping is not enough.
  pub fn is_active_during(&self, from: NaiveDate, to: NaiveDate) -> bool {
    if to < from {
      return false;
    }
    from >= self.start_date && self.end_date.is_none_or(|end| to <= end)
  }

  /// Price owed for the window `[from, to)`, counted in whole months.
  /// Zero unless the window is fully contained in the subscription.
  pub fn cost_for_period(&self, from: NaiveDate, to: NaiveDate) -> i64 {
    if !self.is_active_during(from, to) {
      return 0;
    }

    let lower = from.max(self.start_date);
    let upper = match self.end_date {
      Some(end) => to.min(end),
      None => to,
    };
    self.price.saturating_mul(months_between(lower, upper))
  }
}
