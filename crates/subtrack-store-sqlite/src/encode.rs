//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Months are stored as ISO dates
//! pinned to the first day (`YYYY-MM-01`) so that string comparison orders
//! them chronologically. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use subtrack_core::subscription::Subscription;
use uuid::Uuid;

use crate::{Error, Result};

/// Column list shared by every `SELECT` that builds a [`RawSubscription`].
pub const COLUMNS: &str =
  "id, service_name, price, user_id, start_date, end_date, created_at, updated_at";

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Month ────────────────────────────────────────────────────────────────────

pub fn encode_month(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_month(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw values read directly from a `subscriptions` row, in [`COLUMNS`] order.
pub struct RawSubscription {
  pub id:           String,
  pub service_name: String,
  pub price:        i64,
  pub user_id:      String,
  pub start_date:   String,
  pub end_date:     Option<String>,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawSubscription {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      service_name: row.get(1)?,
      price:        row.get(2)?,
      user_id:      row.get(3)?,
      start_date:   row.get(4)?,
      end_date:     row.get(5)?,
      created_at:   row.get(6)?,
      updated_at:   row.get(7)?,
    })
  }

  /// Decode every column and re-check the entity invariants.
  pub fn into_subscription(self) -> Result<Subscription> {
    let sub = Subscription {
      id:           decode_uuid(&self.id)?,
      service_name: self.service_name,
      price:        self.price,
      user_id:      self.user_id,
      start_date:   decode_month(&self.start_date)?,
      end_date:     self.end_date.as_deref().map(decode_month).transpose()?,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    };
    sub.validate()?;
    Ok(sub)
  }
}
