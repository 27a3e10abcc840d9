//! Calendar-month dates.
//!
//! Subscriptions are billed by the month, so start and end dates carry no
//! day-of-month information. They are held as [`NaiveDate`]s pinned to the
//! first day of the month and rendered as `MM-YYYY` on the wire.

use chrono::{Datelike, Months, NaiveDate};

use crate::{Error, Result};

/// Parse a `MM-YYYY` string (e.g. `"07-2025"`) into the first day of that
/// month. Surrounding whitespace is ignored.
pub fn parse_month_year(input: &str) -> Result<NaiveDate> {
  let invalid = || Error::InvalidMonth(input.to_owned());

  let (month, year) = input.trim().split_once('-').ok_or_else(invalid)?;
  let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
  if month.len() != 2 || year.len() != 4 || !all_digits(month) || !all_digits(year) {
    return Err(invalid());
  }

  let month: u32 = month.parse().map_err(|_| invalid())?;
  let year: i32 = year.parse().map_err(|_| invalid())?;
  NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
}

/// Render a date as `MM-YYYY`, dropping the day.
pub fn format_month_year(date: NaiveDate) -> String {
  date.format("%m-%Y").to_string()
}

/// Pin `date` to the first day of its month.
pub fn first_of_month(date: NaiveDate) -> NaiveDate {
  date.with_day(1).unwrap_or(date)
}

/// Count whole one-month steps from `from` while it is still before `to`.
///
/// Returns 0 when `to <= from`. A step that would overflow the calendar ends
/// the count.
pub fn months_between(mut from: NaiveDate, to: NaiveDate) -> i64 {
  let mut months = 0;
  while from < to {
    match from.checked_add_months(Months::new(1)) {
      Some(next) => from = next,
      None => break,
    }
    months += 1;
  }
  months
}

/// `#[serde(with = "...")]` adapter for a required `MM-YYYY` field.
pub mod serde_month {
  use chrono::NaiveDate;
  use serde::{Deserialize, Deserializer, Serializer, de};

  pub fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    serializer.serialize_str(&super::format_month_year(*date))
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw = String::deserialize(deserializer)?;
    super::parse_month_year(&raw).map_err(de::Error::custom)
  }
}

/// `#[serde(with = "...")]` adapter for an optional `MM-YYYY` field.
///
/// `null`, a missing field, and the empty string all decode to `None`.
pub mod serde_month_opt {
  use chrono::NaiveDate;
  use serde::{Deserialize, Deserializer, Serializer, de};

  pub fn serialize<S>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: Serializer,
  {
    match date {
      Some(d) => serializer.serialize_some(&super::format_month_year(*d)),
      None => serializer.serialize_none(),
    }
  }

  pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
  where
    D: Deserializer<'de>,
  {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw
      .filter(|s| !s.trim().is_empty())
      .map(|s| super::parse_month_year(&s))
      .transpose()
      .map_err(de::Error::custom)
  }
}
