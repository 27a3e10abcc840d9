//! Translate a [`SubscriptionFilter`] into parameterised SQL.
//!
//! Column names and operators are fixed here; only values come from the
//! caller, and those are always bound as positional parameters.

use rusqlite::types::Value;
use subtrack_core::store::SubscriptionFilter;

use crate::encode::{COLUMNS, encode_month};

/// A SQL statement together with the values for its `?N` placeholders.
#[derive(Debug, PartialEq)]
pub struct Statement {
  pub sql:    String,
  pub params: Vec<Value>,
}

/// Build ` WHERE a AND b ...` (with a leading space) for `filter`, or an empty
/// string when no field is set.
fn where_clause(filter: &SubscriptionFilter) -> (String, Vec<Value>) {
  if filter.is_empty() {
    return (String::new(), Vec::new());
  }

  let mut conds: Vec<String> = Vec::new();
  let mut params: Vec<Value> = Vec::new();

  let mut push = |predicate: &str, value: Value| {
    params.push(value);
    conds.push(format!("{predicate} ?{}", params.len()));
  };

  if let Some(name) = &filter.service_name {
    push("service_name =", Value::Text(name.clone()));
  }
  if let Some(user) = &filter.user_id {
    push("user_id =", Value::Text(user.clone()));
  }
  if let Some(from) = filter.start_date_from {
    push("start_date >=", Value::Text(encode_month(from)));
  }
  if let Some(to) = filter.start_date_to {
    push("start_date <=", Value::Text(encode_month(to)));
  }

  (format!(" WHERE {}", conds.join(" AND ")), params)
}

/// Row listing for [`SubscriptionStore::list`](subtrack_core::store::SubscriptionStore::list).
pub fn select(filter: &SubscriptionFilter) -> Statement {
  let (clause, params) = where_clause(filter);
  Statement {
    sql: format!(
      "SELECT {COLUMNS} FROM subscriptions{clause} ORDER BY start_date, created_at, id"
    ),
    params,
  }
}

/// Matching prices for
/// [`SubscriptionStore::total_cost`](subtrack_core::store::SubscriptionStore::total_cost).
///
/// The caller folds them with saturating addition; SQLite's `SUM` raises an
/// error on `i64` overflow instead.
pub fn prices(filter: &SubscriptionFilter) -> Statement {
  let (clause, params) = where_clause(filter);
  Statement { sql: format!("SELECT price FROM subscriptions{clause}"), params }
}
