//! [`SqliteStore`]: the SQLite implementation of [`SubscriptionStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use subtrack_core::{
  store::{SubscriptionFilter, SubscriptionStore},
  subscription::{NewSubscription, Subscription},
};

use crate::{
  Result,
  encode::{COLUMNS, RawSubscription, decode_dt, encode_dt, encode_month, encode_uuid},
  query,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A subscription store backed by a single SQLite database.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open a store from a connection string.
  ///
  /// Accepts `:memory:`, `sqlite::memory:`, `sqlite://<path>`, `sqlite:<path>`
  /// or a bare file path.
  pub async fn connect(url: &str) -> Result<Self> {
    let target = url
      .strip_prefix("sqlite://")
      .or_else(|| url.strip_prefix("sqlite:"))
      .unwrap_or(url);

    if target == ":memory:" {
      Self::open_in_memory().await
    } else {
      Self::open(target).await
    }
  }

  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SubscriptionStore impl ──────────────────────────────────────────────────

impl SubscriptionStore for SqliteStore {
  type Error = crate::Error;

  async fn create(&self, input: NewSubscription) -> Result<Subscription> {
    let sub = input.into_subscription(Uuid::new_v4());

    let id_str      = encode_uuid(sub.id);
    let name        = sub.service_name.clone();
    let price       = sub.price;
    let user_id     = sub.user_id.clone();
    let start_str   = encode_month(sub.start_date);
    let end_str     = sub.end_date.map(encode_month);
    let created_str = encode_dt(sub.created_at);
    let updated_str = encode_dt(sub.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subscriptions (
             id, service_name, price, user_id,
             start_date, end_date, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            name,
            price,
            user_id,
            start_str,
            end_str,
            created_str,
            updated_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::info!(id = %sub.id, service = %sub.service_name, user = %sub.user_id, "created subscription");
    Ok(sub)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Subscription>> {
    let id_str = encode_uuid(id);
    tracing::debug!(%id, "fetching subscription");

    let raw: Option<RawSubscription> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {COLUMNS} FROM subscriptions WHERE id = ?1"),
              rusqlite::params![id_str],
              RawSubscription::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubscription::into_subscription).transpose()
  }

  async fn update(&self, id: Uuid, changes: NewSubscription) -> Result<Option<Subscription>> {
    let id_str      = encode_uuid(id);
    let name        = changes.service_name.clone();
    let price       = changes.price;
    let user_id     = changes.user_id.clone();
    let start_str   = encode_month(changes.start_date);
    let end_str     = changes.end_date.map(encode_month);
    let updated_str = encode_dt(changes.updated_at);

    // `created_at` is immutable; read it back in the same statement.
    let created: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "UPDATE subscriptions
                  SET service_name = ?1, price = ?2, user_id = ?3,
                      start_date = ?4, end_date = ?5, updated_at = ?6
                WHERE id = ?7
            RETURNING created_at",
              rusqlite::params![
                name,
                price,
                user_id,
                start_str,
                end_str,
                updated_str,
                id_str,
              ],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    let Some(created) = created else {
      tracing::warn!(%id, "no subscription to update");
      return Ok(None);
    };

    let mut sub = changes.into_subscription(id);
    sub.created_at = decode_dt(&created)?;
    tracing::info!(%id, "updated subscription");
    Ok(Some(sub))
  }

  async fn delete(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subscriptions WHERE id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if affected == 0 {
      tracing::warn!(%id, "no subscription to delete");
      return Ok(false);
    }
    tracing::info!(%id, "deleted subscription");
    Ok(true)
  }

  async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>> {
    let stmt = query::select(filter);
    tracing::debug!(sql = %stmt.sql, ?filter, "listing subscriptions");

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut prepared = conn.prepare(&stmt.sql)?;
        let rows = prepared
          .query_map(
            rusqlite::params_from_iter(stmt.params),
            RawSubscription::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let subs = raws
      .into_iter()
      .map(RawSubscription::into_subscription)
      .collect::<Result<Vec<_>>>()?;

    tracing::debug!(count = subs.len(), "listed subscriptions");
    Ok(subs)
  }

  async fn total_cost(&self, filter: &SubscriptionFilter) -> Result<i64> {
    let stmt = query::prices(filter);
    tracing::debug!(sql = %stmt.sql, ?filter, "summing subscription prices");

    let prices: Vec<i64> = self
      .conn
      .call(move |conn| {
        let mut prepared = conn.prepare(&stmt.sql)?;
        let rows = prepared
          .query_map(rusqlite::params_from_iter(stmt.params), |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let total = prices.into_iter().fold(0_i64, i64::saturating_add);
    tracing::info!(total, ?filter, "calculated total cost");
    Ok(total)
  }
}
