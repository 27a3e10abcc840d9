//! Handlers for `/subscriptions` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/subscriptions` | Body: [`SubscriptionBody`]; returns 201 + stored subscription |
//! | `GET`    | `/subscriptions` | Optional [`FilterParams`] |
//! | `GET`    | `/subscriptions/:id` | 404 if not found |
//! | `PUT`    | `/subscriptions/:id` | Body: [`SubscriptionBody`]; 404 if not found |
//! | `DELETE` | `/subscriptions/:id` | 204 on success, 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use subtrack_core::{
  month::parse_month_year,
  store::{SubscriptionFilter, SubscriptionStore},
  subscription::{NewSubscription, Subscription},
};
use uuid::Uuid;

use crate::error::ApiError;

/// Parse a `MM-YYYY` request field, naming the field in the error.
pub(crate) fn parse_month_field(field: &str, raw: &str) -> Result<NaiveDate, ApiError> {
  parse_month_year(raw)
    .map_err(|_| ApiError::BadRequest(format!("invalid {field} format, use MM-YYYY")))
}

// ─── Bodies and params ───────────────────────────────────────────────────────

/// JSON body accepted by `POST /subscriptions` and `PUT /subscriptions/:id`.
#[derive(Debug, Deserialize)]
pub struct SubscriptionBody {
  pub service_name: String,
  pub price:        i64,
  pub user_id:      String,
  /// `MM-YYYY`
  pub start_date:   String,
  /// `MM-YYYY`; absent, `null` or `""` means still running.
  #[serde(default)]
  pub end_date:     Option<String>,
}

impl TryFrom<SubscriptionBody> for NewSubscription {
  type Error = ApiError;

  fn try_from(b: SubscriptionBody) -> Result<Self, ApiError> {
    let start_date = parse_month_field("start_date", &b.start_date)?;
    let end_date = match b.end_date.as_deref().map(str::trim) {
      None | Some("") => None,
      Some(raw) => Some(parse_month_field("end_date", raw)?),
    };
    Ok(NewSubscription::new(
      &b.service_name,
      b.price,
      &b.user_id,
      start_date,
      end_date,
    )?)
  }
}

/// Query parameters shared by `GET /subscriptions` and `GET /subscriptions/cost`.
/// Values are trimmed like body fields; blank values are ignored.
#[derive(Debug, Deserialize, Default)]
pub struct FilterParams {
  pub user_id:         Option<String>,
  pub service_name:    Option<String>,
  /// `MM-YYYY`, inclusive.
  pub start_date_from: Option<String>,
  /// `MM-YYYY`, inclusive.
  pub start_date_to:   Option<String>,
}

impl TryFrom<FilterParams> for SubscriptionFilter {
  type Error = ApiError;

  fn try_from(p: FilterParams) -> Result<Self, ApiError> {
    let non_empty = |v: Option<String>| {
      v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
    };
    let month = |field: &str, v: Option<String>| {
      non_empty(v)
        .map(|raw| parse_month_field(field, &raw))
        .transpose()
    };

    Ok(SubscriptionFilter {
      start_date_from: month("start_date_from", p.start_date_from)?,
      start_date_to:   month("start_date_to", p.start_date_to)?,
      service_name:    non_empty(p.service_name),
      user_id:         non_empty(p.user_id),
    })
  }
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /subscriptions`: returns 201 + the stored [`Subscription`].
pub async fn create<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<SubscriptionBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubscriptionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Json(body) = body?;
  let input = NewSubscription::try_from(body)?;
  let sub = store
    .create(input)
    .await
    .map_err(ApiError::store("failed to create subscription"))?;
  Ok((StatusCode::CREATED, Json(sub)))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /subscriptions[?user_id=...][&service_name=...][&start_date_from=MM-YYYY][&start_date_to=MM-YYYY]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<Vec<Subscription>>, ApiError>
where
  S: SubscriptionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Query(params) = params?;
  let filter = SubscriptionFilter::try_from(params)?;
  let subs = store
    .list(&filter)
    .await
    .map_err(ApiError::store("failed to list subscriptions"))?;
  Ok(Json(subs))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /subscriptions/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Subscription>, ApiError>
where
  S: SubscriptionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Path(id) = id?;
  let sub = store
    .get(id)
    .await
    .map_err(ApiError::store("failed to get subscription"))?
    .ok_or_else(|| ApiError::NotFound(format!("subscription {id} not found")))?;
  Ok(Json(sub))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PUT /subscriptions/:id`: replaces every mutable field.
pub async fn update<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<Uuid>, PathRejection>,
  body: Result<Json<SubscriptionBody>, JsonRejection>,
) -> Result<Json<Subscription>, ApiError>
where
  S: SubscriptionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Path(id) = id?;
  let Json(body) = body?;
  let changes = NewSubscription::try_from(body)?;
  let sub = store
    .update(id, changes)
    .await
    .map_err(ApiError::store("failed to update subscription"))?
    .ok_or_else(|| ApiError::NotFound(format!("subscription {id} not found")))?;
  Ok(Json(sub))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /subscriptions/:id`: 204 with an empty body.
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
  S: SubscriptionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Path(id) = id?;
  let deleted = store
    .delete(id)
    .await
    .map_err(ApiError::store("failed to delete subscription"))?;
  if !deleted {
    return Err(ApiError::NotFound(format!("subscription {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}
