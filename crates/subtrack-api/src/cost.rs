//! Handlers for cost endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/subscriptions/cost` | Sum of prices over [`FilterParams`](crate::subscriptions::FilterParams) matches |
//! | `GET`  | `/subscriptions/:id/cost` | `?from=MM-YYYY&to=MM-YYYY`; whole months billed inside the window |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{PathRejection, QueryRejection},
  },
};
use serde::{Deserialize, Serialize};
use subtrack_core::store::{SubscriptionFilter, SubscriptionStore};
use uuid::Uuid;

use crate::{
  error::ApiError,
  subscriptions::{FilterParams, parse_month_field},
};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CostResponse {
  pub total_cost: i64,
}

/// `GET /subscriptions/cost`: same query parameters as `GET /subscriptions`.
pub async fn total<S>(
  State(store): State<Arc<S>>,
  params: Result<Query<FilterParams>, QueryRejection>,
) -> Result<Json<CostResponse>, ApiError>
where
  S: SubscriptionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Query(params) = params?;
  let filter = SubscriptionFilter::try_from(params)?;
  let total_cost = store
    .total_cost(&filter)
    .await
    .map_err(ApiError::store("failed to calculate monthly cost"))?;
  Ok(Json(CostResponse { total_cost }))
}

#[derive(Debug, Deserialize)]
pub struct PeriodParams {
  pub from: Option<String>,
  pub to:   Option<String>,
}

/// `GET /subscriptions/:id/cost?from=MM-YYYY&to=MM-YYYY`
///
/// Zero when the window is not fully inside the subscription's span.
pub async fn for_period<S>(
  State(store): State<Arc<S>>,
  id: Result<Path<Uuid>, PathRejection>,
  params: Result<Query<PeriodParams>, QueryRejection>,
) -> Result<Json<CostResponse>, ApiError>
where
  S: SubscriptionStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let Path(id) = id?;
  let Query(params) = params?;
  let (Some(from), Some(to)) = (params.from, params.to) else {
    return Err(ApiError::BadRequest(
      "from and to are required, use MM-YYYY".to_owned(),
    ));
  };
  let from = parse_month_field("from", &from)?;
  let to = parse_month_field("to", &to)?;

  let sub = store
    .get(id)
    .await
    .map_err(ApiError::store("failed to get subscription"))?
    .ok_or_else(|| ApiError::NotFound(format!("subscription {id} not found")))?;

  Ok(Json(CostResponse { total_cost: sub.cost_for_period(from, to) }))
}
