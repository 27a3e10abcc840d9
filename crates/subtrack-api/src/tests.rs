//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use subtrack_core::{
  store::{SubscriptionFilter, SubscriptionStore},
  subscription::{NewSubscription, Subscription},
};
use subtrack_store_sqlite::SqliteStore;
use tokio::sync::RwLock;
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::router;

const ALICE: &str = "60601fee-2bf1-4721-ae6f-7636e79a0cba";
const BOB: &str = "0d1c2f5e-9a3b-4c7d-8e6f-112233445566";

// ─── In-memory fake store ────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("connection refused")]
struct Offline;

#[derive(Clone, Default)]
struct MemoryStore {
  rows:    Arc<RwLock<Vec<Subscription>>>,
  offline: bool,
}

impl MemoryStore {
  fn offline() -> Self { Self { offline: true, ..Default::default() } }

  fn check(&self) -> Result<(), Offline> {
    if self.offline { Err(Offline) } else { Ok(()) }
  }
}

impl SubscriptionStore for MemoryStore {
  type Error = Offline;

  async fn create(&self, input: NewSubscription) -> Result<Subscription, Offline> {
    self.check()?;
    let sub = input.into_subscription(Uuid::new_v4());
    self.rows.write().await.push(sub.clone());
    Ok(sub)
  }

  async fn get(&self, id: Uuid) -> Result<Option<Subscription>, Offline> {
    self.check()?;
    Ok(self.rows.read().await.iter().find(|s| s.id == id).cloned())
  }

  async fn update(
    &self,
    id: Uuid,
    changes: NewSubscription,
  ) -> Result<Option<Subscription>, Offline> {
    self.check()?;
    let mut rows = self.rows.write().await;
    let Some(slot) = rows.iter_mut().find(|s| s.id == id) else {
      return Ok(None);
    };
    *slot = slot.clone().apply(changes);
    Ok(Some(slot.clone()))
  }

  async fn delete(&self, id: Uuid) -> Result<bool, Offline> {
    self.check()?;
    let mut rows = self.rows.write().await;
    let before = rows.len();
    rows.retain(|s| s.id != id);
    Ok(rows.len() != before)
  }

  async fn list(&self, filter: &SubscriptionFilter) -> Result<Vec<Subscription>, Offline> {
    self.check()?;
    let mut subs: Vec<Subscription> = self
      .rows
      .read()
      .await
      .iter()
      .filter(|s| filter.matches(s))
      .cloned()
      .collect();
    subs.sort_by_key(|s| (s.start_date, s.created_at, s.id));
    Ok(subs)
  }

  async fn total_cost(&self, filter: &SubscriptionFilter) -> Result<i64, Offline> {
    self.check()?;
    Ok(
      self
        .rows
        .read()
        .await
        .iter()
        .filter(|s| filter.matches(s))
        .map(|s| s.price)
        .fold(0, i64::saturating_add),
    )
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn app() -> Router { router(Arc::new(MemoryStore::default())) }

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(json) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(json.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

fn payload(name: &str, price: i64, user: &str, start: &str) -> Value {
  json!({
    "service_name": name,
    "price": price,
    "user_id": user,
    "start_date": start,
  })
}

async fn create(app: &Router, body: Value) -> Value {
  let (status, created) = send(app, "POST", "/api/v1/subscriptions", Some(body)).await;
  assert_eq!(status, StatusCode::CREATED, "{created}");
  created
}

async fn seed(app: &Router) {
  create(app, payload("Netflix", 400, ALICE, "01-2024")).await;
  create(app, payload("Spotify", 200, ALICE, "03-2024")).await;
  create(app, payload("Netflix", 500, BOB, "02-2024")).await;
}

// ── Create / get ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_round_trips() {
  let app = app();
  let mut body = payload("Yandex Plus", 400, ALICE, "07-2025");
  body["end_date"] = json!("12-2025");

  let created = create(&app, body).await;
  assert_eq!(created["service_name"], "Yandex Plus");
  assert_eq!(created["price"], 400);
  assert_eq!(created["user_id"], ALICE);
  assert_eq!(created["start_date"], "07-2025");
  assert_eq!(created["end_date"], "12-2025");
  assert!(created["created_at"].is_string());

  let id = created["id"].as_str().unwrap();
  let (status, fetched) = send(&app, "GET", &format!("/api/v1/subscriptions/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_trims_input() {
  let app = app();
  let created = create(&app, payload("  Netflix  ", 400, &format!("  {ALICE}  "), "01-2024")).await;
  assert_eq!(created["service_name"], "Netflix");
  assert_eq!(created["user_id"], ALICE);
  assert!(created.get("end_date").is_none());
}

#[tokio::test]
async fn create_rejects_invalid_fields() {
  let app = app();
  let cases = [
    (payload("N", 400, ALICE, "01-2024"), "service name"),
    (payload("Netflix", 0, ALICE, "01-2024"), "price"),
    (payload("Netflix", 400, "not-a-uuid", "01-2024"), "user id"),
    (payload("Netflix", 400, ALICE, "2024-01"), "start_date"),
  ];
  for (body, needle) in cases {
    let (status, err) = send(&app, "POST", "/api/v1/subscriptions", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = err["error"].as_str().unwrap();
    assert!(message.contains(needle), "{message:?} should mention {needle:?}");
  }

  let mut inverted = payload("Netflix", 400, ALICE, "05-2024");
  inverted["end_date"] = json!("04-2024");
  let (status, _) = send(&app, "POST", "/api/v1/subscriptions", Some(inverted)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, all) = send(&app, "GET", "/api/v1/subscriptions", None).await;
  assert_eq!(all, json!([]));
}

#[tokio::test]
async fn create_rejects_malformed_json() {
  let app = app();
  let (status, err) =
    send(&app, "POST", "/api/v1/subscriptions", Some(json!({ "service_name": "Netflix" }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(err["error"].is_string());

  let req = Request::builder()
    .method("POST")
    .uri("/api/v1/subscriptions")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_unknown_returns_404() {
  let (status, err) =
    send(&app(), "GET", &format!("/api/v1/subscriptions/{}", Uuid::new_v4()), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(err["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn get_malformed_id_returns_400() {
  let (status, _) = send(&app(), "GET", "/api/v1/subscriptions/42", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Update ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_replaces_fields() {
  let app = app();
  let created = create(&app, payload("Netflix", 400, ALICE, "01-2024")).await;
  let id = created["id"].as_str().unwrap();

  let mut body = payload("Netflix Premium", 650, ALICE, "02-2024");
  body["end_date"] = json!("12-2024");
  let (status, updated) =
    send(&app, "PUT", &format!("/api/v1/subscriptions/{id}"), Some(body)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["id"], created["id"]);
  assert_eq!(updated["created_at"], created["created_at"]);
  assert_eq!(updated["service_name"], "Netflix Premium");
  assert_eq!(updated["price"], 650);
  assert_eq!(updated["end_date"], "12-2024");

  let (_, fetched) = send(&app, "GET", &format!("/api/v1/subscriptions/{id}"), None).await;
  assert_eq!(fetched, updated);
}

#[tokio::test]
async fn update_unknown_returns_404() {
  let (status, _) = send(
    &app(),
    "PUT",
    &format!("/api/v1/subscriptions/{}", Uuid::new_v4()),
    Some(payload("Netflix", 400, ALICE, "01-2024")),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_invalid_body_returns_400_and_keeps_row() {
  let app = app();
  let created = create(&app, payload("Netflix", 400, ALICE, "01-2024")).await;
  let id = created["id"].as_str().unwrap();

  let (status, _) = send(
    &app,
    "PUT",
    &format!("/api/v1/subscriptions/{id}"),
    Some(payload("Netflix", -5, ALICE, "01-2024")),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, fetched) = send(&app, "GET", &format!("/api/v1/subscriptions/{id}"), None).await;
  assert_eq!(fetched, created);
}

// ── Delete ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_returns_204_then_404() {
  let app = app();
  let created = create(&app, payload("Netflix", 400, ALICE, "01-2024")).await;
  let uri = format!("/api/v1/subscriptions/{}", created["id"].as_str().unwrap());

  let (status, body) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  assert_eq!(body, Value::Null);

  let (status, _) = send(&app, "GET", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── List ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_without_filters_returns_everything() {
  let app = app();
  seed(&app).await;
  let (status, all) = send(&app, "GET", "/api/v1/subscriptions", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn list_filters_by_user() {
  let app = app();
  seed(&app).await;
  let (status, found) =
    send(&app, "GET", &format!("/api/v1/subscriptions?user_id={BOB}"), None).await;
  assert_eq!(status, StatusCode::OK);
  let found = found.as_array().unwrap();
  assert_eq!(found.len(), 1);
  assert_eq!(found[0]["user_id"], BOB);
}

#[tokio::test]
async fn list_filters_by_start_range() {
  let app = app();
  seed(&app).await;
  let (_, found) = send(
    &app,
    "GET",
    "/api/v1/subscriptions?start_date_from=02-2024&start_date_to=03-2024",
    None,
  )
  .await;
  let names: Vec<_> = found
    .as_array()
    .unwrap()
    .iter()
    .map(|s| s["service_name"].as_str().unwrap().to_owned())
    .collect();
  assert_eq!(names, vec!["Netflix", "Spotify"]);
}

#[tokio::test]
async fn list_rejects_bad_date() {
  let (status, err) =
    send(&app(), "GET", "/api/v1/subscriptions?start_date_from=2024-01", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert_eq!(err["error"], "invalid start_date_from format, use MM-YYYY");
}

// ── Cost ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn total_cost_with_no_rows_is_zero() {
  let (status, body) = send(&app(), "GET", "/api/v1/subscriptions/cost", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "total_cost": 0 }));
}

#[tokio::test]
async fn total_cost_applies_filters() {
  let app = app();
  seed(&app).await;

  let (_, body) = send(&app, "GET", "/api/v1/subscriptions/cost", None).await;
  assert_eq!(body["total_cost"], 1100);

  let (_, body) = send(
    &app,
    "GET",
    &format!("/api/v1/subscriptions/cost?user_id={ALICE}&service_name=Netflix"),
    None,
  )
  .await;
  assert_eq!(body["total_cost"], 400);

  let (_, body) =
    send(&app, "GET", "/api/v1/subscriptions/cost?start_date_to=02-2024", None).await;
  assert_eq!(body["total_cost"], 900);

  let (_, body) = send(
    &app,
    "GET",
    &format!("/api/v1/subscriptions/cost?user_id=%20{ALICE}%20&service_name=%20Netflix"),
    None,
  )
  .await;
  assert_eq!(body["total_cost"], 400);

  let (status, _) =
    send(&app, "GET", "/api/v1/subscriptions/cost?start_date_to=feb", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn period_cost_counts_contained_months() {
  let app = app();
  let created = create(&app, payload("Netflix", 100, ALICE, "01-2024")).await;
  let uri = format!("/api/v1/subscriptions/{}/cost", created["id"].as_str().unwrap());

  let (status, body) = send(&app, "GET", &format!("{uri}?from=01-2024&to=04-2024"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "total_cost": 300 }));

  // Window starts before the subscription: not contained.
  let (_, body) = send(&app, "GET", &format!("{uri}?from=12-2023&to=04-2024"), None).await;
  assert_eq!(body["total_cost"], 0);

  let (status, _) = send(&app, "GET", &format!("{uri}?from=01-2024"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = send(
    &app,
    "GET",
    &format!("/api/v1/subscriptions/{}/cost?from=01-2024&to=04-2024", Uuid::new_v4()),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Store failures ───────────────────────────────────────────────────────────

#[tokio::test]
async fn store_failure_returns_500_without_details() {
  let app = router(Arc::new(MemoryStore::offline()));

  let (status, err) = send(&app, "GET", "/api/v1/subscriptions", None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(err, json!({ "error": "failed to list subscriptions" }));

  let (status, _) = send(
    &app,
    "POST",
    "/api/v1/subscriptions",
    Some(payload("Netflix", 400, ALICE, "01-2024")),
  )
  .await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

  let (status, _) = send(&app, "GET", "/api/v1/subscriptions/cost", None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn validation_runs_before_the_store() {
  let app = router(Arc::new(MemoryStore::offline()));
  let (status, _) = send(
    &app,
    "POST",
    "/api/v1/subscriptions",
    Some(payload("Netflix", 0, ALICE, "01-2024")),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── SQLite backend ───────────────────────────────────────────────────────────

#[tokio::test]
async fn sqlite_backed_crud_flow() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let app = router(Arc::new(store));

  let created = create(&app, payload("Yandex Plus", 400, ALICE, "07-2025")).await;
  let uri = format!("/api/v1/subscriptions/{}", created["id"].as_str().unwrap());

  let (status, fetched) = send(&app, "GET", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched, created);

  let (_, body) = send(&app, "GET", "/api/v1/subscriptions/cost", None).await;
  assert_eq!(body["total_cost"], 400);

  let (status, _) = send(&app, "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, body) = send(&app, "GET", "/api/v1/subscriptions/cost", None).await;
  assert_eq!(body["total_cost"], 0);
}
