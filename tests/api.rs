//! End-to-end API tests against the full router and a scratch database.

use axum::http::StatusCode;
use axum_test::{TestServer, TestServerConfig};
use serde_json::{Value, json};
use tempfile::TempDir;

use ap_prep::db;
use ap_prep::handlers;
use ap_prep::srs::SchedulerPolicy;
use ap_prep::state::AppState;

fn make_server() -> (TempDir, TestServer) {
  let temp = TempDir::new().unwrap();
  let pool = db::init_db(&temp.path().join("api.db")).unwrap();
  {
    let conn = pool.lock().unwrap();
    db::catalog::seed_catalog(&conn).unwrap();
  }

  let app = handlers::router(AppState::new(pool, SchedulerPolicy::default()));
  let config = TestServerConfig { save_cookies: true, ..Default::default() };
  let server = TestServer::new_with_config(app, config).unwrap();
  (temp, server)
}

async fn register(server: &TestServer, username: &str) {
  let response = server
    .post("/api/register")
    .json(&json!({ "username": username, "password": "long enough password" }))
    .await;
  assert_eq!(response.status_code(), StatusCode::OK);
}

async fn create_deck_with_card(server: &TestServer) -> (i64, i64) {
  let deck: Value = server
    .post("/api/decks")
    .json(&json!({ "title": "Bio unit 1", "course_id": "ap-biology" }))
    .await
    .json();
  let deck_id = deck["id"].as_i64().unwrap();

  let card: Value = server
    .post(&format!("/api/decks/{deck_id}/cards"))
    .json(&json!({ "front": "Cohesion", "back": "Water molecules sticking together" }))
    .await
    .json();
  let card_id = card["id"].as_i64().unwrap();

  (deck_id, card_id)
}

#[tokio::test]
async fn unauthenticated_requests_are_rejected() {
  let (_temp, server) = make_server();

  for path in ["/api/review/due", "/api/decks", "/api/progress", "/api/courses"] {
    let response = server.get(path).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED, "path {path}");
  }
}

#[tokio::test]
async fn register_login_logout_flow() {
  let (_temp, server) = make_server();

  register(&server, "casey").await;

  // Session cookie from registration works immediately
  let response = server.get("/api/decks").await;
  assert_eq!(response.status_code(), StatusCode::OK);

  let response = server.post("/api/logout").await;
  assert_eq!(response.status_code(), StatusCode::OK);

  let response = server.get("/api/decks").await;
  assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

  let response = server
    .post("/api/login")
    .json(&json!({ "username": "casey", "password": "long enough password" }))
    .await;
  assert_eq!(response.status_code(), StatusCode::OK);

  let response = server.get("/api/decks").await;
  assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
  let (_temp, server) = make_server();

  register(&server, "casey").await;
  let response = server
    .post("/api/register")
    .json(&json!({ "username": "casey", "password": "another long password" }))
    .await;
  assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
  let (_temp, server) = make_server();

  register(&server, "casey").await;
  server.post("/api/logout").await;

  let response = server
    .post("/api/login")
    .json(&json!({ "username": "casey", "password": "not the password" }))
    .await;
  assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deck_and_review_round_trip() {
  let (_temp, server) = make_server();
  register(&server, "casey").await;

  let (deck_id, card_id) = create_deck_with_card(&server).await;

  // New card shows up in the due queue as never reviewed
  let due: Value = server.get("/api/review/due").await.json();
  let due_items = due.as_array().unwrap();
  assert_eq!(due_items.len(), 1);
  assert_eq!(due_items[0]["item_id"], format!("card:{card_id}"));
  assert_eq!(due_items[0]["repetitions"], 0);

  // First review with "good": fixed 3-day interval
  let response = server
    .post("/api/review")
    .json(&json!({ "item_id": format!("card:{card_id}"), "grade": "good" }))
    .await;
  assert_eq!(response.status_code(), StatusCode::OK);
  let state: Value = response.json();
  assert_eq!(state["repetitions"], 1);
  assert_eq!(state["interval_days"], 3.0);
  assert_eq!(state["revision"], 1);

  // No longer due
  let due: Value = server.get("/api/review/due").await.json();
  assert!(due.as_array().unwrap().is_empty());

  // The review shows up in stats as completed today
  let stats: Value = server.get("/api/review/stats").await.json();
  assert_eq!(stats["total_items"], 1);
  assert_eq!(stats["due_now"], 0);
  assert_eq!(stats["reviews_today"], 1);

  // And in the event history
  let history: Value = server.get("/api/review/history").await.json();
  let events = history.as_array().unwrap();
  assert_eq!(events.len(), 1);
  assert_eq!(events[0]["item_id"], format!("card:{card_id}"));
  assert_eq!(events[0]["grade"], "good");
  assert_eq!(events[0]["was_correct"], true);

  // Deck detail lists the card
  let detail: Value = server.get(&format!("/api/decks/{deck_id}")).await.json();
  assert_eq!(detail["cards"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn medium_is_accepted_as_good_alias() {
  let (_temp, server) = make_server();
  register(&server, "casey").await;
  let (_, card_id) = create_deck_with_card(&server).await;

  let state: Value = server
    .post("/api/review")
    .json(&json!({ "item_id": format!("card:{card_id}"), "grade": "medium" }))
    .await
    .json();
  assert_eq!(state["interval_days"], 3.0);
}

#[tokio::test]
async fn invalid_grade_is_rejected_without_side_effects() {
  let (_temp, server) = make_server();
  register(&server, "casey").await;
  let (_, card_id) = create_deck_with_card(&server).await;

  let response = server
    .post("/api/review")
    .json(&json!({ "item_id": format!("card:{card_id}"), "grade": "perfect" }))
    .await;
  assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
  let body: Value = response.json();
  assert!(body["error"].as_str().unwrap().contains("invalid review grade"));

  // Nothing was written: the card is still due with zero repetitions
  let due: Value = server.get("/api/review/due").await.json();
  assert_eq!(due.as_array().unwrap().len(), 1);
  assert_eq!(due[0]["repetitions"], 0);

  let stats: Value = server.get("/api/review/stats").await.json();
  assert_eq!(stats["reviews_today"], 0);
}

#[tokio::test]
async fn reviewing_a_foreign_card_is_not_found() {
  let (_temp, server) = make_server();

  register(&server, "owner").await;
  let (_, card_id) = create_deck_with_card(&server).await;

  // A different account must not be able to review (or even observe) it
  register(&server, "intruder").await;
  let response = server
    .post("/api/review")
    .json(&json!({ "item_id": format!("card:{card_id}"), "grade": "good" }))
    .await;
  assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

  let due: Value = server.get("/api/review/due").await.json();
  assert!(due.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn question_reviews_use_the_catalog() {
  let (_temp, server) = make_server();
  register(&server, "casey").await;

  let state: Value = server
    .post("/api/review")
    .json(&json!({
      "item_id": "question:ap-biology:unit-1:water:q1",
      "grade": "easy"
    }))
    .await
    .json();
  assert_eq!(state["repetitions"], 1);
  assert_eq!(state["interval_days"], 5.0);

  // A question that isn't in the catalog cannot accumulate state
  let response = server
    .post("/api/review")
    .json(&json!({
      "item_id": "question:ap-biology:unit-1:water:q99",
      "grade": "easy"
    }))
    .await;
  assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn catalog_and_practice_endpoints() {
  let (_temp, server) = make_server();
  register(&server, "casey").await;

  let courses: Value = server.get("/api/courses").await.json();
  assert_eq!(courses.as_array().unwrap().len(), 2);

  let outline: Value = server.get("/api/courses/ap-biology").await.json();
  assert_eq!(outline["id"], "ap-biology");
  assert_eq!(outline["units"].as_array().unwrap().len(), 2);
  assert_eq!(outline["question_count"], 6);

  let response = server.get("/api/courses/ap-chemistry").await;
  assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

  let practice: Value = server.get("/api/courses/ap-biology/practice?limit=3").await.json();
  let questions = practice.as_array().unwrap();
  assert_eq!(questions.len(), 3);
  for question in questions {
    assert_eq!(question["course_id"], "ap-biology");
    assert!(question["choices"].as_array().unwrap().len() >= 2);
  }
}

#[tokio::test]
async fn goals_track_review_events() {
  let (_temp, server) = make_server();
  register(&server, "casey").await;
  let (_, card_id) = create_deck_with_card(&server).await;

  let response = server
    .post("/api/goals")
    .json(&json!({ "title": "Daily pace", "kind": "daily_reviews", "target": 1 }))
    .await;
  assert_eq!(response.status_code(), StatusCode::OK);
  let goal: Value = response.json();
  let goal_id = goal["id"].as_i64().unwrap();

  let goals: Value = server.get("/api/goals").await.json();
  assert_eq!(goals[0]["completed"], 0);
  assert_eq!(goals[0]["achieved"], false);

  server
    .post("/api/review")
    .json(&json!({ "item_id": format!("card:{card_id}"), "grade": "good" }))
    .await;

  let goals: Value = server.get("/api/goals").await.json();
  assert_eq!(goals[0]["completed"], 1);
  assert_eq!(goals[0]["achieved"], true);

  let response = server.delete(&format!("/api/goals/{goal_id}")).await;
  assert_eq!(response.status_code(), StatusCode::OK);

  let response = server
    .post("/api/goals")
    .json(&json!({ "title": "Bad", "kind": "hourly_reviews", "target": 1 }))
    .await;
  assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn progress_summary_reflects_activity() {
  let (_temp, server) = make_server();
  register(&server, "casey").await;

  server
    .post("/api/review")
    .json(&json!({ "item_id": "question:ap-biology:unit-1:water:q1", "grade": "good" }))
    .await;
  server
    .post("/api/review")
    .json(&json!({ "item_id": "question:ap-biology:unit-1:water:q2", "grade": "again" }))
    .await;

  let summary: Value = server.get("/api/progress").await.json();
  assert_eq!(summary["reviews_today"], 2);
  assert_eq!(summary["attempts_7d"], 2);
  assert_eq!(summary["correct_7d"], 1);
  assert_eq!(summary["accuracy_7d"], 0.5);

  let courses = summary["courses"].as_array().unwrap();
  let biology = courses.iter().find(|c| c["course_id"] == "ap-biology").unwrap();
  assert_eq!(biology["items_tracked"], 2);
}

#[tokio::test]
async fn deck_deletion_empties_the_due_queue() {
  let (_temp, server) = make_server();
  register(&server, "casey").await;
  let (deck_id, _) = create_deck_with_card(&server).await;

  let due: Value = server.get("/api/review/due").await.json();
  assert_eq!(due.as_array().unwrap().len(), 1);

  let response = server.delete(&format!("/api/decks/{deck_id}")).await;
  assert_eq!(response.status_code(), StatusCode::OK);

  let due: Value = server.get("/api/review/due").await.json();
  assert!(due.as_array().unwrap().is_empty());

  let response = server.get(&format!("/api/decks/{deck_id}")).await;
  assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
