//! HTTP Integration Tests for the diary server
//!
//! Drives the full router with axum-test against in-memory SQLite.

mod common;

use axum::http::{
    header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE, SET_COOKIE},
    HeaderValue, StatusCode,
};
use axum_test::TestServer;
use common::*;
use diary::db::{self, DbPool};
use diary::models::Mood;
use serde_json::Value;

fn accept_json() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

async fn entry_count(pool: &DbPool) -> i64 {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM entries")
        .fetch_one(pool)
        .await
        .unwrap();
    count
}

async fn create_via_form(server: &TestServer, user: &SignedIn, body: &str, mood: &str, tags: &str) -> i64 {
    let response = server
        .post("/entries")
        .add_cookie(user.cookie())
        .form(&[
            ("csrf_token", user.csrf_token.as_str()),
            ("title", ""),
            ("body", body),
            ("mood", mood),
            ("weather", "sunny"),
            ("location", ""),
            ("tags", tags),
        ])
        .await;

    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    location(&response)
        .trim_start_matches("/entries/")
        .parse()
        .expect("Redirect should point at the new entry")
}

// ============================================================================
// Public pages
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (server, _pool) = build_test_app().await;

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_landing_page_and_login_form() {
    let (server, _pool) = build_test_app().await;

    let response = server.get("/").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("Your private diary"));

    let response = server.get("/login").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let csrf = response.cookie("diary_csrf");
    assert!(response.text().contains(csrf.value()));
}

// ============================================================================
// Session enforcement
// ============================================================================

#[tokio::test]
async fn test_entry_routes_require_session() {
    let (server, _pool) = build_test_app().await;

    for path in ["/entries", "/entries/new", "/entries/1", "/stats", "/export?format=json"] {
        let response = server.get(path).await;
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER, "{}", path);
        assert_eq!(location(&response), "/login", "{}", path);
    }

    let response = server.post("/entries").form(&[("body", "Sneaky anonymous entry")]).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_json_clients_get_401_instead_of_redirect() {
    let (server, _pool) = build_test_app().await;

    let response = server.get("/entries").add_header(ACCEPT, accept_json()).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_unknown_session_is_rejected() {
    let (server, _pool) = build_test_app().await;

    let response = server
        .get("/entries")
        .add_cookie(axum_extra::extract::cookie::Cookie::new("diary_session", "made-up"))
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_register_login_logout_flow() {
    let (server, pool) = build_test_app().await;

    let alice = register(&server, &pool, "alice").await;
    let response = server.get("/entries").add_cookie(alice.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("alice"));

    let again = login(&server, &pool, "alice", PASSWORD).await;
    assert_eq!(again.user_id, alice.user_id);
    assert_ne!(again.session_id, alice.session_id);

    let response = server
        .post("/logout")
        .add_cookie(alice.cookie())
        .form(&[("csrf_token", alice.csrf_token.as_str())])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");

    // The old session is gone, the other one still works.
    let response = server.get("/entries").add_cookie(alice.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    let response = server.get("/entries").add_cookie(again.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_bad_credentials_do_not_reveal_which_part_failed() {
    let (server, pool) = build_test_app().await;
    register(&server, &pool, "alice").await;

    let mut bodies = Vec::new();
    for (username, password) in [("alice", "Wrong1234"), ("mallory", PASSWORD)] {
        let csrf = anonymous_csrf(&server).await;
        let token = csrf.value().to_string();
        let response = server
            .post("/login")
            .add_cookie(csrf)
            .add_header(ACCEPT, accept_json())
            .form(&[
                ("csrf_token", token.as_str()),
                ("username", username),
                ("password", password),
            ])
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        bodies.push(response.json::<Value>());
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0]["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_without_csrf_cookie_is_forbidden() {
    let (server, pool) = build_test_app().await;
    register(&server, &pool, "alice").await;

    let response = server
        .post("/login")
        .form(&[
            ("csrf_token", "x".repeat(32).as_str()),
            ("username", "alice"),
            ("password", PASSWORD),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let sets_session = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .any(|v| v.to_str().unwrap_or_default().starts_with("diary_session="));
    assert!(!sets_session);
}

#[tokio::test]
async fn test_registration_rejects_weak_password() {
    let (server, pool) = build_test_app().await;

    let csrf = anonymous_csrf(&server).await;
    let token = csrf.value().to_string();
    let response = server
        .post("/register")
        .add_cookie(csrf)
        .form(&[
            ("csrf_token", token.as_str()),
            ("username", "alice"),
            ("password", "password"),
            ("confirm_password", "password"),
        ])
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("uppercase"));
    assert!(db::get_user_by_username(&pool, "alice").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let (server, pool) = build_test_app().await;
    register(&server, &pool, "alice").await;

    let csrf = anonymous_csrf(&server).await;
    let token = csrf.value().to_string();
    let response = server
        .post("/register")
        .add_cookie(csrf)
        .form(&[
            ("csrf_token", token.as_str()),
            ("username", "alice"),
            ("password", PASSWORD),
            ("confirm_password", PASSWORD),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_password_change_signs_out_other_sessions() {
    let (server, pool) = build_test_app().await;
    let first = register(&server, &pool, "alice").await;
    let second = login(&server, &pool, "alice", PASSWORD).await;

    let response = server
        .post("/account/password")
        .add_cookie(first.cookie())
        .form(&[
            ("csrf_token", first.csrf_token.as_str()),
            ("current_password", PASSWORD),
            ("new_password", "Changed456"),
            ("confirm_password", "Changed456"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("Password changed"));

    let response = server.get("/entries").add_cookie(second.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    let response = server.get("/entries").add_cookie(first.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    login(&server, &pool, "alice", "Changed456").await;
}

// ============================================================================
// CSRF on authenticated forms
// ============================================================================

#[tokio::test]
async fn test_mutations_without_valid_csrf_change_nothing() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;
    let id = insert_entry(&pool, alice.user_id, utc(2024, 1, 5), "Keep me exactly as I am", None, &[]).await;

    let response = server
        .post("/entries")
        .add_cookie(alice.cookie())
        .form(&[("body", "An entry without a token")])
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .post("/entries")
        .add_cookie(alice.cookie())
        .form(&[("csrf_token", "forged"), ("body", "An entry with a forged token")])
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .post(&format!("/entries/{}/delete", id))
        .add_cookie(alice.cookie())
        .form(&[("csrf_token", "forged")])
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .post(&format!("/entries/{}", id))
        .add_cookie(alice.cookie())
        .form(&[("csrf_token", ""), ("body", "Overwritten without a token")])
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    assert_eq!(entry_count(&pool).await, 1);
    let entry = db::get_entry(&pool, alice.user_id, id).await.unwrap();
    assert_eq!(entry.body, "Keep me exactly as I am");
}

#[tokio::test]
async fn test_csrf_token_of_another_session_is_rejected() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;
    let bob = register(&server, &pool, "bob").await;

    let response = server
        .post("/entries")
        .add_cookie(alice.cookie())
        .form(&[("csrf_token", bob.csrf_token.as_str()), ("body", "Cross-session token")])
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(entry_count(&pool).await, 0);
}

// ============================================================================
// Entries
// ============================================================================

#[tokio::test]
async fn test_entry_lifecycle() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;

    let id = create_via_form(&server, &alice, "Walked to the harbour at dawn", "peaceful", "walks, sea").await;

    let response = server
        .get(&format!("/entries/{}", id))
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let entry: Value = response.json();
    assert_eq!(entry["mood"], "peaceful");
    assert_eq!(entry["tags"], serde_json::json!(["sea", "walks"]));
    assert_eq!(entry["weather"], "sunny");
    assert_eq!(entry["location"], Value::Null);
    assert_eq!(entry["word_count"], 6);
    let created_at = entry["created_at"].clone();

    let response = server.get(&format!("/entries/{}/edit", id)).add_cookie(alice.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("Walked to the harbour at dawn"));

    let response = server
        .post(&format!("/entries/{}", id))
        .add_cookie(alice.cookie())
        .form(&[
            ("csrf_token", alice.csrf_token.as_str()),
            ("body", "Walked to the harbour at dawn and swam"),
            ("mood", "happy"),
            ("tags", "sea"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

    let updated = db::get_entry(&pool, alice.user_id, id).await.unwrap();
    assert_eq!(updated.word_count, 8);
    assert_eq!(updated.tags, vec!["sea"]);
    assert_eq!(updated.mood, Some(Mood::Happy));
    assert_eq!(serde_json::to_value(updated.created_at).unwrap(), created_at);

    let response = server
        .post(&format!("/entries/{}/favorite", id))
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .form(&[("csrf_token", alice.csrf_token.as_str())])
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<Value>()["is_favorite"], true);

    let response = server
        .post(&format!("/entries/{}/delete", id))
        .add_cookie(alice.cookie())
        .form(&[("csrf_token", alice.csrf_token.as_str())])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/entries");
    assert_eq!(entry_count(&pool).await, 0);
}

#[tokio::test]
async fn test_invalid_entry_rerenders_form() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;

    let response = server
        .post("/entries")
        .add_cookie(alice.cookie())
        .form(&[
            ("csrf_token", alice.csrf_token.as_str()),
            ("body", "short"),
            ("tags", "kept-tag"),
        ])
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let html = response.text();
    assert!(html.contains("at least 10 characters"));
    assert!(html.contains("kept-tag"));
    assert_eq!(entry_count(&pool).await, 0);
}

#[tokio::test]
async fn test_other_users_entry_is_not_found() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;
    let bob = register(&server, &pool, "bob").await;
    let id = insert_entry(&pool, alice.user_id, utc(2024, 1, 5), "Alice only, nobody else", None, &[]).await;

    let response = server.get(&format!("/entries/{}", id)).add_cookie(bob.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(!response.text().contains("Alice only"));

    let response = server
        .post(&format!("/entries/{}/delete", id))
        .add_cookie(bob.cookie())
        .form(&[("csrf_token", bob.csrf_token.as_str())])
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server
        .post(&format!("/entries/{}", id))
        .add_cookie(bob.cookie())
        .form(&[("csrf_token", bob.csrf_token.as_str()), ("body", "Bob was here all along")])
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    assert_eq!(
        db::get_entry(&pool, alice.user_id, id).await.unwrap().body,
        "Alice only, nobody else"
    );
}

// ============================================================================
// Search, stats and export
// ============================================================================

#[tokio::test]
async fn test_alice_scenario() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;
    let jan = insert_entry(&pool, alice.user_id, utc(2024, 1, 5), "Busy day at the office", Some(Mood::Happy), &["work"]).await;
    let feb = insert_entry(&pool, alice.user_id, utc(2024, 2, 10), "Train ride through hills", Some(Mood::Sad), &["travel"]).await;

    let response = server
        .get("/entries")
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    let all: Vec<Value> = response.json();
    let ids: Vec<i64> = all.iter().map(|e| e["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![feb, jan]);

    let response = server
        .get("/entries?mood=happy")
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    let happy: Vec<Value> = response.json();
    assert_eq!(happy.len(), 1);
    assert_eq!(happy[0]["id"], jan);

    let response = server
        .get("/entries?keyword=OFFICE&start=&end=&tag=")
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    let matched: Vec<Value> = response.json();
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0]["id"], jan);

    let response = server
        .get("/stats")
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let stats: Value = response.json();
    assert_eq!(stats["total_entries"], 2);
    assert_eq!(stats["entries_per_month"], serde_json::json!({"2024-01": 1, "2024-02": 1}));
    assert_eq!(stats["mood_counts"], serde_json::json!({"happy": 1, "sad": 1}));
    assert_eq!(stats["tag_counts"], serde_json::json!({"travel": 1, "work": 1}));
}

#[tokio::test]
async fn test_inverted_date_range_is_rejected() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;

    let response = server
        .get("/entries?start=2024-02-10&end=2024-01-05")
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");

    let response = server
        .get("/entries?start=2024-02-10&end=2024-01-05")
        .add_cookie(alice.cookie())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("after end date"));
}

#[tokio::test]
async fn test_empty_stats() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;

    let response = server
        .get("/stats")
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    let stats: Value = response.json();
    assert_eq!(stats["total_entries"], 0);
    assert_eq!(stats["mood_counts"], serde_json::json!({}));
    assert_eq!(stats["tag_counts"], serde_json::json!({}));
    assert_eq!(stats["entries_per_month"], serde_json::json!({}));

    let response = server.get("/stats").add_cookie(alice.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("No entries yet"));
}

#[tokio::test]
async fn test_json_export_matches_stats_total() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;
    let bob = register(&server, &pool, "bob").await;
    insert_entry(&pool, alice.user_id, utc(2024, 2, 10), "The later of the two", Some(Mood::Sad), &["b"]).await;
    insert_entry(&pool, alice.user_id, utc(2024, 1, 5), "The earlier of the two", None, &["a"]).await;
    insert_entry(&pool, bob.user_id, utc(2024, 1, 6), "Bob's entry stays out", None, &[]).await;

    let response = server.get("/export?format=json").add_cookie(alice.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let disposition = response.headers()[CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.starts_with("attachment; filename=diary_export_"));
    assert!(disposition.ends_with(".json"));

    let exported: Vec<Value> = serde_json::from_str(&response.text()).unwrap();
    let stats: Value = server
        .get("/stats")
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await
        .json();

    assert_eq!(exported.len() as i64, stats["total_entries"].as_i64().unwrap());
    assert_eq!(exported[0]["body"], "The earlier of the two");
    assert_eq!(exported[1]["body"], "The later of the two");
}

#[tokio::test]
async fn test_text_export() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;
    insert_entry(
        &pool,
        alice.user_id,
        utc(2024, 1, 5),
        "First text block\n\nwith a second paragraph",
        Some(Mood::Happy),
        &["work"],
    )
    .await;
    insert_entry(&pool, alice.user_id, utc(2024, 2, 10), "Second text block", None, &[]).await;

    let response = server.get("/export?format=TXT").add_cookie(alice.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.headers()[CONTENT_TYPE].to_str().unwrap().starts_with("text/plain"));

    let text = response.text();
    let blocks: Vec<&str> = text.split("\n\n").collect();
    assert_eq!(blocks.len(), 2);
    assert!(blocks[0].contains("Mood: happy"));
    assert!(blocks[0].contains("Tags: work"));
    assert!(blocks[0].ends_with("Body:\n  First text block\n  \n  with a second paragraph"));
    assert!(blocks[1].contains("Second text block"));
}

#[tokio::test]
async fn test_unsupported_export_format() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;
    insert_entry(&pool, alice.user_id, utc(2024, 1, 5), "Must not leak into output", None, &[]).await;

    let response = server.get("/export?format=xml").add_cookie(alice.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(CONTENT_DISPOSITION).is_none());
    assert!(!response.text().contains("Must not leak"));

    let response = server
        .get("/export?format=xml")
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    assert_eq!(response.json::<Value>()["error"]["code"], "UNSUPPORTED_FORMAT");
}

// ============================================================================
// Sessions
// ============================================================================

fn sets_session_cookie(response: &axum_test::TestResponse) -> bool {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .any(|v| v.to_str().map(|s| s.starts_with("diary_session=")).unwrap_or(false))
}

#[tokio::test]
async fn test_session_past_halfway_is_extended() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;

    // A fresh session is left alone.
    let response = server.get("/entries").add_cookie(alice.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(!sets_session_cookie(&response));

    // Ten minutes left of a one-hour lifetime.
    let nearly_expired = chrono::Utc::now() + chrono::Duration::minutes(10);
    db::extend_session(&pool, &alice.session_id, nearly_expired).await.unwrap();

    let response = server.get("/entries").add_cookie(alice.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(sets_session_cookie(&response));
    assert_eq!(response.cookie("diary_session").value(), alice.session_id);

    // The store update runs in the background.
    let threshold = chrono::Utc::now() + chrono::Duration::minutes(30);
    let mut extended = false;
    for _ in 0..100 {
        let session = db::get_session(&pool, &alice.session_id).await.unwrap().unwrap();
        if session.expires_at > threshold {
            extended = true;
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(extended, "expires_at was not moved forward");
}

// ============================================================================
// Search folding, categories and templates
// ============================================================================

#[tokio::test]
async fn test_keyword_search_ignores_non_ascii_case() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;
    create_via_form(&server, &alice, "Coffee with Lena in Zürich", "happy", "").await;
    let ecully = server
        .post("/entries")
        .add_cookie(alice.cookie())
        .form(&[
            ("csrf_token", alice.csrf_token.as_str()),
            ("body", "Market morning with friends"),
            ("location", "Écully"),
        ])
        .await;
    assert_eq!(ecully.status_code(), StatusCode::SEE_OTHER);

    for (keyword, expected_body) in [
        ("ZÜRICH", "Coffee with Lena in Zürich"),
        ("écully", "Market morning with friends"),
        ("ÉCULLY", "Market morning with friends"),
    ] {
        let response = server
            .get("/entries")
            .add_query_param("keyword", keyword)
            .add_cookie(alice.cookie())
            .add_header(ACCEPT, accept_json())
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let entries: Vec<Value> = response.json();
        assert_eq!(entries.len(), 1, "keyword {keyword}");
        assert_eq!(entries[0]["body"], expected_body);
    }
}

#[tokio::test]
async fn test_categories_flow_into_entries_stats_and_export() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;
    let bob = register(&server, &pool, "bob").await;

    let response = server
        .post("/categories")
        .add_cookie(alice.cookie())
        .form(&[
            ("csrf_token", alice.csrf_token.as_str()),
            ("name", "Travel"),
            ("color", "#22AA88"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/categories");

    // Duplicate names re-render the form with a conflict.
    let response = server
        .post("/categories")
        .add_cookie(alice.cookie())
        .form(&[("csrf_token", alice.csrf_token.as_str()), ("name", "Travel")])
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    assert!(response.text().contains("Category already exists"));

    let response = server
        .get("/categories")
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    let categories: Vec<Value> = response.json();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["color"], "#22aa88");
    let category_id = categories[0]["id"].as_i64().unwrap().to_string();

    let response = server
        .post("/entries")
        .add_cookie(alice.cookie())
        .form(&[
            ("csrf_token", alice.csrf_token.as_str()),
            ("body", "Night train across the border"),
            ("category_id", category_id.as_str()),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    create_via_form(&server, &alice, "Quiet evening at home", "", "").await;

    // Another user's category id is rejected.
    let response = server
        .post("/entries")
        .add_cookie(bob.cookie())
        .form(&[
            ("csrf_token", bob.csrf_token.as_str()),
            ("body", "Trying someone else's category"),
            ("category_id", category_id.as_str()),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = server
        .get("/entries")
        .add_query_param("category", &category_id)
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    let entries: Vec<Value> = response.json();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["category"], "Travel");

    let response = server
        .get("/stats")
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    assert_eq!(response.json::<Value>()["category_counts"]["Travel"], 1);

    let response = server.get("/export?format=txt").add_cookie(alice.cookie()).await;
    assert!(response.text().contains("Category: Travel"));

    let response = server
        .post(&format!("/categories/{}/delete", category_id))
        .add_cookie(bob.cookie())
        .form(&[("csrf_token", bob.csrf_token.as_str())])
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server
        .post(&format!("/categories/{}/delete", category_id))
        .add_cookie(alice.cookie())
        .form(&[("csrf_token", alice.csrf_token.as_str())])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(entry_count(&pool).await, 2);
}

#[tokio::test]
async fn test_templates_prefill_new_entries() {
    let (server, pool) = build_test_app().await;
    let alice = register(&server, &pool, "alice").await;

    let response = server
        .post("/templates")
        .add_cookie(alice.cookie())
        .form(&[
            ("csrf_token", alice.csrf_token.as_str()),
            ("name", "Gratitude"),
            ("body", "Three things I am grateful for"),
            ("mood", "grateful"),
            ("tags", "gratitude"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/templates");

    let response = server
        .get("/templates")
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    let templates: Vec<Value> = response.json();
    assert_eq!(templates.len(), 1);
    let id = templates[0]["id"].as_i64().unwrap();

    let response = server.get(&format!("/templates/{}/use", id)).add_cookie(alice.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let html = response.text();
    assert!(html.contains("Three things I am grateful for"));
    assert!(html.contains(r#"<option value="grateful" selected>"#));

    // Not the default, so the blank form stays blank.
    let response = server.get("/entries/new").add_cookie(alice.cookie()).await;
    assert!(!response.text().contains("Three things I am grateful for"));

    let response = server
        .post("/templates")
        .add_cookie(alice.cookie())
        .form(&[
            ("csrf_token", alice.csrf_token.as_str()),
            ("name", "Morning pages"),
            ("body", "Before coffee I noticed"),
            ("is_default", "on"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);

    let response = server.get("/entries/new").add_cookie(alice.cookie()).await;
    assert!(response.text().contains("Before coffee I noticed"));

    // Missing content re-renders the template form.
    let response = server
        .post("/templates")
        .add_cookie(alice.cookie())
        .form(&[("csrf_token", alice.csrf_token.as_str()), ("name", "Empty")])
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("Template name and content are required"));

    let bob = register(&server, &pool, "bob").await;
    let response = server.get(&format!("/templates/{}/use", id)).add_cookie(bob.cookie()).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server
        .post(&format!("/templates/{}/delete", id))
        .add_cookie(alice.cookie())
        .form(&[("csrf_token", alice.csrf_token.as_str())])
        .await;
    assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
    let response = server
        .get("/templates")
        .add_cookie(alice.cookie())
        .add_header(ACCEPT, accept_json())
        .await;
    assert_eq!(response.json::<Value>().as_array().unwrap().len(), 1);
}
