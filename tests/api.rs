use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use idea_feed::{AppState, config::Config, create_app};
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "test-secret".to_string(),
        allowed_origins: vec!["http://localhost:5173".to_string()],
        comparables_url: None,
        comparables_timeout_ms: 500,
        session_ttl_hours: 24,
        session_sweep_secs: 60,
        seed_sample_ideas: false,
    }
}

fn test_state() -> AppState {
    AppState::new(test_config()).unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn sign_in(app: &Router, email: Option<&str>) -> String {
    let body = match email {
        Some(email) => json!({ "email": email }),
        None => json!({}),
    };
    let (status, body) = send(app, "POST", "/api/auth/sign-in", None, Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["token"].as_str().unwrap().to_string()
}

async fn post_idea(app: &Router, token: &str, text: &str) -> (StatusCode, Value) {
    send(app, "POST", "/api/ideas", Some(token), Some(json!({ "text": text }))).await
}

async fn vote(app: &Router, token: &str, idea_id: &str, direction: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        &format!("/api/ideas/{idea_id}/vote"),
        Some(token),
        Some(json!({ "direction": direction })),
    )
    .await
}

fn idea_ids(body: &Value) -> Vec<String> {
    body["ideas"]
        .as_array()
        .unwrap()
        .iter()
        .map(|idea| idea["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn sign_in_defaults_to_placeholder_identity() {
    let app = create_app(test_state());
    let token = sign_in(&app, None).await;

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"], "you@example.com");
    assert_eq!(body["votes_cast"], 0);
}

#[tokio::test]
async fn blank_email_signs_in_as_default_identity() {
    let app = create_app(test_state());
    let token = sign_in(&app, Some("   ")).await;

    let (_, body) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;

    assert_eq!(body["user"], "you@example.com");
}

#[tokio::test]
async fn sign_in_rejects_malformed_email() {
    let app = create_app(test_state());

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/sign-in",
        None,
        Some(json!({ "email": "not-an-email" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn posting_requires_sign_in() {
    let state = test_state();
    let app = create_app(state.clone());

    let (status, body) = send(
        &app,
        "POST",
        "/api/ideas",
        None,
        Some(json!({ "text": "An idea" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert!(state.feed.read().await.is_empty());
}

#[tokio::test]
async fn blank_idea_is_rejected_without_state_change() {
    let state = test_state();
    let app = create_app(state.clone());
    let token = sign_in(&app, None).await;

    let (status, _) = post_idea(&app, &token, "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_idea(&app, &token, &"x".repeat(141)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(state.feed.read().await.is_empty());
}

#[tokio::test]
async fn padded_idea_at_length_limit_is_accepted() {
    let state = test_state();
    let app = create_app(state.clone());
    let token = sign_in(&app, None).await;
    let text = "x".repeat(140);

    let (status, idea) = post_idea(&app, &token, &format!("  {text}  ")).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(idea["text"], text);
    assert_eq!(state.feed.read().await.len(), 1);
}

#[tokio::test]
async fn posted_idea_appears_in_feed_and_own_view() {
    let app = create_app(test_state());
    let token = sign_in(&app, None).await;

    let (status, idea) = post_idea(&app, &token, "  A to-do list for cats  ").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(idea["text"], "A to-do list for cats");
    assert_eq!(idea["score"], 0);
    assert_eq!(idea["is_own"], true);
    assert_eq!(
        idea["comparables"],
        json!(["Comparable apps search coming soon"])
    );

    let (_, feed) = send(&app, "GET", "/api/ideas", Some(&token), None).await;
    assert_eq!(feed["ideas"][0]["id"], idea["id"]);
    assert_eq!(feed["ideas"][0]["is_own"], true);
    assert_eq!(feed["time_filter"], "all");

    let (_, anonymous_feed) = send(&app, "GET", "/api/ideas", None, None).await;
    assert_eq!(anonymous_feed["ideas"][0]["is_own"], false);

    let (status, mine) = send(&app, "GET", "/api/ideas/mine", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(idea_ids(&mine), vec![idea["id"].as_str().unwrap()]);
}

#[tokio::test]
async fn own_view_lists_only_callers_ideas_newest_first() {
    let app = create_app(test_state());
    let me = sign_in(&app, None).await;
    let other = sign_in(&app, Some("other@example.com")).await;

    let (_, first) = post_idea(&app, &me, "First idea").await;
    let (_, theirs) = post_idea(&app, &other, "Their idea").await;
    let (_, second) = post_idea(&app, &me, "Second idea").await;

    // Give the older idea the higher score; the view must ignore it
    vote(&app, &other, first["id"].as_str().unwrap(), "up").await;

    let (_, mine) = send(&app, "GET", "/api/ideas/mine", Some(&me), None).await;
    let ids = idea_ids(&mine);

    assert_eq!(
        ids,
        vec![
            second["id"].as_str().unwrap().to_string(),
            first["id"].as_str().unwrap().to_string()
        ]
    );
    assert!(!ids.contains(&theirs["id"].as_str().unwrap().to_string()));
    assert_eq!(mine["pagination"]["total"], 2);

    let (status, _) = send(&app, "GET", "/api/ideas/mine", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn second_vote_is_a_silent_no_op() {
    let app = create_app(test_state());
    let token = sign_in(&app, None).await;
    let (_, idea) = post_idea(&app, &token, "One vote only").await;
    let id = idea["id"].as_str().unwrap();

    let (status, first) = vote(&app, &token, id, "up").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["recorded"], true);
    assert_eq!(first["upvotes"], 1);
    assert_eq!(first["score"], 1);

    let (status, second) = vote(&app, &token, id, "down").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["recorded"], false);
    assert_eq!(second["user_vote"], "up");
    assert_eq!(second["upvotes"], 1);
    assert_eq!(second["downvotes"], 0);

    let (_, fetched) = send(&app, "GET", &format!("/api/ideas/{id}"), Some(&token), None).await;
    assert_eq!(fetched["user_vote"], "up");
    assert_eq!(fetched["score"], 1);

    let (_, me) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(me["votes_cast"], 1);
}

#[tokio::test]
async fn voting_requires_sign_in_and_known_idea() {
    let app = create_app(test_state());
    let token = sign_in(&app, None).await;
    let (_, idea) = post_idea(&app, &token, "Vote on me").await;
    let id = idea["id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/ideas/{id}/vote"),
        None,
        Some(json!({ "direction": "up" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = vote(&app, &token, &uuid::Uuid::new_v4().to_string(), "up").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = vote(&app, &token, id, "sideways").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, fetched) = send(&app, "GET", &format!("/api/ideas/{id}"), None, None).await;
    assert_eq!(fetched["upvotes"], 0);
    assert_eq!(fetched["downvotes"], 0);
}

#[tokio::test]
async fn sign_out_discards_votes_and_token() {
    let app = create_app(test_state());
    let token = sign_in(&app, None).await;
    let (_, idea) = post_idea(&app, &token, "Vote twice across sessions").await;
    let id = idea["id"].as_str().unwrap();
    vote(&app, &token, id, "up").await;

    let (status, _) = send(&app, "POST", "/api/auth/sign-out", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let fresh = sign_in(&app, None).await;
    let (_, again) = vote(&app, &fresh, id, "up").await;
    assert_eq!(again["recorded"], true);
    assert_eq!(again["upvotes"], 2);

    // The idea still belongs to the same identity
    let (_, mine) = send(&app, "GET", "/api/ideas/mine", Some(&fresh), None).await;
    assert_eq!(idea_ids(&mine), vec![id.to_string()]);
}

#[tokio::test]
async fn time_filter_limits_feed_window() {
    let state = test_state();
    state
        .feed
        .write()
        .await
        .seed_samples(Utc::now() - Duration::hours(1));
    let app = create_app(state);

    let (status, all) = send(&app, "GET", "/api/ideas", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let scores: Vec<i64> = all["ideas"]
        .as_array()
        .unwrap()
        .iter()
        .map(|idea| idea["score"].as_i64().unwrap())
        .collect();
    assert_eq!(scores, vec![29, 21, 11]);

    let (_, today) = send(&app, "GET", "/api/ideas?time=today", None, None).await;
    assert!(today["ideas"].as_array().unwrap().is_empty());
    assert_eq!(today["time_filter"], "today");

    let (_, week) = send(&app, "GET", "/api/ideas?time=week", None, None).await;
    assert_eq!(week["ideas"].as_array().unwrap().len(), 3);

    let (status, _) = send(&app, "GET", "/api/ideas?time=year", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn feed_is_paginated_after_ordering() {
    let state = test_state();
    state.feed.write().await.seed_samples(Utc::now());
    let app = create_app(state);

    let (_, page) = send(&app, "GET", "/api/ideas?page=2&limit=2", None, None).await;

    assert_eq!(page["ideas"].as_array().unwrap().len(), 1);
    assert_eq!(page["ideas"][0]["score"], 11);
    assert_eq!(page["pagination"]["total"], 3);
    assert_eq!(page["pagination"]["pages"], 2);
}

#[tokio::test]
async fn fresh_popular_idea_is_trending() {
    let app = create_app(test_state());
    let author = sign_in(&app, None).await;
    let (_, idea) = post_idea(&app, &author, "Hot take").await;
    let id = idea["id"].as_str().unwrap();

    for n in 0..3 {
        let voter = sign_in(&app, Some(&format!("voter{n}@example.com"))).await;
        vote(&app, &voter, id, "up").await;
    }

    let (_, fetched) = send(&app, "GET", &format!("/api/ideas/{id}"), None, None).await;
    assert_eq!(fetched["score"], 3);
    assert_eq!(fetched["velocity"], 3.0);
    assert_eq!(fetched["is_trending"], true);
}

#[tokio::test]
async fn unknown_idea_is_not_found() {
    let app = create_app(test_state());

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/ideas/{}", uuid::Uuid::new_v4()),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Idea not found");
}

#[tokio::test]
async fn filters_endpoint_lists_windows() {
    let app = create_app(test_state());

    let (status, body) = send(&app, "GET", "/api/feed/filters", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["default"], "all");
    assert_eq!(
        body["filters"],
        json!([
            { "key": "today", "label": "Today" },
            { "key": "week", "label": "This Week" },
            { "key": "month", "label": "This Month" },
            { "key": "all", "label": "All Time" }
        ])
    );
}
