
use reqwest::StatusCode;
use serde_json::{json, Value};
use test_utils::*;

#[actix_rt::test]
async fn home_and_liveness_are_public() {
    let app = TestApp::spawn().await;

    let home = app.client.get(app.url("/")).send().await.unwrap();
    assert_eq!(home.status(), StatusCode::OK);

    let health: Value = app.client.get(app.url("/health")).send().await.unwrap().json().await.unwrap();
    assert_eq!(health["status"], "ok");
}

#[actix_rt::test]
async fn admin_routes_redirect_anonymous_callers_to_login() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.url("/api/v1/admin/dashboard")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["redirect"], "/admin");
}

#[actix_rt::test]
async fn admin_routes_use_the_configured_login_path() {
    let app = TestApp::spawn_with(|config| config.login_path = "/owner/sign-in".into()).await;

    let body: Value = app
        .client
        .get(app.url("/api/v1/admin/posts"))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["redirect"], "/owner/sign-in");
}

#[actix_rt::test]
async fn visitor_sessions_are_forbidden_from_admin_routes() {
    let app = TestApp::spawn().await;
    let token = app.visitor_token().await;

    let response = app
        .client
        .get(app.url("/api/v1/admin/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn admin_sees_dashboard_until_signing_out() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let dashboard = app
        .client
        .get(app.url("/api/v1/admin/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(dashboard.status(), StatusCode::OK);
    let body: Value = dashboard.json().await.unwrap();
    assert_eq!(body["posts"]["total"], 0);

    let logout = app
        .client
        .post(app.url("/api/v1/auth/logout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::OK);

    let after = app
        .client
        .get(app.url("/api/v1/admin/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(after.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn repeated_failed_logins_are_throttled() {
    let app = TestApp::spawn().await;

    for _ in 0..3 {
        let response = app.login(ADMIN_EMAIL, "wrong-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let throttled = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(throttled.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[actix_rt::test]
async fn session_endpoint_reports_state() {
    let app = TestApp::spawn().await;

    let anonymous: Value = app
        .client
        .get(app.url("/api/v1/auth/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(anonymous["status"], "unauthenticated");
    assert_eq!(anonymous["redirect"], "/admin");

    let token = app.visitor_token().await;
    let visitor: Value = app
        .client
        .get(app.url("/api/v1/auth/session"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(visitor["status"], "authenticated");
    assert_eq!(visitor["user"]["uid"], "visitor-1");
}

#[actix_rt::test]
async fn published_posts_are_listed_and_rendered() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let created = app
        .create_post(
            &token,
            json!({
                "title": "Shipping a Rust API",
                "excerpt": "Notes from the build",
                "content": "# Hello\n\n<script>alert(1)</script>Plain text.",
                "category": "Development"
            }),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created: Value = created.json().await.unwrap();
    assert_eq!(created["slug"], "shipping-a-rust-api");

    let list: Vec<Value> = app.client.get(app.url("/api/v1/posts")).send().await.unwrap().json().await.unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["readTime"], "1 min read");

    let id = created["id"].as_str().unwrap();
    let detail: Value = app
        .client
        .get(app.url(&format!("/api/v1/posts/{}", id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let html = detail["contentHtml"].as_str().unwrap();
    assert!(html.contains("<h1>Hello</h1>"));
    assert!(!html.contains("<script>"));
}

#[actix_rt::test]
async fn missing_post_points_back_to_the_blog() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.url("/api/v1/posts/does-not-exist")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["redirect"], "/blog");
}

#[actix_rt::test]
async fn invalid_post_is_rejected_with_field_errors() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    let response = app
        .create_post(&token, json!({ "title": "Broken", "content": "", "image": "ftp://nope" }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_rt::test]
async fn featured_projects_respect_selection_and_limit() {
    let app = TestApp::spawn().await;
    let token = app.admin_token().await;

    for i in 0..4 {
        let response = app
            .create_project(
                &token,
                json!({ "title": format!("Selected {}", i), "tags": "Rust, Actix", "selectedWork": true }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    app.create_project(&token, json!({ "title": "Side quest", "tags": ["Go"] })).await;

    let default: Vec<Value> = app
        .client
        .get(app.url("/api/v1/projects/featured"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(default.len(), 3);
    assert!(default.iter().all(|p| p["selectedWork"] == true));

    let limited: Vec<Value> = app
        .client
        .get(app.url("/api/v1/projects/featured?limit=1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(limited.len(), 1);

    let all: Vec<Value> = app.client.get(app.url("/api/v1/projects")).send().await.unwrap().json().await.unwrap();
    assert_eq!(all.len(), 5);
}

#[actix_rt::test]
async fn contact_form_is_relayed() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/v1/contact"))
        .json(&json!({
            "name": "Grace",
            "email": "grace@example.com",
            "subject": "Hello",
            "message": "Loved the portfolio!"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.relay.sent.lock().len(), 1);
}

#[actix_rt::test]
async fn contact_without_relay_config_makes_no_call() {
    let app = TestApp::spawn_with(|config| config.relay_public_key = None).await;

    let response = app
        .client
        .post(app.url("/api/v1/contact"))
        .json(&json!({
            "name": "Grace",
            "email": "grace@example.com",
            "subject": "Hello",
            "message": "Loved the portfolio!"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Email service is not configured. Please contact via social links.");
    assert!(app.relay.sent.lock().is_empty());
}

#[actix_rt::test]
async fn contact_form_needs_a_subject() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/api/v1/contact"))
        .json(&json!({
            "name": "Jo",
            "email": "jo@example.com",
            "subject": "",
            "message": "Hello there"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.relay.sent.lock().is_empty());
}

#[actix_rt::test]
async fn guestbook_requires_a_session_to_sign() {
    let app = TestApp::spawn().await;

    let anonymous = app
        .client
        .post(app.url("/api/v1/guestbook"))
        .json(&json!({ "message": "Hi!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let token = app.visitor_token().await;
    let signed = app
        .client
        .post(app.url("/api/v1/guestbook"))
        .bearer_auth(&token)
        .json(&json!({ "message": "  Great work!  ", "emoji": "rocket" }))
        .send()
        .await
        .unwrap();
    assert_eq!(signed.status(), StatusCode::CREATED);

    let entries: Vec<Value> = app.client.get(app.url("/api/v1/guestbook")).send().await.unwrap().json().await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "Ada Lovelace");
    assert_eq!(entries[0]["message"], "Great work!");
    assert_eq!(entries[0]["photoURL"], "https://example.com/ada.png");
}
