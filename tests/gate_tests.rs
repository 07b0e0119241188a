mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use common::{JAKARTA, spawn_app};
use tripwise_backend::{auth::TokenService, models::Role, repository::Repository};

#[tokio::test]
async fn public_routes_need_no_token() {
    let app = spawn_app();
    app.seed_city("Jakarta", Some(JAKARTA)).await;

    let (status, body) = app.get("/city", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["status"], "success");
    assert_eq!(body["data"][0]["name"], "Jakarta");

    let (status, _) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_route_without_token_is_unauthorized() {
    let app = spawn_app();

    let (status, body) = app.get("/dashboard/count-data", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["meta"]["message"], "Unauthorized Access");
    assert_eq!(body["meta"]["code"], 401);
    assert_eq!(body["meta"]["status"], "error");
}

#[tokio::test]
async fn user_role_on_admin_route_is_forbidden() {
    let app = spawn_app();
    let (_, token) = app.seed_user("regular", Role::User).await;

    let (status, body) = app.get("/dashboard/count-data", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["meta"]["message"], "Access forbidden: insufficient role");
}

#[tokio::test]
async fn admin_role_passes_admin_gate() {
    let app = spawn_app();
    let (_, token) = app.seed_user("boss", Role::Admin).await;

    let (status, body) = app.get("/dashboard/count-data", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"], 1);
}

#[tokio::test]
async fn rejected_request_never_reaches_the_handler() {
    let app = spawn_app();
    let (_, token) = app.seed_user("regular", Role::User).await;
    let city = app.seed_city("Jakarta", Some(JAKARTA)).await;
    let destination = app.seed_destination(&city, "Monas", "Culture").await;

    let uri = format!("/destination/{}", destination.id);
    let (status, _) = app.delete(&uri, Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.delete(&uri, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(app.repo.get_destination(destination.id).await.unwrap().is_some());
}

#[tokio::test]
async fn header_without_bearer_prefix_is_unauthorized() {
    let app = spawn_app();
    let (_, token) = app.seed_user("regular", Role::User).await;

    let request = Request::builder()
        .uri("/me")
        .header(header::AUTHORIZATION, token)
        .body(Body::empty())
        .unwrap();

    let (status, _) = app.send_request(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let app = spawn_app();
    let (user, _) = app.seed_user("sleepy", Role::Admin).await;
    let expired = app
        .tokens
        .issue_with_ttl(user.id, &user.username, user.role, Duration::seconds(-1))
        .unwrap();

    let (status, _) = app.get("/me", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Expiry is checked before the role, so even an admin token gets 401 here.
    let (status, _) = app.get("/dashboard/graphic", Some(&expired)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_unauthorized() {
    let app = spawn_app();
    let (user, _) = app.seed_user("mallory", Role::Admin).await;
    let forged = TokenService::new("some-other-secret", Duration::hours(1))
        .unwrap()
        .issue(user.id, &user.username, Role::Admin)
        .unwrap();

    let (status, _) = app.get("/user", Some(&forged)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn planner_routes_admit_both_roles() {
    let app = spawn_app();
    let (_, user_token) = app.seed_user("traveller", Role::User).await;
    let (_, admin_token) = app.seed_user("boss", Role::Admin).await;

    for token in [&user_token, &admin_token] {
        let (status, body) = app.get("/route", Some(token)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    let (status, _) = app.get("/route", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn authenticated_routes_accept_any_role() {
    let app = spawn_app();
    let (user, token) = app.seed_user("regular", Role::User).await;

    let (status, body) = app.get("/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user.id.to_string());
    assert_eq!(body["data"]["role"], "user");
    assert!(body["data"].get("password_hash").is_none());
}
