//! HTTP-level integration tests for the `/users` CRUD endpoints.
//!
//! Uses Axum's tower::ServiceExt to send requests directly to the router
//! without an actual TCP listener. Every request here rides a real session
//! cookie obtained through `/user/log-in`, so the suite also covers the
//! interplay between user mutations and session freshness.

mod common;

use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use sqlx::PgPool;

use common::{
    body_json, delete_with_cookie, get_with_cookie, post_json, post_json_with_cookie,
    put_json_with_cookie, session_cookie, session_cookie_cleared,
};
use stanchion_api::auth::password::hash_password;
use stanchion_db::models::user::CreateUser;
use stanchion_db::repositories::UserRepo;

/// Insert an operator account straight into the database and log in over
/// HTTP, returning its id and the session cookie the suite rides on.
async fn sign_in_operator(app: &Router, pool: &PgPool) -> (i64, String) {
    let create = CreateUser {
        username: "operator".to_string(),
        password_hash: hash_password("operator-pw").expect("hashing should succeed"),
        first_name: None,
        last_name: None,
    };
    let operator = UserRepo::create(pool, &create)
        .await
        .expect("operator insert should succeed");

    let response = post_json(
        app.clone(),
        "/user/log-in",
        json!({ "username": "operator", "password": "operator-pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response).expect("login issues a session cookie");
    (operator.id, cookie)
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_user_returns_201(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, cookie) = sign_in_operator(&app, &pool).await;

    let response = post_json_with_cookie(
        app,
        "/users",
        json!({ "username": "peter", "password": "peter-pw", "first_name": "Peter" }),
        &cookie,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert!(json["id"].is_number());
    assert_eq!(json["username"], "peter");
    assert_eq!(json["first_name"], "Peter");
    assert_eq!(json["last_name"], serde_json::Value::Null);
    // New rows carry no update stamp until the first mutation.
    assert_eq!(json["updated_at"], serde_json::Value::Null);
    // The hash must never leave the server.
    assert!(json.get("password_hash").is_none());
    assert!(json.get("password").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_user_validates_fields(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, cookie) = sign_in_operator(&app, &pool).await;

    let response = post_json_with_cookie(
        app,
        "/users",
        json!({ "username": "", "password": "" }),
        &cookie,
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["errors"]["username"][0], "must be 1 to 255 characters");
    assert_eq!(json["errors"]["password"][0], "must be 1 to 255 characters");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_duplicate_username_is_field_attributed(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, cookie) = sign_in_operator(&app, &pool).await;

    let body = json!({ "username": "peter", "password": "peter-pw" });
    let first = post_json_with_cookie(app.clone(), "/users", body.clone(), &cookie).await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_json_with_cookie(app, "/users", body, &cookie).await;
    assert_eq!(second.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(second).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["errors"]["username"][0], "is already taken");
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_user_by_id(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, cookie) = sign_in_operator(&app, &pool).await;

    let created = post_json_with_cookie(
        app.clone(),
        "/users",
        json!({ "username": "peter", "password": "peter-pw" }),
        &cookie,
    )
    .await;
    let id = body_json(created).await["id"].as_i64().unwrap();

    let response = get_with_cookie(app, &format!("/users/{id}"), &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], id);
    assert_eq!(json["username"], "peter");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_get_nonexistent_user_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, cookie) = sign_in_operator(&app, &pool).await;

    let response = get_with_cookie(app, "/users/999999", &cookie).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_user_stamps_row(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, cookie) = sign_in_operator(&app, &pool).await;

    let created = post_json_with_cookie(
        app.clone(),
        "/users",
        json!({ "username": "peter", "password": "peter-pw" }),
        &cookie,
    )
    .await;
    let id = body_json(created).await["id"].as_i64().unwrap();

    let response = put_json_with_cookie(
        app,
        &format!("/users/{id}"),
        json!({ "first_name": "Peter" }),
        &cookie,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["first_name"], "Peter");
    // Absent fields stay untouched; the stamp always advances.
    assert_eq!(json["username"], "peter");
    assert!(json["updated_at"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_rejects_taken_username_but_allows_own(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, cookie) = sign_in_operator(&app, &pool).await;

    for name in ["alice", "bob"] {
        let response = post_json_with_cookie(
            app.clone(),
            "/users",
            json!({ "username": name, "password": "pw-12345" }),
            &cookie,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    let bob = UserRepo::find_by_username(&pool, "bob")
        .await
        .expect("lookup should succeed")
        .expect("bob exists");

    let stolen = put_json_with_cookie(
        app.clone(),
        &format!("/users/{}", bob.id),
        json!({ "username": "alice" }),
        &cookie,
    )
    .await;
    assert_eq!(stolen.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(stolen).await;
    assert_eq!(json["errors"]["username"][0], "is already taken");

    // Re-submitting your current username is not a conflict.
    let unchanged = put_json_with_cookie(
        app,
        &format!("/users/{}", bob.id),
        json!({ "username": "bob" }),
        &cookie,
    )
    .await;
    assert_eq!(unchanged.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_update_nonexistent_user_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, cookie) = sign_in_operator(&app, &pool).await;

    let response = put_json_with_cookie(
        app,
        "/users/999999",
        json!({ "first_name": "Ghost" }),
        &cookie,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_user_returns_204_then_404(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, cookie) = sign_in_operator(&app, &pool).await;

    let created = post_json_with_cookie(
        app.clone(),
        "/users",
        json!({ "username": "peter", "password": "peter-pw" }),
        &cookie,
    )
    .await;
    let id = body_json(created).await["id"].as_i64().unwrap();

    let response = delete_with_cookie(app.clone(), &format!("/users/{id}"), &cookie).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let again = delete_with_cookie(app.clone(), &format!("/users/{id}"), &cookie).await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);

    let gone = get_with_cookie(app, &format!("/users/{id}"), &cookie).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_users_pages_and_sorts(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, cookie) = sign_in_operator(&app, &pool).await;

    for name in ["alice", "bob", "carol"] {
        let response = post_json_with_cookie(
            app.clone(),
            "/users",
            json!({ "username": name, "password": "pw-12345" }),
            &cookie,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    // Operator + three created rows = four users total.
    let first = get_with_cookie(
        app.clone(),
        "/users?sort=username&order=asc&limit=2",
        &cookie,
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    let json = body_json(first).await;
    assert_eq!(json["total"], 4);
    assert_eq!(json["rows"][0]["username"], "alice");
    assert_eq!(json["rows"][1]["username"], "bob");
    assert_eq!(json["rows"].as_array().unwrap().len(), 2);

    let second = get_with_cookie(
        app.clone(),
        "/users?sort=username&order=asc&limit=2&offset=2",
        &cookie,
    )
    .await;
    let json = body_json(second).await;
    assert_eq!(json["rows"][0]["username"], "carol");
    assert_eq!(json["rows"][1]["username"], "operator");

    let reversed = get_with_cookie(app, "/users?sort=username&order=desc&limit=1", &cookie).await;
    let json = body_json(reversed).await;
    assert_eq!(json["rows"][0]["username"], "operator");
    assert_eq!(json["total"], 4);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_users_clamps_degenerate_paging(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, cookie) = sign_in_operator(&app, &pool).await;

    // limit=0 clamps to one row, offset=-5 clamps to the start.
    let response = get_with_cookie(app, "/users?limit=0&offset=-5", &cookie).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["rows"].as_array().unwrap().len(), 1);
    assert_eq!(json["total"], 1);
}

// ---------------------------------------------------------------------------
// Mutations feeding back into session freshness
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_self_update_triggers_session_renewal(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (operator_id, cookie) = sign_in_operator(&app, &pool).await;

    // Updating your own row stamps it past the token's issuance instant.
    let update = put_json_with_cookie(
        app.clone(),
        &format!("/users/{operator_id}"),
        json!({ "first_name": "Op" }),
        &cookie,
    )
    .await;
    assert_eq!(update.status(), StatusCode::OK);
    // Validation happened before the write, so nothing was replaced yet.
    assert!(session_cookie(&update).is_none());

    // The next request finds the token stale and rides out a replacement.
    let renewed = get_with_cookie(app.clone(), "/users", &cookie).await;
    assert_eq!(renewed.status(), StatusCode::OK);
    let replacement = session_cookie(&renewed).expect("replacement cookie issued");
    assert_ne!(replacement, cookie);

    // The replacement validates cleanly.
    let clean = get_with_cookie(app, "/users", &replacement).await;
    assert_eq!(clean.status(), StatusCode::OK);
    assert!(session_cookie(&clean).is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_self_delete_invalidates_session(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (operator_id, cookie) = sign_in_operator(&app, &pool).await;

    let response = delete_with_cookie(app.clone(), &format!("/users/{operator_id}"), &cookie).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The session now references a row that no longer exists.
    let after = get_with_cookie(app, "/users", &cookie).await;
    assert_eq!(after.status(), StatusCode::SEE_OTHER);
    assert_eq!(after.headers()[LOCATION], "/user/log-in");
    assert!(session_cookie_cleared(&after));
}
