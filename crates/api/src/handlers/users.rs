//! Handlers for the `/users` resource (CRUD plus paged listing).
//!
//! All handlers require a live session via [`CurrentUser`]. Validation
//! failures come back field-attributed (422), kept strictly apart from
//! authentication outcomes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use stanchion_core::error::CoreError;
use stanchion_core::paging::{
    clamp_limit, clamp_offset, Page, SortOrder, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use stanchion_core::types::DbId;
use stanchion_core::validation::FieldErrors;
use stanchion_db::models::user::{CreateUser, UpdateUser, UserResponse};
use stanchion_db::repositories::UserRepo;
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::identity::CurrentUser;
use crate::query::ListParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub username: String,
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub password: String,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub last_name: Option<String>,
}

/// Request body for `PUT /users/{id}`. Absent fields are left untouched;
/// any accepted update stamps the row and so stales outstanding sessions.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 255, message = "must be 1 to 255 characters"))]
    pub password: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub first_name: Option<String>,
    #[validate(length(max = 255, message = "must be at most 255 characters"))]
    pub last_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /users
///
/// One page of users plus the unpaginated total, as `{rows, total}`.
pub async fn list_users(
    State(state): State<AppState>,
    _session: CurrentUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Page<UserResponse>>> {
    let sort = params.sort.as_deref().unwrap_or("id");
    let order = SortOrder::from_param(params.order.as_deref());
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let page = UserRepo::list_page(&state.pool, sort, order, limit, offset).await?;
    Ok(Json(page.map(UserResponse::from)))
}

/// POST /users
///
/// Create a new user. The password is hashed here; plaintext never reaches
/// the repository. Returns a safe [`UserResponse`] with 201 Created.
pub async fn create_user(
    State(state): State<AppState>,
    _session: CurrentUser,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let mut errors = field_errors(input.validate());
    if UserRepo::username_taken(&state.pool, &input.username, None).await? {
        errors.add("username", "is already taken");
    }
    errors.into_result().map_err(CoreError::from)?;

    let hashed = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create_dto = CreateUser {
        username: input.username,
        password_hash: hashed,
        first_name: input.first_name,
        last_name: input.last_name,
    };

    let user = UserRepo::create(&state.pool, &create_dto).await?;
    tracing::info!(user_id = user.id, "user created");

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

/// GET /users/{id}
///
/// Get a single user by ID.
pub async fn get_user(
    State(state): State<AppState>,
    _session: CurrentUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("User", id)))?;

    Ok(Json(UserResponse::from(user)))
}

/// PUT /users/{id}
///
/// Update a user. Applying the update advances the row's `updated_at`,
/// which invalidates every session issued for that user before now.
pub async fn update_user(
    State(state): State<AppState>,
    _session: CurrentUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let mut errors = field_errors(input.validate());
    if let Some(username) = &input.username {
        if UserRepo::username_taken(&state.pool, username, Some(id)).await? {
            errors.add("username", "is already taken");
        }
    }
    errors.into_result().map_err(CoreError::from)?;

    let password_hash = match &input.password {
        Some(password) => Some(
            hash_password(password)
                .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?,
        ),
        None => None,
    };

    let update_dto = UpdateUser {
        username: input.username,
        password_hash,
        first_name: input.first_name,
        last_name: input.last_name,
    };

    let user = UserRepo::update(&state.pool, id, &update_dto)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("User", id)))?;
    tracing::info!(user_id = user.id, "user updated, outstanding sessions staled");

    Ok(Json(UserResponse::from(user)))
}

/// DELETE /users/{id}
///
/// Hard-delete a user. Returns 204 No Content. Sessions still referencing
/// the id are rejected at their next validation.
pub async fn delete_user(
    State(state): State<AppState>,
    _session: CurrentUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = UserRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(user_id = id, "user deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::not_found("User", id)))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Flatten a derive-validation outcome into an accumulator so service-level
/// checks (duplicate username) can pile onto the same response.
fn field_errors(outcome: Result<(), validator::ValidationErrors>) -> FieldErrors {
    match outcome {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors.into(),
    }
}
