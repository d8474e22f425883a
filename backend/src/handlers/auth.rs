//! Authentication and user management handlers

use axum::{extract::State, http::StatusCode, Extension, Json};
use shared::{CreateUserRequest, LoginRequest, LoginResponse, User};

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::AuthService;
use crate::AppState;

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let response = auth_service.login(&body).await?;
    Ok(Json(response))
}

/// Current user
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> AppResult<Json<User>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service.get_user(user.user_id).await?;
    Ok(Json(user))
}

/// List every account (manager only)
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<User>>> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let users = auth_service.list_users().await?;
    Ok(Json(users))
}

/// Create an account (manager only)
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<User>)> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let user = auth_service.create_user(&body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
