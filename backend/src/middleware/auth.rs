//! Authentication middleware
//!
//! JWT authentication and role-based access control middleware

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use shared::UserRole;
use uuid::Uuid;

use crate::error::{AppError, ErrorDetail, ErrorResponse};
use crate::services::auth::decode_claims;
use crate::AppState;

/// Authenticated user information extracted from JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    /// Guard for manager-only operations
    pub fn require_manager(&self) -> Result<(), AppError> {
        if self.is_manager() {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }

    /// Guard for creating and cancelling sales
    pub fn require_seller(&self) -> Result<(), AppError> {
        if self.role.can_sell() {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            return unauthorized_response("Missing or invalid Authorization header");
        }
    };

    let claims = match decode_claims(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    let user_id = match Uuid::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return unauthorized_response("Invalid user ID in token"),
    };

    let role = match UserRole::parse(&claims.role) {
        Some(role) => role,
        None => return unauthorized_response("Invalid role in token"),
    };

    request.extensions_mut().insert(AuthUser {
        user_id,
        email: claims.email,
        role,
    });

    next.run(request).await
}

/// Rejects non-managers; layer it after `auth_middleware`
pub async fn manager_only(request: Request, next: Next) -> Response {
    match request.extensions().get::<AuthUser>() {
        Some(user) if user.is_manager() => next.run(request).await,
        Some(_) => AppError::InsufficientPermissions.into_response(),
        None => unauthorized_response("Authentication required"),
    }
}

/// Create unauthorized response
fn unauthorized_response(message: &str) -> Response {
    let error = ErrorResponse {
        error: ErrorDetail::new("UNAUTHORIZED", message, "Non autorisé"),
    };

    (StatusCode::UNAUTHORIZED, Json(error)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "test@stockchic.fr".into(),
            role,
        }
    }

    #[test]
    fn test_manager_guard() {
        assert!(user(UserRole::Manager).require_manager().is_ok());
        assert!(matches!(
            user(UserRole::Seller).require_manager(),
            Err(AppError::InsufficientPermissions)
        ));
    }

    #[test]
    fn test_both_roles_can_sell() {
        assert!(user(UserRole::Manager).require_seller().is_ok());
        assert!(user(UserRole::Seller).require_seller().is_ok());
    }
}
