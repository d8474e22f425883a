//! Error handling for the Stock Chic server
//!
//! Provides consistent error responses in English and French

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::{CatalogError, MovementError, SaleError};
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_fr: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state: {message}")]
    InvalidState { message: String, message_fr: String },

    #[error("Insufficient stock: {message}")]
    InsufficientStock {
        message: String,
        message_fr: String,
        context: serde_json::Value,
    },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_fr: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl ErrorDetail {
    pub fn new(code: &str, message_en: impl Into<String>, message_fr: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message_en: message_en.into(),
            message_fr: message_fr.into(),
            field: None,
            context: None,
        }
    }

    fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

impl AppError {
    pub fn validation(
        field: impl Into<String>,
        message: impl Into<String>,
        message_fr: impl Into<String>,
    ) -> Self {
        AppError::Validation {
            field: field.into(),
            message: message.into(),
            message_fr: message_fr.into(),
        }
    }

    /// Turn a unique-constraint violation into `DuplicateEntry`, passing other errors through
    pub fn from_unique_violation(err: sqlx::Error) -> Self {
        let constraint = err
            .as_database_error()
            .filter(|db| db.code().as_deref() == Some("23505"))
            .map(|db| db.constraint().unwrap_or_default().to_string());

        match constraint {
            Some(name) => AppError::DuplicateEntry(duplicate_field(&name).to_string()),
            None => AppError::DatabaseError(err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::TokenExpired | AppError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AppError::Validation { .. }
            | AppError::ValidationError(_)
            | AppError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            AppError::DuplicateEntry(_) | AppError::InvalidState { .. } => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_) | AppError::Internal(_) | AppError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn detail(&self) -> ErrorDetail {
        match self {
            AppError::InvalidCredentials => ErrorDetail::new(
                "INVALID_CREDENTIALS",
                "Invalid email or password",
                "Email ou mot de passe incorrect",
            ),
            AppError::TokenExpired => {
                ErrorDetail::new("TOKEN_EXPIRED", "Token has expired", "Le jeton a expiré")
            }
            AppError::InvalidToken => {
                ErrorDetail::new("INVALID_TOKEN", "Invalid token", "Jeton invalide")
            }
            AppError::InsufficientPermissions => ErrorDetail::new(
                "INSUFFICIENT_PERMISSIONS",
                "You do not have permission to perform this action",
                "Vous n'avez pas les droits pour effectuer cette action",
            ),
            AppError::Validation {
                field,
                message,
                message_fr,
            } => ErrorDetail::new("VALIDATION_ERROR", message.clone(), message_fr.clone())
                .with_field(field.clone()),
            AppError::ValidationError(msg) => ErrorDetail::new(
                "VALIDATION_ERROR",
                msg.clone(),
                format!("Données invalides : {}", msg),
            ),
            AppError::DuplicateEntry(field) => ErrorDetail::new(
                "DUPLICATE_ENTRY",
                format!("A record with this {} already exists", field),
                format!("Un enregistrement avec ce {} existe déjà", field),
            )
            .with_field(field.clone()),
            AppError::NotFound(resource) => ErrorDetail::new(
                "NOT_FOUND",
                format!("{} not found", resource),
                format!("{} introuvable", resource),
            ),
            AppError::InvalidState {
                message,
                message_fr,
            } => ErrorDetail::new("INVALID_STATE", message.clone(), message_fr.clone()),
            AppError::InsufficientStock {
                message,
                message_fr,
                context,
            } => ErrorDetail {
                context: Some(context.clone()),
                ..ErrorDetail::new("INSUFFICIENT_STOCK", message.clone(), message_fr.clone())
            },
            AppError::DatabaseError(_) => ErrorDetail::new(
                "DATABASE_ERROR",
                "A database error occurred",
                "Une erreur de base de données est survenue",
            ),
            AppError::Internal(_) | AppError::InternalError(_) => ErrorDetail::new(
                "INTERNAL_ERROR",
                "An internal server error occurred",
                "Une erreur interne est survenue",
            ),
        }
    }
}

fn duplicate_field(constraint: &str) -> &'static str {
    match constraint {
        "articles_reference_key" => "reference",
        "declinaisons_code_barre_key" => "code_barre",
        "declinaisons_article_variant_key" => "declinaison",
        "users_email_key" => "email",
        "ventes_numero_vente_key" => "numero_vente",
        _ => "value",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!("Request rejected: {}", self);
        }

        (status, Json(ErrorResponse { error: self.detail() })).into_response()
    }
}

impl From<SaleError> for AppError {
    fn from(err: SaleError) -> Self {
        match err {
            SaleError::EmptySale => AppError::validation(
                "items",
                "Sale must contain at least one item",
                "La vente doit contenir au moins un article",
            ),
            SaleError::InvalidQuantity { line } => AppError::validation(
                format!("items[{}].quantite", line - 1),
                format!("Line {}: quantity must be at least 1", line),
                format!("Ligne {} : la quantité doit être au moins 1", line),
            ),
            SaleError::NegativeUnitPrice { line } => AppError::validation(
                format!("items[{}].prix_unitaire", line - 1),
                format!("Line {}: unit price cannot be negative", line),
                format!("Ligne {} : le prix unitaire ne peut pas être négatif", line),
            ),
            SaleError::NegativePayment => AppError::validation(
                "montant_paye",
                "Amount paid cannot be negative",
                "Le montant payé ne peut pas être négatif",
            ),
            SaleError::Underpaid { paid, total } => AppError::validation(
                "montant_paye",
                format!("Amount paid {} is less than total {}", paid, total),
                format!("Le montant payé {} est inférieur au total {}", paid, total),
            ),
            SaleError::AmountOverflow => AppError::validation(
                "items",
                "Sale amount exceeds the supported range",
                "Le montant de la vente dépasse la limite autorisée",
            ),
            SaleError::ArticleNotFound(id) => AppError::NotFound(format!("Article {}", id)),
            SaleError::DeclinationNotFound { declination_id, .. } => {
                AppError::NotFound(format!("Declinaison {}", declination_id))
            }
            SaleError::InsufficientStock {
                ref article_name,
                ref size,
                ref color,
                available,
                requested,
            } => AppError::InsufficientStock {
                message_fr: format!(
                    "Stock insuffisant pour {} ({} - {}). Disponible: {}",
                    article_name, size, color, available
                ),
                context: serde_json::json!({
                    "article": article_name,
                    "taille": size,
                    "couleur": color,
                    "disponible": available,
                    "demande": requested,
                }),
                message: err.to_string(),
            },
            SaleError::AlreadyCancelled(ref number) => AppError::InvalidState {
                message_fr: format!("La vente {} est déjà annulée", number),
                message: err.to_string(),
            },
            SaleError::InvalidTransition { from, to } => AppError::InvalidState {
                message: err.to_string(),
                message_fr: format!("Impossible de passer la vente de {} à {}", from, to),
            },
        }
    }
}

impl From<MovementError> for AppError {
    fn from(err: MovementError) -> Self {
        match err {
            MovementError::NonPositiveQuantity { .. } => AppError::validation(
                "quantite",
                "Quantity must be positive",
                "La quantité doit être positive",
            ),
            MovementError::ZeroAdjustment => AppError::validation(
                "quantite",
                "Adjustment cannot be zero",
                "L'ajustement ne peut pas être nul",
            ),
            MovementError::Overflow => AppError::validation(
                "quantite",
                "Quantity exceeds the supported range",
                "La quantité dépasse la limite autorisée",
            ),
            MovementError::InsufficientStock {
                available,
                requested,
            } => AppError::InsufficientStock {
                message: err.to_string(),
                message_fr: format!(
                    "Stock insuffisant : {} disponible(s), {} demandé(s)",
                    available, requested
                ),
                context: serde_json::json!({
                    "disponible": available,
                    "demande": requested,
                }),
            },
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Invalid(errors) => errors.into(),
            CatalogError::NoDeclinations => AppError::validation(
                "declinaisons",
                "An article needs at least one declination",
                "Un article doit avoir au moins une déclinaison",
            ),
            CatalogError::DuplicateBarcode(_) => AppError::DuplicateEntry("code_barre".to_string()),
            CatalogError::DuplicateVariant { .. } => {
                AppError::DuplicateEntry("declinaison".to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let first = field_errors
            .iter()
            .min_by_key(|(field, _)| **field)
            .and_then(|(field, errs)| errs.first().map(|e| (*field, e)));

        match first {
            Some((field, err)) => {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value for {}", field));
                AppError::Validation {
                    field: field.to_string(),
                    message_fr: format!("Valeur invalide pour {}", field),
                    message,
                }
            }
            None => AppError::ValidationError(errors.to_string()),
        }
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
