//! HTTP handlers for the article catalog

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use shared::{
    ArticleWithDeclinations, CollectionInfo, CreateArticleRequest, Declination, DeclinationInput,
    DeclinationWithArticle, PaginatedResponse, UpdateArticleRequest, UpdateDeclinationRequest,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::AuthUser;
use crate::services::{ArticleListQuery, CatalogService};
use crate::AppState;

/// List collection tags with their labels
pub async fn list_collections(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CollectionInfo>>> {
    let service = CatalogService::new(state.db);
    Ok(Json(service.list_collections().await?))
}

/// Create an article with its declinations
pub async fn create_article(
    State(state): State<AppState>,
    Json(input): Json<CreateArticleRequest>,
) -> AppResult<(StatusCode, Json<ArticleWithDeclinations>)> {
    let service = CatalogService::new(state.db);
    let article = service.create_article(input).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// List articles with filters, sorting and pagination
pub async fn list_articles(
    State(state): State<AppState>,
    Query(query): Query<ArticleListQuery>,
) -> AppResult<Json<PaginatedResponse<ArticleWithDeclinations>>> {
    let service = CatalogService::new(state.db);
    Ok(Json(service.list_articles(&query).await?))
}

/// Get an article by id
pub async fn get_article(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
) -> AppResult<Json<ArticleWithDeclinations>> {
    let service = CatalogService::new(state.db);
    Ok(Json(service.get_article(article_id).await?))
}

/// Get an article by its reference
pub async fn get_article_by_reference(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> AppResult<Json<ArticleWithDeclinations>> {
    let service = CatalogService::new(state.db);
    Ok(Json(service.get_article_by_reference(&reference).await?))
}

pub async fn update_article(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
    Json(input): Json<UpdateArticleRequest>,
) -> AppResult<Json<ArticleWithDeclinations>> {
    let service = CatalogService::new(state.db);
    Ok(Json(service.update_article(article_id, input).await?))
}

/// Delete an article (manager only)
pub async fn delete_article(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(article_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_manager()?;
    let service = CatalogService::new(state.db);
    service.delete_article(article_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a declination to an article
pub async fn add_declination(
    State(state): State<AppState>,
    Path(article_id): Path<Uuid>,
    Json(input): Json<DeclinationInput>,
) -> AppResult<(StatusCode, Json<Declination>)> {
    let service = CatalogService::new(state.db);
    let declination = service.add_declination(article_id, input).await?;
    Ok((StatusCode::CREATED, Json(declination)))
}

pub async fn update_declination(
    State(state): State<AppState>,
    Path(declination_id): Path<Uuid>,
    Json(input): Json<UpdateDeclinationRequest>,
) -> AppResult<Json<Declination>> {
    let service = CatalogService::new(state.db);
    Ok(Json(service.update_declination(declination_id, input).await?))
}

/// Delete a declination (manager only)
pub async fn delete_declination(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(declination_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    user.require_manager()?;
    let service = CatalogService::new(state.db);
    service.delete_declination(declination_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Barcode lookup at the till
pub async fn find_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> AppResult<Json<DeclinationWithArticle>> {
    let service = CatalogService::new(state.db);
    Ok(Json(service.find_by_barcode(&barcode).await?))
}
