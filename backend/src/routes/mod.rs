//! Route definitions for the Stock Chic API

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{
    handlers,
    middleware::{auth_middleware, manager_only},
    AppState,
};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let authenticated = Router::new()
        .route("/auth/me", get(handlers::me))
        .route("/collections", get(handlers::list_collections))
        .nest("/articles", article_routes())
        .nest("/declinaisons", declination_routes())
        .nest("/sales", sale_routes())
        .nest("/stock", stock_routes())
        .route("/stats/overview", get(handlers::get_overview))
        .route("/reports/sales", get(handlers::get_sales_report))
        .nest("/users", user_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Login (public)
        .route("/auth/login", post(handlers::login))
        .merge(authenticated)
}

/// Article catalog routes
fn article_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_articles).post(handlers::create_article),
        )
        .route("/alerts/stock-low", get(handlers::low_stock_alerts))
        .route(
            "/reference/:reference",
            get(handlers::get_article_by_reference),
        )
        .route(
            "/:article_id",
            get(handlers::get_article)
                .put(handlers::update_article)
                .delete(handlers::delete_article),
        )
        .route("/:article_id/declinaisons", post(handlers::add_declination))
}

/// Declination routes
fn declination_routes() -> Router<AppState> {
    Router::new()
        .route("/barcode/:barcode", get(handlers::find_by_barcode))
        .route(
            "/:declination_id",
            put(handlers::update_declination).delete(handlers::delete_declination),
        )
}

/// Sale ledger routes
fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sales).post(handlers::create_sale))
        .route(
            "/:sale_id",
            get(handlers::get_sale).delete(handlers::cancel_sale),
        )
}

/// Manual stock movement routes
fn stock_routes() -> Router<AppState> {
    Router::new().route(
        "/movements",
        get(handlers::list_movements).post(handlers::record_movement),
    )
}

/// Account management routes; `manager_only` runs after `auth_middleware`
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route_layer(middleware::from_fn(manager_only))
}
