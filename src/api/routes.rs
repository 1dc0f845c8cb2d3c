use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::api::handlers;
use crate::auth::middleware::{require_admin, require_auth};
use crate::AppState;

/// Request bodies are small (credentials and tokens); cap them well below
/// anything a legitimate client sends.
const BODY_LIMIT_BYTES: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/federated/login", get(handlers::auth::federated_login))
        .route(
            "/auth/federated/callback",
            get(handlers::auth::federated_callback),
        );

    let protected_routes = Router::new()
        .route("/users/me", get(handlers::users::me))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // The admin gate composes inside the auth layer: identity is always
    // bound before the role check runs.
    let admin_routes = Router::new()
        .route("/admin/users", get(handlers::admin::list_users))
        .route(
            "/admin/users/{id}/activate",
            put(handlers::admin::activate_user),
        )
        .route(
            "/admin/users/{id}/deactivate",
            put(handlers::admin::deactivate_user),
        )
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = public_routes.merge(protected_routes).merge(admin_routes);

    let router = Router::new().nest("/api/v1", api);

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", crate::api::ApiDoc::openapi()),
        )
    };

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.server.request_timeout_secs,
        )))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .with_state(state)
}
