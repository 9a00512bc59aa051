use axum::{
    http::{Method, Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Extension, Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::services::ItemService;

pub mod body;
pub mod database;
pub mod health;

pub fn http_router(service: Arc<ItemService>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/database/:app/:action",
            get(database::database)
                .post(database::database)
                .put(database::database)
                .delete(database::database),
        )
        .layer(Extension(service))
        .layer(cors_layer())
        .layer(middleware::from_fn(options_no_content))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

/// `OPTIONS` never reaches a handler, the CORS layer answers it with a 200. Sent as a 204.
async fn options_no_content<B>(request: Request<B>, next: Next<B>) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;

    if is_options && response.status().is_success() {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }

    response
}
