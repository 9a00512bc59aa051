use axum::{http::StatusCode, response::Html, Extension};
use itemgate_core::App;
use std::sync::Arc;

use crate::services::ItemService;

/// Opens and closes one store connection.
#[tracing::instrument(name = "http::health", skip_all)]
pub async fn health(
    Extension(service): Extension<Arc<ItemService>>,
) -> Result<Html<&'static str>, StatusCode> {
    let mut session = match service.store.connect(App::HelpDesk.database_name()).await {
        Ok(session) => session,
        Err(err) => {
            tracing::error!("health check could not reach the store: {:#}", err);
            return Err(StatusCode::SERVICE_UNAVAILABLE);
        }
    };

    if let Err(err) = session.close().await {
        tracing::warn!("health check connection did not close cleanly: {:#}", err);
    }

    Ok(Html("ok"))
}
