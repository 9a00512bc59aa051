use axum::{
    body::Bytes,
    extract::Path,
    http::{header::CONTENT_TYPE, HeaderMap},
    Extension, Json,
};
use std::sync::Arc;

use super::body::parse_body;
use crate::{formatter::Envelope, services::ItemService};

/// `/database/:app/:action`. Answered with a 200 and an envelope, including failures.
#[tracing::instrument(name = "http::database", skip_all)]
pub async fn database(
    Extension(service): Extension<Arc<ItemService>>,
    Path((app, action)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Envelope> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let envelope = match parse_body(content_type, &body) {
        Ok(body) => service.handle(&app, &action, body).await,
        Err(err) => {
            tracing::error!("{} {} sent an unreadable body: {:#}", app, action, err);
            Envelope::error(&err)
        }
    };

    Json(envelope)
}
