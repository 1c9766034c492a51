//! Request handlers.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use tokio::fs;

use crate::http::server::AppState;
use crate::observability::{metrics, ServiceStatus};
use crate::state::Stage;

pub const GREETING: &str = "Hello world! edgelink is running.";
/// Body served on the subscription path before a link exists.
pub const NOT_READY: &str = "Links not ready";

pub async fn root() -> &'static str {
    GREETING
}

/// The current subscription artifact as plain text.
///
/// Falls back to `sub.txt` once the working directory has been prepared,
/// then to [`NOT_READY`].
pub async fn subscription(State(state): State<AppState>) -> Response {
    let snapshot = state.context.snapshot();
    let body = match &snapshot.subscription {
        Some(artifact) => Some(artifact.as_str().to_string()),
        None if snapshot.stage != Stage::Init => read_persisted(&state).await,
        None => None,
    };

    metrics::record_subscription_request(body.is_some());
    let body = body.unwrap_or_else(|| NOT_READY.to_string());
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
}

async fn read_persisted(state: &AppState) -> Option<String> {
    let path = state.config.subscription_path();
    match fs::read_to_string(&path).await {
        Ok(content) if !content.trim().is_empty() => Some(content),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "No persisted subscription");
            None
        }
    }
}

pub async fn status(State(state): State<AppState>) -> Json<ServiceStatus> {
    Json(ServiceStatus::collect(&state.config, &state.context, &state.supervisor))
}
