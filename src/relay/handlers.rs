use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::Method,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};

use super::AppState;
use super::dto::{ChatRequest, ChatResponse};
use crate::{service, upstream::UpstreamReply};

pub fn build_router(state: Arc<AppState>, chat_path: &str) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE]);

    // Build router
    Router::new()
        .route("/health", get(health_check))
        .route(chat_path, post(chat_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> service::Result<Json<ChatResponse>> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::warn!("Rejected chat body: {}", rejection.body_text());
        service::Error::BadRequest(rejection.body_text().into())
    })?;

    let request = ChatRequest::from_json(body, state.max_message_length).inspect_err(|error| {
        tracing::warn!("Rejected chat request: {}", error);
    })?;

    tracing::debug!(
        chars = request.message.chars().count(),
        model = state.client.model(),
        "Relaying chat message"
    );

    match state.client.complete(&request.message).await {
        Ok(UpstreamReply::Success { text }) => Ok(Json(ChatResponse { response: text })),
        Ok(UpstreamReply::Malformed) => {
            tracing::warn!("Upstream replied without choices[0].message.content");
            Err(service::Error::BadGateway(
                "malformed response from upstream".into(),
            ))
        }
        Ok(UpstreamReply::UpstreamError { status, message }) => {
            tracing::warn!(%status, ?message, "Upstream returned an error");
            Err(service::Error::BadGateway(
                format!("upstream returned {}", status.as_u16()).into(),
            ))
        }
        Err(error) => {
            tracing::error!(upstream = state.client.url(), "Upstream request failed: {}", error);
            Err(service::Error::BadGateway("upstream request failed".into()))
        }
    }
}
