//! HTTP surface: extraction endpoints and the language-model proxy.

use crate::config::ScriberConfig;
use crate::error::ScribeError;
use crate::model::ExtractionResult;
use crate::pipelines;
use crate::providers::{OpenAIProxy, UpstreamReply};
use crate::url_to_text::fetchers::{ChromeFetcher, RequestFetcher};
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Immutable state shared by all requests
pub struct AppState {
    pub fetcher: RequestFetcher,
    pub chrome: ChromeFetcher,
    pub llm: OpenAIProxy,
}

impl AppState {
    pub fn from_config(config: &ScriberConfig) -> Result<Self, ScribeError> {
        Ok(Self {
            fetcher: RequestFetcher::new(&config.fetch)?,
            chrome: ChromeFetcher::new(&config.browser),
            llm: OpenAIProxy::new(&config.llm),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct UrlParams {
    url: Option<String>,
}

impl IntoResponse for ScribeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            info!("Request rejected ({}): {}", status, self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Builds the router for the service
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/fetch-static",
            get(fetch_static).post(fetch_static).fallback(method_not_allowed),
        )
        .route(
            "/api/fetch-browser",
            get(fetch_browser).post(fetch_browser).fallback(method_not_allowed),
        )
        .route("/api/chat", post(chat).fallback(method_not_allowed))
        .route("/api/tts", post(tts).fallback(method_not_allowed))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serves until Ctrl-C
pub async fn serve(config: ScriberConfig) -> Result<(), ScribeError> {
    let app = router(AppState::from_config(&config)?);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn method_not_allowed() -> ScribeError {
    ScribeError::MethodNotAllowed
}

/// The `url` query parameter, else the `url` field of a JSON body
fn requested_url(
    query: Result<Query<UrlParams>, QueryRejection>,
    body: &Bytes,
) -> Result<String, ScribeError> {
    let Query(query) =
        query.map_err(|rejection| ScribeError::InvalidQuery(rejection.body_text()))?;
    query
        .url
        .filter(|url| !url.trim().is_empty())
        .or_else(|| {
            serde_json::from_slice::<UrlParams>(body)
                .ok()
                .and_then(|params| params.url)
        })
        .filter(|url| !url.trim().is_empty())
        .ok_or(ScribeError::MissingParameter("url"))
}

async fn fetch_static(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UrlParams>, QueryRejection>,
    body: Bytes,
) -> Result<Json<ExtractionResult>, ScribeError> {
    let url = requested_url(query, &body)?;
    let result = pipelines::url::process(&url, &state.fetcher).await?;
    Ok(Json(result))
}

async fn fetch_browser(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UrlParams>, QueryRejection>,
    body: Bytes,
) -> Result<Json<ExtractionResult>, ScribeError> {
    let url = requested_url(query, &body)?;
    let result = pipelines::browser::process(&url, &state.chrome).await?;
    Ok(Json(result))
}

async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, ScribeError> {
    let UpstreamReply {
        status,
        content_type,
        body,
    } = state.llm.chat(body).await?;
    let content_type =
        content_type.unwrap_or_else(|| HeaderValue::from_static("application/json"));
    Ok((status, [(CONTENT_TYPE, content_type)], body).into_response())
}

async fn tts(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, ScribeError> {
    let audio = state.llm.speech(body).await?;
    Ok(([(CONTENT_TYPE, "audio/mpeg")], audio).into_response())
}
