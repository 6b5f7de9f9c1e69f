use super::dto::{
    DownloadRequest, DownloadResponse, ErrorDetail, HealthStatus, InfoQuery, MediaQuery,
    ServiceStatus,
};
use crate::application::proxy::VIDEO_CONTENT_TYPE;
use crate::application::resolver::contains_platform_domain;
use crate::application::{MediaProxy, ProxyError, ResolverService};
use crate::domain::ResolveError;
use crate::ports::http::HttpClient;
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, StatusCode},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

pub const SERVICE_NAME: &str = "clipfetch API";

pub struct AppState<C> {
    pub resolver: Arc<ResolverService<C>>,
    pub proxy: Arc<MediaProxy<C>>,
}

impl<C> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            proxy: self.proxy.clone(),
        }
    }
}

pub fn router<C>(state: AppState<C>) -> Router
where
    C: HttpClient + 'static,
{
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/download", post(download::<C>))
        .route("/api/info", get(info::<C>))
        .route("/download", get(stream_media::<C>))
        .with_state(state)
}

async fn root() -> Json<ServiceStatus> {
    Json(ServiceStatus {
        status: "online",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: "healthy" })
}

async fn download<C>(
    State(state): State<AppState<C>>,
    Json(request): Json<DownloadRequest>,
) -> Json<DownloadResponse>
where
    C: HttpClient + 'static,
{
    Json(resolve_to_response(&state, &request.url).await)
}

async fn info<C>(
    State(state): State<AppState<C>>,
    Query(query): Query<InfoQuery>,
) -> Result<Json<DownloadResponse>, (StatusCode, Json<ErrorDetail>)>
where
    C: HttpClient + 'static,
{
    if !contains_platform_domain(&query.url) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorDetail {
                detail: "invalid URL",
            }),
        ));
    }

    Ok(Json(resolve_to_response(&state, &query.url).await))
}

// Streams the upstream media straight through to the caller.
async fn stream_media<C>(
    State(state): State<AppState<C>>,
    Query(query): Query<MediaQuery>,
) -> Result<Response, (StatusCode, String)>
where
    C: HttpClient + 'static,
{
    let download = state
        .proxy
        .open(&query.url, query.filename.as_deref())
        .await
        .map_err(|err| match err {
            ProxyError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            _ => (StatusCode::BAD_GATEWAY, err.to_string()),
        })?;

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, VIDEO_CONTENT_TYPE)
        .header(header::CONTENT_DISPOSITION, download.content_disposition());
    if let Some(length) = download.content_length {
        response = response.header(header::CONTENT_LENGTH, length);
    }

    response
        .body(Body::from_stream(download.body))
        .map_err(|err| (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))
}

/// Runs a resolution and folds every outcome, panics included, into a
/// response body.
async fn resolve_to_response<C>(state: &AppState<C>, url: &str) -> DownloadResponse
where
    C: HttpClient + 'static,
{
    let outcome = AssertUnwindSafe(state.resolver.resolve(url))
        .catch_unwind()
        .await
        .unwrap_or_else(|_| {
            tracing::error!("Resolution of {} panicked", url);
            Err(ResolveError::internal("resolver panicked"))
        });

    match outcome {
        Ok(metadata) => DownloadResponse::success(&metadata),
        Err(err) => DownloadResponse::failure(err.user_message()),
    }
}
