//! Resource Handlers
//!
//! Per-request orchestration: consult the rate limiter with the
//! endpoint's declared quota class, dispatch to the store, and map the
//! outcome onto a response. The rate check always runs before any store
//! access.

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, info};

use super::policy::EndpointPolicy;
use super::AppState;
use crate::error::ApiError;
use crate::metrics;
use crate::store::{AuthorDraft, AuthorPatch};

/// Header carrying the client identity; absent callers share one bucket
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Client identity for rate limiting
fn client_id(headers: &HeaderMap) -> String {
    headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("anonymous")
        .to_string()
}

/// Run the admission check for an endpoint, counting the request
async fn admit(
    state: &AppState,
    policy: &EndpointPolicy,
    headers: &HeaderMap,
) -> Result<String, ApiError> {
    metrics::HTTP_REQUESTS_TOTAL
        .with_label_values(&[policy.action.as_str()])
        .inc();

    let client = client_id(headers);
    let decision = state.limiter.check_and_consume(&client, policy.quota).await;
    if decision.allowed {
        Ok(client)
    } else {
        Err(ApiError::RateLimited {
            retry_after_secs: decision
                .retry_after_secs
                .unwrap_or_else(|| policy.quota.unit.secs()),
        })
    }
}

/// Serialize a success response, attaching the endpoint's cache advice
fn respond<T: Serialize>(policy: &EndpointPolicy, status: StatusCode, value: &T) -> Response {
    match policy.cache {
        Some(cache) => (
            status,
            [(header::CACHE_CONTROL, cache.header_value())],
            Json(value),
        )
            .into_response(),
        None => (status, Json(value)).into_response(),
    }
}

/// GET /authors
pub async fn list_authors(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let policy = state.policies.list;
    admit(&state, &policy, &headers).await?;

    let authors = state.store.get_all().await;
    Ok(respond(&policy, StatusCode::OK, &authors))
}

/// GET /authors/{id}
pub async fn get_author(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let policy = state.policies.get;
    admit(&state, &policy, &headers).await?;

    let author = state.store.get(id).await.ok_or(ApiError::NotFound)?;
    Ok(respond(&policy, StatusCode::OK, &author))
}

/// POST /authors
pub async fn create_author(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(draft): Json<AuthorDraft>,
) -> Result<Response, ApiError> {
    let policy = state.policies.create;
    admit(&state, &policy, &headers).await?;

    let author = state.store.insert(draft).await?;
    metrics::STORED_AUTHORS.set(state.store.count().await as i64);
    info!(id = author.id, "created author");
    Ok(respond(&policy, StatusCode::CREATED, &author))
}

/// PUT /authors/{id}
pub async fn replace_author(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(draft): Json<AuthorDraft>,
) -> Result<Response, ApiError> {
    let policy = state.policies.replace;
    admit(&state, &policy, &headers).await?;

    let author = state.store.update(id, draft).await?;
    Ok(respond(&policy, StatusCode::OK, &author))
}

/// PATCH /authors/{id}
///
/// Applies only the provided fields. A patch carrying no fields is a
/// no-op and reported as such; the record is left untouched.
pub async fn patch_author(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(patch): Json<AuthorPatch>,
) -> Result<Response, ApiError> {
    let policy = state.policies.patch;
    admit(&state, &policy, &headers).await?;

    let existing = state.store.get(id).await.ok_or(ApiError::NotFound)?;
    if patch.is_empty() {
        return Err(ApiError::NotModified);
    }

    let draft = patch.apply_to(&existing);
    let author = state.store.update(id, draft).await?;
    Ok(respond(&policy, StatusCode::OK, &author))
}

/// DELETE /authors/{id}
pub async fn delete_author(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let policy = state.policies.delete;
    admit(&state, &policy, &headers).await?;

    let author = state.store.delete(id).await.ok_or(ApiError::NotFound)?;
    metrics::STORED_AUTHORS.set(state.store.count().await as i64);
    info!(id = author.id, "deleted author");
    Ok(respond(&policy, StatusCode::OK, &author))
}

/// PATCH /authors/reset
///
/// Administrative reinitialization: drops the calling client's limiter
/// counters and restores the store to its seed records.
pub async fn reset(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let policy = state.policies.reset;
    let client = admit(&state, &policy, &headers).await?;

    state.limiter.reset_client(&client).await;
    state.store.reset().await;
    metrics::STORED_AUTHORS.set(state.store.count().await as i64);
    info!(client = %client, "reset store and rate-limit counters");

    Ok(respond(&policy, StatusCode::OK, &true))
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /metrics
pub async fn metrics_endpoint() -> Response {
    match metrics::gather_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text).into_response(),
        Err(e) => {
            error!("Failed to gather metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error gathering metrics: {}", e),
            )
                .into_response()
        }
    }
}
