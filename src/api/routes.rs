use crate::api::api_error::APIError;
use crate::api::model::{ListRecordsQuery, MutationResult};
use crate::api::server::AppState;
use crate::error::Error;
use crate::payload::{ListedRecord, RecordRequest};
use crate::records::{self, RecordSchemas};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::{json, Map, Value};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Set by the authenticating proxy in front of the API.
pub(super) const USERNAME_HEADER: &str = "x-username";

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/schemas", get(schemas))
        .route(
            "/records",
            get(list_records)
                .post(create_record)
                .delete(delete_all_records),
        )
        .route("/records/:id", post(update_record).delete(delete_record))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

fn username(headers: &HeaderMap) -> Result<String, Error> {
    headers
        .get(USERNAME_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|username| !username.is_empty())
        .map(str::to_string)
        .ok_or(Error::Unauthenticated)
}

fn record_request(payload: Map<String, Value>) -> Result<RecordRequest, Error> {
    Ok(RecordRequest::try_from(payload)?)
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

#[allow(clippy::unused_async)]
async fn schemas() -> Json<&'static RecordSchemas> {
    Json(records::schemas())
}

async fn list_records(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListRecordsQuery>,
) -> Result<Json<Vec<ListedRecord>>, APIError> {
    let username = username(&headers)?;
    let listed = state
        .records
        .list_records(&username, query.hide_managed)
        .await?;
    Ok(Json(listed))
}

async fn create_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    WithRejection(Json(payload), _): WithRejection<Json<Map<String, Value>>, APIError>,
) -> Result<Json<MutationResult>, APIError> {
    let username = username(&headers)?;
    let request = record_request(payload)?;
    state.records.create_record(&username, &request).await?;
    Ok(Json(MutationResult::OK))
}

async fn update_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<Map<String, Value>>, APIError>,
) -> Result<Json<MutationResult>, APIError> {
    let username = username(&headers)?;
    let request = record_request(payload)?;
    state.records.update_record(&username, &id, &request).await?;
    Ok(Json(MutationResult::OK))
}

async fn delete_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<MutationResult>, APIError> {
    let username = username(&headers)?;
    state.records.delete_record(&username, &id).await?;
    Ok(Json(MutationResult::OK))
}

async fn delete_all_records(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MutationResult>, APIError> {
    let username = username(&headers)?;
    state.records.delete_all_records(&username).await?;
    Ok(Json(MutationResult::OK))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn username_comes_from_proxy_header() {
        let mut headers = HeaderMap::new();
        assert!(matches!(username(&headers), Err(Error::Unauthenticated)));
        headers.insert(USERNAME_HEADER, HeaderValue::from_static("  "));
        assert!(matches!(username(&headers), Err(Error::Unauthenticated)));
        headers.insert(USERNAME_HEADER, HeaderValue::from_static("alice"));
        assert_eq!(username(&headers).unwrap(), "alice");
    }
}
