use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;
use crate::search::{format_response, QueryRequest, SearchParams};
use crate::state::AppState;

/// GET /everything-search-api/search?q=&limit=&match_all=
pub async fn search(
    State(state): State<Arc<AppState>>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(pairs) = pairs.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let params = SearchParams::from_pairs(pairs);
    let request = QueryRequest::from_params(&params, &state.config)?;

    // Everything calls block; run the whole pipeline off the async workers
    let executor = state.executor.clone();
    let response = tokio::task::spawn_blocking(move || executor.execute(&request))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(format_response(&response)))
}
