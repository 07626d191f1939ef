//! SPARQL query endpoint handlers.
//!
//! The handlers own the request-parameter surface: extracting the query
//! and format names, validating the names against the registries, and
//! classifying the query. Everything past that point belongs to
//! [`crate::dispatch`], which runs on the blocking pool because backend
//! calls are synchronous.

use crate::dispatch::{dispatch, QueryShape};
use crate::error::{ServiceError, ServiceResult};
use crate::registry::{graph_names, lookup_graph, lookup_tabular, tabular_names};
use crate::server::AppState;
use crate::sink::BufferSink;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Form;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Graph format applied when the request does not name one
pub const DEFAULT_GRAPH_FORMAT: &str = "RDF/XML-ABBREV";

/// Query parameters accepted by both GET and form-POST requests
#[derive(Debug, Deserialize)]
pub struct SparqlQueryParams {
    pub query: Option<String>,
    #[serde(rename = "resultFormat")]
    pub result_format: Option<String>,
    #[serde(rename = "rdfResultFormat")]
    pub rdf_result_format: Option<String>,
}

/// GET /sparql
#[instrument(skip_all)]
pub async fn query_handler_get(
    State(state): State<AppState>,
    Query(params): Query<SparqlQueryParams>,
) -> ServiceResult<Response> {
    run_query(state, params).await
}

/// POST /sparql (form-encoded)
#[instrument(skip_all)]
pub async fn query_handler_post(
    State(state): State<AppState>,
    Form(params): Form<SparqlQueryParams>,
) -> ServiceResult<Response> {
    run_query(state, params).await
}

async fn run_query(state: AppState, params: SparqlQueryParams) -> ServiceResult<Response> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ServiceError::bad_request("missing query parameter"))?;
    let tabular_format = params
        .result_format
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ServiceError::bad_request("missing resultFormat parameter"))?;
    let graph_format = params
        .rdf_result_format
        .filter(|f| !f.is_empty())
        .unwrap_or_else(|| DEFAULT_GRAPH_FORMAT.to_string());

    if lookup_tabular(&tabular_format).is_none() {
        return Err(ServiceError::bad_request(format!(
            "unknown resultFormat {tabular_format:?}; known formats: {}",
            tabular_names().join(", ")
        )));
    }
    if lookup_graph(&graph_format).is_none() {
        return Err(ServiceError::bad_request(format!(
            "unknown rdfResultFormat {graph_format:?}; known formats: {}",
            graph_names().join(", ")
        )));
    }

    let shape = QueryShape::classify(&query).ok_or_else(|| {
        ServiceError::bad_request("query must be a SELECT, ASK, CONSTRUCT or DESCRIBE form")
    })?;

    let request_id = Uuid::new_v4();
    debug!(%request_id, ?shape, %tabular_format, %graph_format, "executing query");

    let timeout_secs = state.config.server.request_timeout_secs;
    let backend = state.backend.clone();
    let task = tokio::task::spawn_blocking(move || {
        let mut sink = BufferSink::new();
        dispatch(
            &query,
            shape,
            &tabular_format,
            &graph_format,
            backend.as_ref(),
            &mut sink,
        )
        .map(|_| sink)
    });

    let sink = match tokio::time::timeout(Duration::from_secs(timeout_secs), task).await {
        Err(_) => return Err(ServiceError::Timeout(timeout_secs)),
        Ok(Err(join_error)) => {
            return Err(ServiceError::internal(format!(
                "dispatch task failed: {join_error}"
            )))
        }
        Ok(Ok(result)) => result?,
    };

    let (content_type, body) = sink.into_parts();
    let content_type = content_type.unwrap_or_else(|| "application/octet-stream".to_string());
    debug!(%request_id, %content_type, bytes = body.len(), "query complete");
    Ok(([(CONTENT_TYPE, content_type)], body).into_response())
}
