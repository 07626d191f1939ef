//! Backing store contract and the SPARQL-protocol HTTP client.
//!
//! The dispatch layer talks to the store through [`QueryBackend`]; calls
//! are synchronous and blocking, and nothing here retries. The HTTP
//! surface bridges onto the blocking pool before invoking it.

use std::io::Read;
use std::time::Duration;
use tracing::debug;
use triplecast_core::format::RdfSyntax;
use triplecast_core::results::ResultSyntax;

/// Failure in the backing store service
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("backend transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("backend returned an invalid payload: {0}")]
    InvalidPayload(String),
}

/// Whether a graph query is a CONSTRUCT or a DESCRIBE. The wire contract
/// is identical; the distinction exists for backends that care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphShape {
    Construct,
    Describe,
}

/// Operations the backing store exposes to the dispatcher.
pub trait QueryBackend: Send + Sync {
    /// Execute a SELECT query, streaming results in the given wire format
    fn select_query(
        &self,
        query: &str,
        wire: ResultSyntax,
    ) -> Result<Box<dyn Read + Send>, BackendError>;

    /// Execute an ASK query
    fn ask_query(&self, query: &str) -> Result<bool, BackendError>;

    /// Execute a CONSTRUCT or DESCRIBE query, streaming the graph in the
    /// given wire format
    fn graph_query(
        &self,
        query: &str,
        shape: GraphShape,
        wire: RdfSyntax,
    ) -> Result<Box<dyn Read + Send>, BackendError>;
}

/// SPARQL-protocol client for a remote store endpoint.
pub struct RemoteBackend {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl RemoteBackend {
    /// Create a client for the given endpoint URL
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn execute(&self, query: &str, accept: &str) -> Result<reqwest::blocking::Response, BackendError> {
        debug!(endpoint = %self.endpoint, %accept, "sending query to backend");
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/sparql-query")
            .header("Accept", accept)
            .body(query.to_string())
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

impl QueryBackend for RemoteBackend {
    fn select_query(
        &self,
        query: &str,
        wire: ResultSyntax,
    ) -> Result<Box<dyn Read + Send>, BackendError> {
        let response = self.execute(query, wire.media_type())?;
        Ok(Box::new(response))
    }

    fn ask_query(&self, query: &str) -> Result<bool, BackendError> {
        let response = self.execute(query, ResultSyntax::Json.media_type())?;
        let document: serde_json::Value = response.json()?;
        document
            .get("boolean")
            .and_then(serde_json::Value::as_bool)
            .ok_or_else(|| {
                BackendError::InvalidPayload(
                    "boolean query response is missing its boolean field".to_string(),
                )
            })
    }

    fn graph_query(
        &self,
        query: &str,
        shape: GraphShape,
        wire: RdfSyntax,
    ) -> Result<Box<dyn Read + Send>, BackendError> {
        debug!(?shape, "executing graph query");
        let response = self.execute(query, wire.media_type())?;
        Ok(Box::new(response))
    }
}
