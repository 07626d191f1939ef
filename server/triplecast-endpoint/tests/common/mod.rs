//! Shared mock backend for integration tests.

use std::io::{Cursor, Read};
use std::sync::Mutex;
use triplecast_core::format::RdfSyntax;
use triplecast_core::results::ResultSyntax;
use triplecast_endpoint::{BackendError, GraphShape, QueryBackend};

/// In-memory backend with canned payloads and a request log.
#[derive(Default)]
pub struct MockBackend {
    pub select_payload: Vec<u8>,
    pub graph_payload: Vec<u8>,
    pub ask_value: bool,
    pub fail: bool,
    requests: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_select_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.select_payload = payload.into();
        self
    }

    pub fn with_graph_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.graph_payload = payload.into();
        self
    }

    pub fn with_ask_value(mut self, value: bool) -> Self {
        self.ask_value = value;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// The operations this backend served, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, entry: String) {
        self.requests.lock().unwrap().push(entry);
    }

    fn failure(&self) -> BackendError {
        BackendError::Status {
            status: 500,
            body: "backend exploded".to_string(),
        }
    }
}

impl QueryBackend for MockBackend {
    fn select_query(
        &self,
        _query: &str,
        wire: ResultSyntax,
    ) -> Result<Box<dyn Read + Send>, BackendError> {
        self.record(format!("select:{wire}"));
        if self.fail {
            return Err(self.failure());
        }
        Ok(Box::new(Cursor::new(self.select_payload.clone())))
    }

    fn ask_query(&self, _query: &str) -> Result<bool, BackendError> {
        self.record("ask".to_string());
        if self.fail {
            return Err(self.failure());
        }
        Ok(self.ask_value)
    }

    fn graph_query(
        &self,
        _query: &str,
        shape: GraphShape,
        wire: RdfSyntax,
    ) -> Result<Box<dyn Read + Send>, BackendError> {
        self.record(format!("graph:{shape:?}:{wire}"));
        if self.fail {
            return Err(self.failure());
        }
        Ok(Box::new(Cursor::new(self.graph_payload.clone())))
    }
}
