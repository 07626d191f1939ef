//! # Triplecast Endpoint
//!
//! A SPARQL query endpoint that executes queries through a backing store
//! service and returns results in the caller's requested serialization.
//!
//! The interesting part is the dispatch engine: per query shape
//! (SELECT / ASK / CONSTRUCT / DESCRIBE) and requested format, the
//! response is either the backend's wire bytes streamed unmodified, or a
//! decode-then-re-encode conversion through the in-memory representations
//! in `triplecast-core`. A static [`registry`] carries the per-format
//! policy; [`dispatch`] owns all the branching.

pub mod backend;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod server;
pub mod sink;

pub use backend::{BackendError, GraphShape, QueryBackend, RemoteBackend};
pub use config::ServerConfig;
pub use dispatch::{dispatch, DispatchError, QueryShape};
pub use error::{ServiceError, ServiceResult};
pub use server::AppState;
pub use sink::{BufferSink, ResponseSink};
