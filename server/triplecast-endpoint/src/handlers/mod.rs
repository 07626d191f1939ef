//! HTTP request handlers.

pub mod sparql;

pub use sparql::{query_handler_get, query_handler_post, SparqlQueryParams};
