//! Response sink the dispatcher writes into.

use std::io::Write;

/// Where a dispatched response goes: a content type, set exactly once and
/// before any body byte, and a byte sink for the body.
pub trait ResponseSink {
    /// Record the response content type. Calling this twice is a
    /// dispatcher bug.
    fn set_content_type(&mut self, media_type: &str);

    /// The body byte sink
    fn body(&mut self) -> &mut dyn Write;
}

/// In-memory sink used by the HTTP layer and by tests.
#[derive(Debug, Default)]
pub struct BufferSink {
    content_type: Option<String>,
    body: Vec<u8>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Consume the sink into its content type and body
    pub fn into_parts(self) -> (Option<String>, Vec<u8>) {
        (self.content_type, self.body)
    }
}

impl ResponseSink for BufferSink {
    fn set_content_type(&mut self, media_type: &str) {
        debug_assert!(
            self.content_type.is_none(),
            "content type set more than once"
        );
        self.content_type = Some(media_type.to_string());
    }

    fn body(&mut self) -> &mut dyn Write {
        &mut self.body
    }
}
