use std::fmt;

/// Error kind — which stage of message processing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed record key or value.
    Decode,
    /// The offloaded scoring computation failed.
    Compute,
    /// History read or write failed.
    Store,
    /// Result publish failed.
    Sink,
    /// Broker fetch, commit or group membership failed.
    Transport,
}

/// Processing error — returned by all capability trait methods.
///
/// Any kind blocks the commit of the record being processed and halts
/// the consume loop; there is no internal retry.
#[derive(Debug)]
pub struct PointsError {
    pub kind: ErrorKind,
    pub message: String,
}

impl PointsError {
    pub fn decode(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Decode, message: msg.into() }
    }

    pub fn compute(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Compute, message: msg.into() }
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Store, message: msg.into() }
    }

    pub fn sink(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Sink, message: msg.into() }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Transport, message: msg.into() }
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Display for PointsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for PointsError {}

// ---------------------------------------------------------------------------
// From impls: standard error types → PointsError with correct ErrorKind
// ---------------------------------------------------------------------------

impl From<serde_json::Error> for PointsError {
    fn from(e: serde_json::Error) -> Self {
        Self::decode(e.to_string())
    }
}

impl From<std::str::Utf8Error> for PointsError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::decode(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for PointsError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::decode(e.to_string())
    }
}

impl From<std::io::Error> for PointsError {
    fn from(e: std::io::Error) -> Self {
        Self::transport(e.to_string())
    }
}
