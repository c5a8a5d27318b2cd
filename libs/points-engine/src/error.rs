use points_api::error::PointsError;

#[derive(Debug, thiserror::Error)]
pub enum ConsumerError {
    #[error("config error: {0}")]
    Config(String),

    #[error("processing error: {0}")]
    Process(#[from] PointsError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConsumerError {
    /// Add context to the error.
    ///
    /// For `Process` variant, context is added to the inner `PointsError`
    /// so the ErrorKind survives. For other variants, context is
    /// prepended to the message.
    pub fn with_context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            ConsumerError::Process(e) => ConsumerError::Process(e.with_context(ctx)),
            ConsumerError::Config(msg) => ConsumerError::Config(format!("{ctx}: {msg}")),
            other => other,
        }
    }
}
