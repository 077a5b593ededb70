/// Failure modes of an engine move request.
///
/// `MissingPosition` and `InvalidPosition` are caller mistakes; everything
/// else is an engine-side failure.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("FEN not provided")]
    MissingPosition,
    #[error("Invalid FEN: {0}")]
    InvalidPosition(String),
    #[error("Engine unavailable: {0}")]
    Unavailable(String),
    #[error("Could not compute move")]
    NoMoveFound,
    #[error("Engine did not answer within {0} ms")]
    Timeout(u64),
    #[error("Engine protocol error: {0}")]
    Protocol(String),
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// True when the request itself was at fault rather than the engine.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::MissingPosition | Self::InvalidPosition(_))
    }
}
