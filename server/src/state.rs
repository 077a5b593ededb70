use std::path::PathBuf;
use std::sync::Arc;

use axum::http::HeaderValue;
use engine::{MoveEngine, StockfishBridge};

use crate::codec::{CodecError, SessionCodec};
use crate::config::ServerConfig;

/// Everything a handler needs. Built once at startup and shared read-only.
pub struct AppState {
    pub codec: SessionCodec,
    pub engine: Arc<dyn MoveEngine>,
    pub static_dir: PathBuf,
    pub dev_origin: HeaderValue,
}

impl AppState {
    pub fn new(
        codec: SessionCodec,
        engine: Arc<dyn MoveEngine>,
        static_dir: PathBuf,
        dev_origin: HeaderValue,
    ) -> Self {
        Self {
            codec,
            engine,
            static_dir,
            dev_origin,
        }
    }

    /// Wire up the Stockfish-backed state described by `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self, CodecError> {
        let codec = SessionCodec::new(config.secret.as_bytes())?;
        let engine = StockfishBridge::new(config.engine_path.clone(), config.max_engines);
        Ok(Self::new(
            codec,
            Arc::new(engine),
            config.static_dir.clone(),
            config.dev_origin.clone(),
        ))
    }
}
