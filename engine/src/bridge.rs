//! Difficulty presets and the request-scoped engine bridge.
//!
//! Every computation gets its own engine process, so no engine instance ever
//! sees two interleaved searches. A semaphore caps how many processes run at
//! once.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::stockfish::{EngineConfig, StockfishEngine};
use crate::{EngineCommand, EngineError, EngineEvent, EngineInfo, GoParams};

/// Search depth ceiling applied at every difficulty.
pub const DEPTH_CAP: u8 = 15;

/// Extra time on top of the think budget before a search is abandoned.
const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// Difficulty presets offered to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Engine tuning derived from a [`Difficulty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineParams {
    pub skill_level: u8,
    pub movetime_ms: u64,
    pub depth: u8,
}

impl Difficulty {
    /// Map a client-supplied label. Anything unrecognised, including no
    /// label at all, plays at medium.
    pub fn from_label(label: Option<&str>) -> Self {
        match label {
            Some("easy") => Self::Easy,
            Some("hard") => Self::Hard,
            _ => Self::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    pub fn params(self) -> EngineParams {
        let (skill_level, movetime_ms) = match self {
            Self::Easy => (5, 500),
            Self::Medium => (10, 1000),
            Self::Hard => (16, 2000),
        };
        EngineParams {
            skill_level,
            movetime_ms,
            depth: DEPTH_CAP,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something that can answer "what should be played here?".
#[async_trait]
pub trait MoveEngine: Send + Sync {
    /// Compute a reply for the position in `fen`, returned in UCI notation.
    async fn compute_move(
        &self,
        fen: Option<&str>,
        difficulty: Difficulty,
    ) -> Result<String, EngineError>;
}

/// [`MoveEngine`] backed by a fresh Stockfish process per request.
pub struct StockfishBridge {
    path: Option<PathBuf>,
    permits: Semaphore,
    grace: Duration,
}

impl StockfishBridge {
    pub fn new(path: Option<PathBuf>, max_concurrent: usize) -> Self {
        Self {
            path,
            permits: Semaphore::new(max_concurrent.max(1)),
            grace: DEFAULT_GRACE,
        }
    }
}

#[async_trait]
impl MoveEngine for StockfishBridge {
    #[tracing::instrument(level = "info", skip(self, difficulty), fields(%difficulty))]
    async fn compute_move(
        &self,
        fen: Option<&str>,
        difficulty: Difficulty,
    ) -> Result<String, EngineError> {
        let fen = validate_fen(fen)?;
        let params = difficulty.params();

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| EngineError::Unavailable("engine pool closed".to_string()))?;

        let mut engine = StockfishEngine::spawn_with_config(EngineConfig {
            path: self.path.clone(),
            skill_level: Some(params.skill_level),
        })
        .await?;

        let result = search(&mut engine, fen, params, self.grace).await;
        if matches!(result, Err(EngineError::Timeout(_))) {
            let _ = engine.send_command(EngineCommand::Stop).await;
        }
        engine.shutdown().await;

        match &result {
            Ok(mv) => tracing::info!(best_move = %mv, "Engine move computed"),
            Err(e) => tracing::warn!("Engine move failed: {}", e),
        }
        result
    }
}

/// Reject absent, blank and unparseable positions before any process is spawned.
pub fn validate_fen(fen: Option<&str>) -> Result<&str, EngineError> {
    let fen = fen
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or(EngineError::MissingPosition)?;
    chess::parse_fen(fen).map_err(|e| EngineError::InvalidPosition(e.to_string()))?;
    Ok(fen)
}

async fn search(
    engine: &mut StockfishEngine,
    fen: &str,
    params: EngineParams,
    grace: Duration,
) -> Result<String, EngineError> {
    engine
        .send_command(EngineCommand::SetPosition {
            fen: fen.to_string(),
        })
        .await?;
    engine
        .send_command(EngineCommand::Go(GoParams {
            movetime: Some(params.movetime_ms),
            depth: Some(params.depth),
            infinite: false,
        }))
        .await?;

    let budget = Duration::from_millis(params.movetime_ms) + grace;
    let mut last_info: Option<EngineInfo> = None;

    let outcome = tokio::time::timeout(budget, async {
        loop {
            match engine.recv_event().await {
                Some(EngineEvent::BestMove(mv)) => return Ok(chess::format_uci_move(mv)),
                Some(EngineEvent::NoMove) => return Err(EngineError::NoMoveFound),
                Some(EngineEvent::Info(info)) => last_info = Some(info),
                Some(EngineEvent::Error(e)) => return Err(EngineError::Protocol(e)),
                Some(EngineEvent::Ready) => continue,
                None => {
                    return Err(EngineError::Protocol(
                        "engine exited before answering".to_string(),
                    ))
                }
            }
        }
    })
    .await;

    if let Some(info) = &last_info {
        tracing::debug!(depth = ?info.depth, nodes = ?info.nodes, score = ?info.score, "Last search info");
    }

    outcome.map_err(|_| EngineError::Timeout(budget.as_millis() as u64))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_table() {
        let cases = [
            (Some("easy"), 5, 500),
            (Some("medium"), 10, 1000),
            (Some("hard"), 16, 2000),
            (Some("grandmaster"), 10, 1000),
            (Some("EASY"), 10, 1000),
            (Some(""), 10, 1000),
            (None, 10, 1000),
        ];
        for (label, skill, movetime) in cases {
            let params = Difficulty::from_label(label).params();
            assert_eq!(params.skill_level, skill, "skill for {:?}", label);
            assert_eq!(params.movetime_ms, movetime, "movetime for {:?}", label);
            assert_eq!(params.depth, DEPTH_CAP);
        }
    }

    #[test]
    fn test_depth_cap_is_fifteen() {
        assert_eq!(DEPTH_CAP, 15);
    }

    #[test]
    fn test_validate_fen() {
        assert!(matches!(validate_fen(None), Err(EngineError::MissingPosition)));
        assert!(matches!(
            validate_fen(Some("  ")),
            Err(EngineError::MissingPosition)
        ));
        assert!(matches!(
            validate_fen(Some("garbage fen string here")),
            Err(EngineError::InvalidPosition(_))
        ));
        assert_eq!(
            validate_fen(Some(chess::STARTING_FEN)).unwrap(),
            chess::STARTING_FEN
        );
    }

    #[tokio::test]
    async fn test_missing_position_is_reported_before_spawning() {
        let bridge = StockfishBridge::new(Some(PathBuf::from("/nonexistent/stockfish")), 1);
        let err = bridge
            .compute_move(None, Difficulty::Medium)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::MissingPosition));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_unavailable_engine() {
        let bridge = StockfishBridge::new(Some(PathBuf::from("/nonexistent/stockfish")), 1);
        let err = bridge
            .compute_move(Some(chess::STARTING_FEN), Difficulty::Hard)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Unavailable(_)));
        assert!(!err.is_client_error());
    }

    /// Needs a Stockfish binary on the host.
    #[tokio::test]
    #[ignore]
    async fn test_hard_move_is_legal() {
        let bridge = StockfishBridge::new(None, 1);
        let fen = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3";
        let mv = bridge
            .compute_move(Some(fen), Difficulty::Hard)
            .await
            .unwrap();
        let mut game = chess::Game::from_fen(fen).unwrap();
        assert!(game.make_uci_move(&mv).is_ok(), "{} is not legal", mv);
    }

    /// Needs a Stockfish binary on the host.
    #[tokio::test]
    #[ignore]
    async fn test_checkmated_position_has_no_move() {
        let bridge = StockfishBridge::new(None, 1);
        let mated = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
        let err = bridge
            .compute_move(Some(mated), Difficulty::Easy)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NoMoveFound));
    }
}
