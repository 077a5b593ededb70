//! Signed, cookie-safe encoding of a game.
//!
//! The cookie value is `<base64url(payload)>.<base64url(hmac)>` where the
//! payload is a small JSON document naming the start position and the moves
//! played from it. Decoding replays every move, so a cookie can only ever
//! describe a position reachable by legal play.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chess::{Game, StartPosition};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Name of the cookie carrying the game.
pub const GAME_COOKIE: &str = "game";

/// Most plies kept in the cookie. Older plies are folded into the start FEN.
pub const MAX_HISTORY_PLIES: usize = 256;

const PAYLOAD_VERSION: u8 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct SessionPayload {
    v: u8,
    #[serde(default)]
    start: Option<String>,
    moves: Vec<String>,
}

/// Encodes games into signed cookie values and back.
#[derive(Clone)]
pub struct SessionCodec {
    mac: HmacSha256,
}

impl SessionCodec {
    pub fn new(secret: &[u8]) -> Result<Self, CodecError> {
        let mac = HmacSha256::new_from_slice(secret).map_err(|_| CodecError::Key)?;
        Ok(Self { mac })
    }

    /// Decode a cookie value. No value at all means a fresh game.
    pub fn decode(&self, raw: Option<&str>) -> Result<Game, CodecError> {
        let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(Game::new());
        };

        let (body, tag) = raw.split_once('.').ok_or(CodecError::Malformed)?;
        let body = URL_SAFE_NO_PAD
            .decode(body)
            .map_err(|_| CodecError::Malformed)?;
        let tag = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| CodecError::Malformed)?;

        let mut mac = self.mac.clone();
        mac.update(&body);
        mac.verify_slice(&tag)
            .map_err(|_| CodecError::BadSignature)?;

        let payload: SessionPayload = serde_json::from_slice(&body)?;
        if payload.v != PAYLOAD_VERSION {
            return Err(CodecError::UnsupportedVersion(payload.v));
        }
        if payload.moves.len() > MAX_HISTORY_PLIES {
            return Err(CodecError::TooLong(payload.moves.len()));
        }

        let mut game = match payload.start.as_deref() {
            None => Game::new(),
            Some(fen) => {
                Game::from_fen(fen).map_err(|e| CodecError::InvalidStart(e.to_string()))?
            }
        };
        for (i, mv) in payload.moves.iter().enumerate() {
            game.make_uci_move(mv).map_err(|_| CodecError::IllegalMove {
                ply: i + 1,
                mv: mv.clone(),
            })?;
        }

        Ok(game)
    }

    /// Encode a game, keeping at most [`MAX_HISTORY_PLIES`] of its history.
    pub fn encode(&self, game: &Game) -> Result<String, CodecError> {
        let mut game = game.clone();
        game.trim_history(MAX_HISTORY_PLIES);

        let payload = SessionPayload {
            v: PAYLOAD_VERSION,
            start: match game.start_position() {
                StartPosition::Standard => None,
                StartPosition::Fen(fen) => Some(fen.clone()),
            },
            moves: game.history().iter().map(|e| e.uci.clone()).collect(),
        };
        let body = serde_json::to_vec(&payload)?;

        let mut mac = self.mac.clone();
        mac.update(&body);
        let tag = mac.finalize().into_bytes();

        Ok(format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&body),
            URL_SAFE_NO_PAD.encode(tag)
        ))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("signing key rejected")]
    Key,
    #[error("malformed cookie")]
    Malformed,
    #[error("signature mismatch")]
    BadSignature,
    #[error("unreadable payload: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("unsupported payload version {0}")]
    UnsupportedVersion(u8),
    #[error("history of {0} plies exceeds the limit")]
    TooLong(usize),
    #[error("invalid start position: {0}")]
    InvalidStart(String),
    #[error("illegal move {mv} at ply {ply}")]
    IllegalMove { ply: usize, mv: String },
}
