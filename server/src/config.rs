//! Configuration for the chess web server
//!
//! Every setting can come from a command-line flag or from its environment
//! variable, with the flag taking precedence:
//! 1. `--bind` / `CHESS_WEB_BIND`
//! 2. `--static-dir` / `CHESS_WEB_STATIC_DIR`
//! 3. `--engine-path` / `CHESS_WEB_ENGINE_PATH`
//! 4. `--dev-origin` / `CHESS_WEB_DEV_ORIGIN`
//! 5. `--max-engines` / `CHESS_WEB_MAX_ENGINES`
//! 6. `--secret` / `CHESS_WEB_SECRET` (required)

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use axum::http::HeaderValue;
use clap::Parser;

const DEFAULT_BIND: &str = "127.0.0.1:5000";
const DEFAULT_STATIC_DIR: &str = "build";
const DEFAULT_DEV_ORIGIN: &str = "http://localhost:3000";
const DEFAULT_MAX_ENGINES: usize = 4;

/// Shortest secret accepted for signing session cookies.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "chess-web-server",
    version,
    about = "Serves the chess web client and answers move and engine requests"
)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "CHESS_WEB_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Directory holding the built web client
    #[arg(long, env = "CHESS_WEB_STATIC_DIR", default_value = DEFAULT_STATIC_DIR)]
    pub static_dir: PathBuf,

    /// Stockfish executable (searched in common locations when unset)
    #[arg(long, env = "CHESS_WEB_ENGINE_PATH")]
    pub engine_path: Option<PathBuf>,

    /// Origin allowed to call /api/* cross-origin during development
    #[arg(long, env = "CHESS_WEB_DEV_ORIGIN", default_value = DEFAULT_DEV_ORIGIN)]
    pub dev_origin: HeaderValue,

    /// Maximum number of engine processes running at once
    #[arg(long, env = "CHESS_WEB_MAX_ENGINES", default_value_t = DEFAULT_MAX_ENGINES)]
    pub max_engines: usize,

    /// Key used to sign the game cookie
    #[arg(long, env = "CHESS_WEB_SECRET", hide_env_values = true)]
    pub secret: SessionSecret,
}

/// Signing key for session cookies. Never printed.
#[derive(Clone)]
pub struct SessionSecret(String);

impl SessionSecret {
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for SessionSecret {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort {
                len: s.len(),
                min: MIN_SECRET_LEN,
            });
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret(..)")
    }
}

impl ServerConfig {
    /// Startup checks that don't prevent serving but usually mean a
    /// misconfigured deployment.
    pub fn warn_on_suspicious_settings(&self) {
        let index = self.static_dir.join("index.html");
        if !index.is_file() {
            tracing::warn!(
                "No index.html in {}, page requests will fail",
                self.static_dir.display()
            );
        }
        if engine::resolve_stockfish_path(self.engine_path.as_deref()).is_none() {
            tracing::warn!("Stockfish not found, engine moves will fail until it is installed");
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("session secret is {len} bytes, need at least {min}")]
    SecretTooShort { len: usize, min: usize },
}
