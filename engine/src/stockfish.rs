use crate::uci::{parse_uci_message, UciMessage};
use crate::{EngineCommand, EngineError, EngineEvent, GoParams};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin};
use tokio::sync::mpsc;

/// How long a freshly spawned engine gets to answer `uci` with `uciok`.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct StockfishEngine {
    process: Child,
    command_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

/// Configuration for a single engine process.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Explicit executable path. When unset, common install locations are searched.
    pub path: Option<PathBuf>,
    pub skill_level: Option<u8>,
}

impl StockfishEngine {
    /// Spawn a new Stockfish instance and complete the UCI handshake.
    #[tracing::instrument(level = "info", skip_all, fields(skill = ?config.skill_level))]
    pub async fn spawn_with_config(config: EngineConfig) -> Result<Self, EngineError> {
        let path = resolve_stockfish_path(config.path.as_deref()).ok_or_else(|| {
            EngineError::Unavailable(match &config.path {
                Some(p) => format!("no engine executable at {}", p.display()),
                None => "Stockfish not found".to_string(),
            })
        })?;
        tracing::debug!("Spawning Stockfish at {:?}", path);

        let mut process = tokio::process::Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                tracing::error!("Failed to spawn Stockfish: {}", e);
                EngineError::Unavailable(format!("failed to spawn {}: {}", path.display(), e))
            })?;

        let mut stdin = process
            .stdin
            .take()
            .ok_or_else(|| EngineError::Protocol("engine has no stdin".to_string()))?;
        let stdout = process
            .stdout
            .take()
            .ok_or_else(|| EngineError::Protocol("engine has no stdout".to_string()))?;

        write_line(&mut stdin, "uci").await?;

        let (command_tx, mut command_rx) = mpsc::channel::<EngineCommand>(32);
        let (event_tx, mut event_rx) = mpsc::channel::<EngineEvent>(32);

        // Output reader task
        let reader_tx = event_tx.clone();
        tokio::spawn(async move {
            let mut reader = BufReader::new(stdout);
            let mut line = String::new();

            loop {
                line.clear();
                match reader.read_line(&mut line).await {
                    Ok(0) => {
                        tracing::debug!("Stockfish stdout EOF - engine closed");
                        break;
                    }
                    Ok(_) => {
                        let trimmed = line.trim();
                        tracing::trace!("UCI << {}", trimmed);

                        let event = match parse_uci_message(trimmed) {
                            Ok(UciMessage::UciOk) | Ok(UciMessage::ReadyOk) => EngineEvent::Ready,
                            Ok(UciMessage::BestMove { mv: Some(mv), .. }) => {
                                tracing::debug!("Received bestmove: {:?}", mv);
                                EngineEvent::BestMove(mv)
                            }
                            Ok(UciMessage::BestMove { mv: None, .. }) => EngineEvent::NoMove,
                            Ok(UciMessage::Info(info)) => EngineEvent::Info(info),
                            Ok(UciMessage::Id { .. }) => continue,
                            Err(e) => {
                                tracing::trace!("Ignoring engine output: {}", e);
                                continue;
                            }
                        };

                        if reader_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!("Error reading from Stockfish stdout: {}", e);
                        let _ = reader_tx.send(EngineEvent::Error(e.to_string())).await;
                        break;
                    }
                }
            }
        });
        drop(event_tx);

        let handshake = tokio::time::timeout(HANDSHAKE_TIMEOUT, async {
            while let Some(event) = event_rx.recv().await {
                if matches!(event, EngineEvent::Ready) {
                    return Ok(());
                }
            }
            Err(EngineError::Unavailable(
                "engine closed before sending uciok".to_string(),
            ))
        })
        .await;

        match handshake {
            Ok(Ok(())) => tracing::debug!("Received uciok, engine ready"),
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                tracing::error!("Timeout waiting for uciok");
                return Err(EngineError::Unavailable(
                    "timeout waiting for engine to respond".to_string(),
                ));
            }
        }

        if let Some(level) = config.skill_level {
            write_line(&mut stdin, &format!("setoption name Skill Level value {}", level)).await?;
        }
        write_line(&mut stdin, "isready").await?;

        // Command processor task owns stdin from here on
        tokio::spawn(async move {
            while let Some(cmd) = command_rx.recv().await {
                let quit = matches!(cmd, EngineCommand::Quit);
                let line = format_command(&cmd);
                if let Err(e) = write_line(&mut stdin, &line).await {
                    tracing::error!("Failed to write to engine stdin: {}", e);
                    break;
                }
                if quit {
                    break;
                }
            }
        });

        tracing::info!(path = %path.display(), "Stockfish engine ready");
        Ok(Self {
            process,
            command_tx,
            event_rx,
        })
    }

    /// Send a command to the engine
    pub async fn send_command(&self, cmd: EngineCommand) -> Result<(), EngineError> {
        tracing::debug!("Queueing command: {:?}", cmd);
        self.command_tx
            .send(cmd)
            .await
            .map_err(|_| EngineError::Protocol("engine command channel closed".to_string()))
    }

    /// Receive an event from the engine. `None` once the engine has exited.
    pub async fn recv_event(&mut self) -> Option<EngineEvent> {
        self.event_rx.recv().await
    }

    /// Ask the engine to quit, then make sure the process is gone.
    pub async fn shutdown(mut self) {
        let _ = self.send_command(EngineCommand::Quit).await;
        if tokio::time::timeout(Duration::from_secs(1), self.process.wait())
            .await
            .is_err()
        {
            tracing::warn!("Stockfish did not exit after quit, killing it");
            let _ = self.process.kill().await;
        }
    }
}

/// Render a command as the UCI line that carries it.
fn format_command(cmd: &EngineCommand) -> String {
    match cmd {
        EngineCommand::SetPosition { fen } => format!("position fen {}", fen),
        EngineCommand::Go(params) => format_go(params),
        EngineCommand::Stop => "stop".to_string(),
        EngineCommand::Quit => "quit".to_string(),
    }
}

fn format_go(params: &GoParams) -> String {
    if params.infinite {
        return "go infinite".to_string();
    }
    let mut go_cmd = "go".to_string();
    if let Some(depth) = params.depth {
        go_cmd.push_str(&format!(" depth {}", depth));
    }
    if let Some(movetime) = params.movetime {
        go_cmd.push_str(&format!(" movetime {}", movetime));
    }
    if params.depth.is_none() && params.movetime.is_none() {
        go_cmd.push_str(" movetime 1000"); // Default 1 second
    }
    go_cmd
}

async fn write_line(stdin: &mut ChildStdin, line: &str) -> Result<(), EngineError> {
    tracing::trace!("UCI >> {}", line);
    stdin.write_all(line.as_bytes()).await?;
    stdin.write_all(b"\n").await?;
    stdin.flush().await?;
    Ok(())
}

/// Resolve the engine executable: an explicit path must exist, otherwise
/// common install locations and `PATH` are searched.
pub fn resolve_stockfish_path(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return path.is_file().then(|| path.to_path_buf());
    }

    let paths = [
        "/usr/local/bin/stockfish",
        "/usr/bin/stockfish",
        "/opt/homebrew/bin/stockfish",
        "/usr/games/stockfish",
    ];
    for path_str in paths {
        let path = Path::new(path_str);
        if path.is_file() {
            return Some(path.to_path_buf());
        }
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join("stockfish"))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_go_with_depth_and_movetime() {
        let params = GoParams {
            movetime: Some(2000),
            depth: Some(15),
            infinite: false,
        };
        assert_eq!(format_go(&params), "go depth 15 movetime 2000");
    }

    #[test]
    fn test_format_go_defaults_to_one_second() {
        assert_eq!(format_go(&GoParams::default()), "go movetime 1000");
    }

    #[test]
    fn test_format_go_infinite() {
        let params = GoParams {
            infinite: true,
            ..Default::default()
        };
        assert_eq!(format_go(&params), "go infinite");
    }

    #[test]
    fn test_format_position() {
        let cmd = EngineCommand::SetPosition {
            fen: chess::STARTING_FEN.to_string(),
        };
        assert_eq!(
            format_command(&cmd),
            format!("position fen {}", chess::STARTING_FEN)
        );
    }

    #[test]
    fn test_resolve_missing_configured_path() {
        let missing = Path::new("/definitely/not/here/stockfish");
        assert!(resolve_stockfish_path(Some(missing)).is_none());
    }

    #[tokio::test]
    async fn test_spawn_with_missing_binary_is_unavailable() {
        let config = EngineConfig {
            path: Some(PathBuf::from("/definitely/not/here/stockfish")),
            ..Default::default()
        };
        let result = StockfishEngine::spawn_with_config(config).await;
        assert!(matches!(result, Err(EngineError::Unavailable(_))));
    }
}
