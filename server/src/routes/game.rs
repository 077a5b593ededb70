use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::api::{ApiResponse, MoveRequest};
use crate::codec::GAME_COOKIE;
use crate::state::AppState;

/// `POST /move`: apply a SAN move to the game in the cookie.
///
/// Always answers 200; failures are reported in the body.
pub(super) async fn make_move(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Result<Json<MoveRequest>, JsonRejection>,
) -> (CookieJar, Json<ApiResponse>) {
    let decoded = state
        .codec
        .decode(jar.get(GAME_COOKIE).map(|c| c.value()));
    let game = match decoded {
        Ok(game) => game,
        Err(e) => {
            tracing::warn!("Discarding corrupt game cookie: {}", e);
            return (
                jar.remove(removal_cookie()),
                Json(ApiResponse::error(format!("Corrupt game state: {}", e))),
            );
        }
    };

    let san = match body {
        Ok(Json(request)) => request.san,
        Err(rejection) => {
            tracing::debug!("Unreadable move request: {}", rejection.body_text());
            None
        }
    };
    let Some(san) = san.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()) else {
        return (jar, Json(ApiResponse::error("Invalid move: no move provided")));
    };

    let next = match game.apply_san(&san) {
        Ok(next) => next,
        Err(e) => {
            tracing::debug!(san = %san, "Rejected move: {}", e);
            return (jar, Json(ApiResponse::error(format!("Invalid move: {}", e))));
        }
    };

    match state.codec.encode(&next) {
        Ok(value) => {
            let fen = next.to_fen();
            tracing::info!(san = %san, fen = %fen, "Move applied");
            (jar.add(game_cookie(value)), Json(ApiResponse::board(fen)))
        }
        Err(e) => {
            tracing::error!("Failed to encode game: {}", e);
            (jar, Json(ApiResponse::error(format!("Could not save game: {}", e))))
        }
    }
}

/// `POST /new_game`: forget the game in the cookie.
pub(super) async fn new_game(jar: CookieJar) -> (CookieJar, Json<ApiResponse>) {
    tracing::info!("New game");
    (
        jar.remove(removal_cookie()),
        Json(ApiResponse::board(chess::STARTING_FEN)),
    )
}

fn game_cookie(value: String) -> Cookie<'static> {
    Cookie::build((GAME_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build(GAME_COOKIE).path("/").build()
}
