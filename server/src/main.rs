use std::path::Path;

use axum::{
    extract::{Path as UrlPath, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tictactoe::{GameConfig, GameError, Position};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod session;

use config::ServerConfig;
use session::{lock, GameView, Session, SessionError, Sessions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = ServerConfig::from_env()?;
    let app = app_router(Sessions::with_limit(config.max_sessions), &config.static_dir);

    let listener = TcpListener::bind(config.addr).await?;
    info!("Listening on http://{}", config.addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn app_router(sessions: Sessions, static_dir: &Path) -> Router {
    let api = Router::new()
        .route("/games", post(create_game))
        .route("/games/:id", get(get_game).delete(delete_game))
        .route("/games/:id/move", post(human_move))
        .route("/games/:id/ai", post(ai_move))
        .route("/games/:id/restart", post(restart_game))
        .with_state(sessions);
    Router::new()
        .nest("/api", api)
        .fallback_service(ServeDir::new(static_dir).append_index_html_on_directories(true))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::DELETE])
                .allow_origin(axum::http::HeaderValue::from_static("*"))
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
}

async fn create_game(
    State(sessions): State<Sessions>,
    Json(config): Json<GameConfig>,
) -> Result<impl IntoResponse, ApiError> {
    let session = Session::start(config)?;
    let view = session.view(0);
    let id = sessions.insert(session)?;
    info!(id, size = view.state.board.len(), "game created");
    Ok(no_store(GameView { id, ..view }))
}

async fn get_game(
    State(sessions): State<Sessions>,
    UrlPath(id): UrlPath<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let session = sessions.get(id)?;
    let view = lock(&session)?.view(id);
    Ok(no_store(view))
}

async fn delete_game(
    State(sessions): State<Sessions>,
    UrlPath(id): UrlPath<u64>,
) -> Result<StatusCode, ApiError> {
    sessions.remove(id)?;
    info!(id, "game deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn human_move(
    State(sessions): State<Sessions>,
    UrlPath(id): UrlPath<u64>,
    Json(pos): Json<Position>,
) -> Result<impl IntoResponse, ApiError> {
    let session = sessions.get(id)?;
    let mut session = lock(&session)?;
    session.game_mut().play_human(pos)?;
    session.record_outcome();
    Ok(no_store(session.view(id)))
}

#[derive(Debug, Serialize)]
struct AiMoveView {
    position: Position,
    #[serde(flatten)]
    game: GameView,
}

/// The search is synchronous and may take a while on large boards, so it
/// runs on the blocking pool.
async fn ai_move(
    State(sessions): State<Sessions>,
    UrlPath(id): UrlPath<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let session = sessions.get(id)?;
    let view = tokio::task::spawn_blocking(move || -> Result<AiMoveView, ApiError> {
        let mut session = lock(&session)?;
        let (position, _) = session.game_mut().play_ai_turn()?;
        session.record_outcome();
        Ok(AiMoveView {
            position,
            game: session.view(id),
        })
    })
    .await??;
    Ok(no_store(view))
}

async fn restart_game(
    State(sessions): State<Sessions>,
    UrlPath(id): UrlPath<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let session = sessions.get(id)?;
    let mut session = lock(&session)?;
    session.restart()?;
    Ok(no_store(session.view(id)))
}

fn no_store<T: Serialize>(body: T) -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-store")], Json(body))
}

#[derive(Debug)]
struct ApiError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if let Some(err) = self.0.downcast_ref::<GameError>() {
            match err {
                GameError::InvalidConfig { .. } | GameError::OutOfBounds { .. } => {
                    StatusCode::BAD_REQUEST
                }
                GameError::CellOccupied { .. } | GameError::IllegalMove(_) => StatusCode::CONFLICT,
                GameError::SearchExhausted => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else if let Some(err) = self.0.downcast_ref::<SessionError>() {
            match err {
                SessionError::NotFound(_) => StatusCode::NOT_FOUND,
                SessionError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
            }
        } else {
            StatusCode::BAD_REQUEST
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = format!("{}", self.0);
        (status, body).into_response()
    }
}
