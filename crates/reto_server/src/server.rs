//! HTTP JSON API over a [`GameStore`].

use std::sync::Arc;

use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use derive_more::{Display, Error};
use futures::{Stream, StreamExt};
use reto_tictactoe::{GameSnapshot, Player};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::store::{GameStore, GameUpdate, LobbyEvent, StoreError, new_game_id};

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<dyn GameStore>,
}

/// Body of `POST /games/{id}/moves`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Mark being placed.
    pub player: Player,
    /// Cell index, 0-8.
    pub cell: usize,
}

/// Error returned by a handler.
#[derive(Debug, Display, Error)]
pub enum ApiError {
    /// The store rejected the call.
    Store(StoreError),
    /// The request contradicts the path.
    #[display("Bad request: {}", _0)]
    BadRequest(#[error(not(source))] String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::AlreadyExists(_) | StoreError::Unavailable(_)) => {
                StatusCode::CONFLICT
            }
            ApiError::Store(StoreError::InvalidMove(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(StoreError::Poisoned) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        warn!(%status, error = %self, "Request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Builds the API router.
pub fn router(store: Arc<dyn GameStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/games", get(list_games).post(create_game))
        .route(
            "/games/{id}",
            get(get_game).put(replace_game).delete(delete_game),
        )
        .route("/games/{id}/select", post(select_game))
        .route("/games/{id}/moves", post(play_move))
        .route("/games/{id}/events", get(game_events))
        .route("/lobby/events", get(lobby_events))
        .layer(middleware::from_fn(log_request))
        .with_state(AppState { store })
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    debug!(%method, %uri, "Incoming HTTP request");
    let response = next.run(req).await;
    info!(%method, %uri, status = %response.status(), "Response sent");
    response
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[instrument(skip(state))]
async fn list_games(State(state): State<AppState>) -> Result<Json<Vec<GameSnapshot>>, ApiError> {
    Ok(Json(state.store.list_available().await?))
}

#[instrument(skip(state))]
async fn create_game(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<GameSnapshot>), ApiError> {
    let first = if rand::random_bool(0.5) { Player::X } else { Player::O };
    let game = state
        .store
        .create_game(GameSnapshot::open(new_game_id(), first))
        .await?;
    Ok((StatusCode::CREATED, Json(game)))
}

#[instrument(skip(state))]
async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameSnapshot>, ApiError> {
    Ok(Json(state.store.get_game(&id).await?))
}

#[instrument(skip(state))]
async fn select_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameSnapshot>, ApiError> {
    Ok(Json(state.store.select_game(&id).await?))
}

#[instrument(skip(state))]
async fn play_move(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<GameSnapshot>, ApiError> {
    Ok(Json(
        state
            .store
            .play_move(&id, request.player, request.cell)
            .await?,
    ))
}

#[instrument(skip(state, snapshot))]
async fn replace_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(snapshot): Json<GameSnapshot>,
) -> Result<Json<GameSnapshot>, ApiError> {
    if snapshot.game_id() != id {
        return Err(ApiError::BadRequest(format!(
            "body game_id '{}' does not match path '{}'",
            snapshot.game_id(),
            id
        )));
    }
    state.store.submit_move(snapshot.clone()).await?;
    Ok(Json(snapshot))
}

#[instrument(skip(state))]
async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_game(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state))]
async fn game_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let subscription = state.store.observe(&id).await?;
    let events = subscription.into_stream().map(|update| {
        let name = match &update {
            GameUpdate::Snapshot(_) => "snapshot",
            GameUpdate::Deleted(_) => "deleted",
        };
        Event::default().event(name).json_data(&update)
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[instrument(skip(state))]
async fn lobby_events(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, ApiError> {
    let subscription = state.store.observe_available().await?;
    let events = subscription.into_stream().map(|event| {
        let name = match &event {
            LobbyEvent::Added(_) => "added",
            LobbyEvent::Removed(_) => "removed",
        };
        Event::default().event(name).json_data(&event)
    });
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
