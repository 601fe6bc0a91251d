//! HTTP realization of the game service contract.
//!
//! Stateless request/response plumbing only: every function maps one
//! service route, translating transport and payload failures into
//! [`ServiceError`] kinds for the session controller to surface.

use gloo::net::http::{Request, RequestBuilder, Response};
use minefront_core::{Result, ServiceError};
use minefront_protocol::{
    BoardSnapshot, CompletionReport, DifficultyLevel, GameConfigurations, GameId, GameMove,
    LeaderboardEntry, NewGameResponse, UserStats,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

const API_BASE_URL: &str = "http://localhost:8000";

pub(crate) async fn create_game(difficulty: DifficultyLevel) -> Result<NewGameResponse> {
    let url = format!("{API_BASE_URL}/game/new/{difficulty}");
    expect_json(build(Request::post(&url))?).await
}

pub(crate) async fn submit_move(game_id: GameId, game_move: GameMove) -> Result<BoardSnapshot> {
    let url = format!("{API_BASE_URL}/game/{game_id}/move");
    expect_json(with_body(Request::post(&url), &game_move)?).await
}

pub(crate) async fn restart_game(game_id: GameId) -> Result<NewGameResponse> {
    let url = format!("{API_BASE_URL}/game/{game_id}/restart");
    expect_json(build(Request::post(&url))?).await
}

/// Fire-and-forget from the session's point of view; callers only log the
/// outcome. The ack body is not interesting.
pub(crate) async fn complete_game(game_id: GameId, report: &CompletionReport) -> Result<()> {
    let url = format!("{API_BASE_URL}/game/{game_id}/complete");
    send(with_body(Request::post(&url), report)?).await?;
    Ok(())
}

pub(crate) async fn leaderboard(difficulty: DifficultyLevel) -> Result<Vec<LeaderboardEntry>> {
    let url = format!("{API_BASE_URL}/leaderboard/{difficulty}");
    expect_json(build(Request::get(&url))?).await
}

pub(crate) async fn user_stats(user_name: &str) -> Result<UserStats> {
    let encoded = String::from(js_sys::encode_uri_component(user_name));
    let url = format!("{API_BASE_URL}/stats/{encoded}");
    expect_json(build(Request::get(&url))?).await
}

pub(crate) async fn game_config() -> Result<GameConfigurations> {
    let url = format!("{API_BASE_URL}/game/config");
    expect_json(build(Request::get(&url))?).await
}

fn build(builder: RequestBuilder) -> Result<Request> {
    builder.build().map_err(|err| {
        log::error!("could not build request: {:?}", err);
        ServiceError::InvalidResponseShape
    })
}

fn with_body<B: Serialize>(builder: RequestBuilder, body: &B) -> Result<Request> {
    builder.json(body).map_err(|err| {
        log::error!("could not encode request body: {:?}", err);
        ServiceError::InvalidResponseShape
    })
}

async fn send(request: Request) -> Result<Response> {
    let response = request.send().await.map_err(|err| {
        log::warn!("request failed: {:?}", err);
        ServiceError::ServiceUnavailable
    })?;

    if response.ok() {
        return Ok(response);
    }
    Err(match response.status() {
        404 => ServiceError::SessionNotFound,
        400 | 422 => ServiceError::InvalidMove,
        status => {
            log::warn!("service answered with status {}", status);
            ServiceError::ServiceUnavailable
        }
    })
}

async fn expect_json<T: DeserializeOwned>(request: Request) -> Result<T> {
    let response = send(request).await?;
    response.json().await.map_err(|err| {
        log::warn!("could not decode response body: {:?}", err);
        ServiceError::InvalidResponseShape
    })
}
