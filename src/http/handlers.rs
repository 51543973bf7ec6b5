//! League API handlers

use super::auth::Admin;
use super::error::ApiError;
use super::HttpState;
use crate::types::{
    GameResult, Recap, ScheduledGame, ScoresStats, TeamName, TeamStanding, UploadSummary,
};
use crate::utils;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    /// Day to compute game statuses against; the server's local date if absent
    pub today: Option<NaiveDate>,
}

/// Raw CSV text posted by an admin
#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub content: String,
}

pub async fn schedule(
    State(state): State<HttpState>,
    Query(query): Query<ScheduleQuery>,
) -> ApiResult<Vec<ScheduledGame>> {
    let today = query.today.unwrap_or_else(utils::today);
    debug!("Schedule requested as of {}", today);
    Ok(Json(state.league.schedule(today).await?))
}

pub async fn teams(State(state): State<HttpState>) -> ApiResult<Vec<TeamName>> {
    Ok(Json(state.league.teams().await?))
}

pub async fn scores(State(state): State<HttpState>) -> ApiResult<Vec<GameResult>> {
    Ok(Json(state.league.scores().await?))
}

pub async fn scores_stats(State(state): State<HttpState>) -> ApiResult<ScoresStats> {
    Ok(Json(state.league.scores_stats().await?))
}

pub async fn standings(State(state): State<HttpState>) -> ApiResult<Vec<TeamStanding>> {
    Ok(Json(state.league.standings().await?))
}

pub async fn recaps(State(state): State<HttpState>) -> ApiResult<Vec<Recap>> {
    Ok(Json(state.league.recaps().await?))
}

pub async fn recap(
    State(state): State<HttpState>,
    Path(game_id): Path<String>,
) -> ApiResult<Recap> {
    Ok(Json(state.league.recap(&game_id).await?))
}

pub async fn upload_schedule(
    _admin: Admin,
    State(state): State<HttpState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> ApiResult<UploadSummary> {
    let Json(request) = payload?;
    info!("Schedule upload received ({} bytes)", request.content.len());
    Ok(Json(state.league.upload_schedule(&request.content).await?))
}

pub async fn upload_scores(
    _admin: Admin,
    State(state): State<HttpState>,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> ApiResult<UploadSummary> {
    let Json(request) = payload?;
    info!("Scores upload received ({} bytes)", request.content.len());
    Ok(Json(state.league.upload_scores(&request.content).await?))
}

pub async fn save_recap(
    _admin: Admin,
    State(state): State<HttpState>,
    payload: Result<Json<Recap>, JsonRejection>,
) -> ApiResult<Recap> {
    let Json(recap) = payload?;
    Ok(Json(state.league.save_recap(recap).await?))
}

pub async fn delete_recap(
    _admin: Admin,
    State(state): State<HttpState>,
    Path(game_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.league.delete_recap(&game_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
