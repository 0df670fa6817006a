//! Public API handlers

use std::collections::BTreeMap;

use axum::extract::Query;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::core::model::{NewVote, Vote};
use crate::core::report;
use crate::error::ApiError;
use crate::store::STORE;

fn active_snapshot() -> Vec<Vote> {
    STORE
        .snapshot()
        .into_iter()
        .filter(|v| v.is_active)
        .collect()
}

/// GET /ping - Health check
pub async fn ping_handler() -> impl IntoResponse {
    "pong"
}

/// POST /vote - Validate and record a new vote
pub async fn add_vote_handler(
    Json(payload): Json<NewVote>,
) -> Result<impl IntoResponse, ApiError> {
    let valid = payload.validate()?;
    let name = valid.name.clone();

    // The store admits the vote atomically: duplicate check, ID allocation
    // and persist happen under one write guard.
    let vote = STORE
        .add_vote(valid)?
        .ok_or(ApiError::DuplicateVote(name))?;

    tracing::info!("vote #{} recorded for {}", vote.id, vote.name);
    Ok(Json(vote))
}

/// GET /leaderboard - Winner + per-day rows, per-user summary, notes
pub async fn leaderboard_handler() -> impl IntoResponse {
    let active = active_snapshot();

    Json(json!({
        "by_day": report::summarize(&active),
        "by_user": report::user_votes(&active),
        "all_notes": report::collect_notes(&active),
    }))
}

#[derive(Debug, Deserialize)]
pub struct RecentParams {
    pub limit: Option<usize>,
}

/// GET /votes/recent - Most recent active votes, newest first
pub async fn recent_votes_handler(Query(params): Query<RecentParams>) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(10);

    let mut votes = active_snapshot();
    votes.sort_by(|a, b| recency_key(b).cmp(&recency_key(a)));
    votes.truncate(limit);

    Json(votes)
}

// Timestamps sort lexicographically in "%Y-%m-%d %H:%M:%S"; votes without
// one fall back to modified_at, then to the zero-padded id.
fn recency_key(vote: &Vote) -> String {
    if !vote.created_at.is_empty() && vote.created_at != "unknown" {
        vote.created_at.clone()
    } else if let Some(modified) = &vote.modified_at {
        modified.clone()
    } else {
        format!("{:020}", vote.id)
    }
}

/// GET /votes/stats - Raw per-day counts over active votes
pub async fn vote_stats_handler() -> impl IntoResponse {
    let mut stats: BTreeMap<&'static str, u64> = BTreeMap::new();
    for vote in &active_snapshot() {
        for day in &vote.days {
            *stats.entry(day.as_str()).or_insert(0) += 1;
        }
    }
    Json(stats)
}

/// GET /votes/stats/chart - Hourly activity as a text bar chart
pub async fn activity_chart_handler() -> impl IntoResponse {
    let active = active_snapshot();
    let stats = report::count_hourly_activity(&active);
    let chart = report::build_text_chart(&stats);

    Json(json!({
        "title": "Hourly Activity Heatmap",
        "chart": chart
    }))
}

/// GET /votes/notes - Non-empty notes of active votes
pub async fn notes_handler() -> impl IntoResponse {
    Json(report::collect_notes(&active_snapshot()))
}
