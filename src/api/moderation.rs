//! Moderation handlers: rename, deactivate, clear

use axum::extract::Path;
use axum::response::{IntoResponse, Json};
use serde_json::json;

use crate::error::ApiError;
use crate::store::STORE;

/// PUT /players/rename/:old_name/:new_name
pub async fn rename_player_handler(
    Path((old_name, new_name)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let changed = STORE.rename_player(&old_name, &new_name)?;
    if changed == 0 {
        return Err(ApiError::NotFound(format!("player {} not found", old_name)));
    }

    tracing::info!("renamed {} -> {} across {} votes", old_name, new_name, changed);
    Ok(Json(json!({
        "success": true,
        "message": format!("updated {} votes to {}", changed, new_name)
    })))
}

/// DELETE /players/deactivate/:vote_id
pub async fn deactivate_vote_handler(
    Path(vote_id): Path<u64>,
) -> Result<impl IntoResponse, ApiError> {
    if !STORE.deactivate(vote_id)? {
        return Err(ApiError::NotFound(format!("vote {} not found", vote_id)));
    }

    tracing::info!("vote #{} deactivated", vote_id);
    Ok(Json(json!({
        "success": true,
        "message": "vote deactivated"
    })))
}

/// DELETE /votes - Reset the whole system
pub async fn clear_votes_handler() -> Result<impl IntoResponse, ApiError> {
    STORE.clear()?;

    tracing::info!("all votes cleared");
    Ok(Json(json!({
        "success": true,
        "message": "all votes cleared"
    })))
}
