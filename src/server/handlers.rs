//! Request handlers for the `/api` routes
//!
//! Engine calls are synchronous and may hold the workspace lock for a whole
//! sync, so they run on the blocking pool. Only the device-flow poll stays on
//! the async side.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::core::credentials::{Credential, StoredCredential};
use crate::core::sync::SyncResult;
use crate::core::workspace::{GitInfo, Workspace};
use crate::error::{NotesError, Result};
use crate::github::auth::PollOutcome;
use crate::github::client::fill_identity_from_github;

use super::error::ApiError;
use super::AppState;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// Run an engine call on the blocking pool
async fn blocking<T, F>(workspace: &Arc<Workspace>, f: F) -> ApiResult<T>
where
    F: FnOnce(&Workspace) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let workspace = Arc::clone(workspace);
    tokio::task::spawn_blocking(move || f(&workspace))
        .await
        .map_err(|e| ApiError(NotesError::Io(std::io::Error::other(e.to_string()))))?
        .map_err(ApiError)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Note {
    pub filename: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub old_path: String,
    pub new_path: String,
}

#[derive(Debug, Default, Deserialize)]
struct SyncRequest {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
pub struct PollRequest {
    pub device_code: String,
}

#[derive(Debug, Deserialize)]
pub struct FileStatusQuery {
    pub path: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Notes
// ─────────────────────────────────────────────────────────────────────────────

pub async fn list_notes(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let notes = blocking(&state.workspace, |ws| ws.list_notes()).await?;
    Ok(Json(notes))
}

pub async fn save_note(
    State(state): State<AppState>,
    Json(note): Json<Note>,
) -> ApiResult<Json<Value>> {
    let written = blocking(&state.workspace, move |ws| {
        ws.write_note(&note.filename, &note.content)
    })
    .await?;
    Ok(Json(json!({ "filename": written })))
}

pub async fn read_note(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<Json<Note>> {
    let filename = path.clone();
    let content = blocking(&state.workspace, move |ws| ws.read_note(&path)).await?;
    Ok(Json(Note { filename, content }))
}

pub async fn delete_note(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> ApiResult<StatusCode> {
    blocking(&state.workspace, move |ws| ws.delete_note(&path)).await?;
    Ok(StatusCode::OK)
}

pub async fn move_note(
    State(state): State<AppState>,
    Json(request): Json<MoveRequest>,
) -> ApiResult<StatusCode> {
    blocking(&state.workspace, move |ws| {
        ws.move_note(&request.old_path, &request.new_path)
    })
    .await?;
    Ok(StatusCode::OK)
}

// ─────────────────────────────────────────────────────────────────────────────
// Sync and configuration
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /sync`; the body is optional and anything unparseable means no message
pub async fn sync(State(state): State<AppState>, body: Bytes) -> ApiResult<Json<Value>> {
    let request: SyncRequest = serde_json::from_slice(&body).unwrap_or_default();

    let workspace = Arc::clone(&state.workspace);
    let outcome = tokio::task::spawn_blocking(move || workspace.sync(&request.message))
        .await
        .map_err(|e| ApiError(NotesError::Io(std::io::Error::other(e.to_string()))))?;

    let result = SyncResult::from(&outcome);
    info!(status = ?result.status, "sync finished");
    let report = outcome?;
    Ok(Json(json!({
        "status": result.status,
        "message": report.commit_message,
    })))
}

pub async fn get_config(State(state): State<AppState>) -> ApiResult<Json<StoredCredential>> {
    let masked = blocking(&state.workspace, |ws| Ok(ws.masked_credential())).await?;
    Ok(Json(masked))
}

/// `POST /config`; an empty or masked token keeps the one already stored
pub async fn post_config(
    State(state): State<AppState>,
    Json(body): Json<StoredCredential>,
) -> ApiResult<Json<Value>> {
    let report = blocking(&state.workspace, move |ws| {
        ws.configure(Credential::from(body))
    })
    .await?;

    info!(
        initialized = report.initialized,
        pulled = report.initial_pull_error.is_none(),
        "remote configured over HTTP"
    );
    Ok(Json(json!({ "status": "configured" })))
}

// ─────────────────────────────────────────────────────────────────────────────
// Device flow
// ─────────────────────────────────────────────────────────────────────────────

/// Start the device flow; the provider's JSON goes back unchanged
pub async fn auth_start(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let started = state.device_flow.start_session().await?;
    info!(user_code = %started.session.user_code, "device flow started");
    Ok(Json(started.raw))
}

/// Single poll; the provider's JSON goes back to the caller unchanged
pub async fn auth_poll(
    State(state): State<AppState>,
    Json(request): Json<PollRequest>,
) -> ApiResult<Json<Value>> {
    let poll = state
        .device_flow
        .poll_and_store(&state.workspace, &request.device_code)
        .await?;

    if let PollOutcome::Token(token) = &poll.outcome {
        let workspace = Arc::clone(&state.workspace);
        let token: SecretString = token.clone();
        tokio::spawn(async move {
            fill_identity_from_github(&workspace, &token).await;
        });
    }

    Ok(Json(poll.raw))
}

// ─────────────────────────────────────────────────────────────────────────────
// Git introspection
// ─────────────────────────────────────────────────────────────────────────────

pub async fn git_info(State(state): State<AppState>) -> ApiResult<Json<GitInfo>> {
    let info = blocking(&state.workspace, |ws| ws.git_info()).await?;
    Ok(Json(info))
}

pub async fn file_status(
    State(state): State<AppState>,
    Query(query): Query<FileStatusQuery>,
) -> ApiResult<Json<Value>> {
    let tracked = blocking(&state.workspace, move |ws| ws.is_tracked(&query.path)).await?;
    Ok(Json(json!({ "tracked": tracked })))
}
