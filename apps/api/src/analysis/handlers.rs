//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Html,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::analysis::controller::{AnalysisController, SelectedFile, SessionSnapshot};
use crate::errors::AppError;
use crate::models::resume::AnalyzedRecord;
use crate::render::{build_render_tree, render_html, RenderTree};
use crate::state::AppState;

/// Name of the multipart field carrying the document.
const FILE_FIELD: &str = "file";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
    /// Present only while the session is displaying a record.
    pub render: Option<RenderTree>,
}

impl SessionView {
    fn new(session_id: Uuid, snapshot: SessionSnapshot) -> Self {
        let render = snapshot.displayable_record().map(build_render_tree);
        Self {
            session_id,
            snapshot,
            render,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub record: Arc<AnalyzedRecord>,
    pub render: RenderTree,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = state.sessions.create().await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let controller = session(&state, id).await?;
    Ok(Json(SessionView::new(id, controller.snapshot().await)))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// POST /api/v1/sessions/:id/file
///
/// Multipart upload. A request without a `file` field clears the selection.
/// Type errors are reported in the returned session, not as an HTTP error.
pub async fn handle_select_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    let controller = session(&state, id).await?;
    let file = read_file_field(multipart).await?;
    let snapshot = controller.on_file_selected(file).await;
    Ok(Json(SessionView::new(id, snapshot)))
}

/// POST /api/v1/sessions/:id/analyze
///
/// Runs extraction and analysis for the selected file. Failures are reported
/// in the returned session.
pub async fn handle_analyze_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let controller = session(&state, id).await?;
    let snapshot = controller.on_analyze_requested().await;
    Ok(Json(SessionView::new(id, snapshot)))
}

/// GET /api/v1/sessions/:id/view
///
/// HTML fragment of the analyzed record with staggered animation delays.
pub async fn handle_session_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let controller = session(&state, id).await?;
    let snapshot = controller.snapshot().await;
    let record = snapshot
        .displayable_record()
        .ok_or_else(|| AppError::NotFound(format!("Session {id} has no analysis to display")))?;
    Ok(Html(render_html(&build_render_tree(record))))
}

/// POST /api/v1/analyze
///
/// One-shot analysis of an uploaded PDF without creating a session.
pub async fn handle_analyze_once(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let file = read_file_field(multipart).await?;
    let controller = state.sessions.ephemeral();
    let snapshot = run_once(&controller, file).await;

    if let (Some(kind), Some(message)) = (snapshot.error_kind, snapshot.error.clone()) {
        return Err(AppError::from_failure(kind, message));
    }
    let record = snapshot
        .record
        .ok_or_else(|| AppError::UnprocessableEntity("Analysis produced no result".to_string()))?;
    let render = build_render_tree(&record);
    Ok(Json(AnalyzeResponse { record, render }))
}

async fn run_once(controller: &AnalysisController, file: Option<SelectedFile>) -> SessionSnapshot {
    let selected = controller.on_file_selected(file).await;
    if selected.error.is_some() {
        return selected;
    }
    controller.on_analyze_requested().await
}

async fn session(state: &AppState, id: Uuid) -> Result<Arc<AnalysisController>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

async fn read_file_field(mut multipart: Multipart) -> Result<Option<SelectedFile>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("upload").to_string();
        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        return Ok(Some(SelectedFile::new(name, media_type, bytes)));
    }
    Ok(None)
}
