//! Analysis controller. Owns one session's state and drives the
//! validate → extract → analyze pipeline.
//!
//! State transitions:
//!
//! ```text
//! Idle ──analyze──▶ Validating ──▶ Extracting ──▶ Analyzing ──▶ Displaying
//!   ▲                    │              │              │
//!   └──file selected─────┴──────────────┴──────────────┴──────▶ Failed
//! ```
//!
//! Every analyze run captures a generation number. Selecting a file or
//! starting another run bumps the generation, and a run only writes its outcome
//! back if its generation is still current. The lock is never held while the
//! extractor or analyzer is awaited.
//!
//! A run dropped before it commits (client gone) returns the session to `Idle`.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::analysis::analyzer::ResumeAnalyzer;
use crate::analysis::extractor::{ExtractError, TextExtractor};
use crate::llm_client::LlmError;
use crate::models::resume::AnalyzedRecord;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

pub const NO_FILE_MESSAGE: &str = "Please select a PDF file to analyze.";
pub const INVALID_TYPE_MESSAGE: &str = "Invalid file type. Please upload a PDF file.";
pub const EMPTY_CONTENT_MESSAGE: &str =
    "Could not extract text from the PDF, or the PDF is empty. Please try another file.";

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// An uploaded document together with the media type the client declared.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub name: String,
    pub media_type: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Bytes) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Compares the essence of the declared type, ignoring parameters.
    pub fn is_pdf(&self) -> bool {
        self.media_type
            .split(';')
            .next()
            .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_MEDIA_TYPE))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Extracting,
    Analyzing,
    Displaying,
    Failed,
}

impl Phase {
    pub fn is_loading(self) -> bool {
        matches!(self, Phase::Validating | Phase::Extracting | Phase::Analyzing)
    }
}

/// Which part of the pipeline produced the current error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InputValidation,
    Extraction,
    EmptyContent,
    Configuration,
    InvalidCredential,
    Remote,
    Parse,
}

#[derive(Debug, Error)]
pub enum AnalysisFailure {
    #[error("{0}")]
    Extraction(#[from] ExtractError),

    #[error("{}", EMPTY_CONTENT_MESSAGE)]
    EmptyContent,

    #[error("{0}")]
    Analysis(#[from] LlmError),

    #[error("superseded by a newer request")]
    Superseded,
}

impl AnalysisFailure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisFailure::Superseded => ErrorKind::InputValidation,
            AnalysisFailure::Extraction(_) => ErrorKind::Extraction,
            AnalysisFailure::EmptyContent => ErrorKind::EmptyContent,
            AnalysisFailure::Analysis(LlmError::NotConfigured) => ErrorKind::Configuration,
            AnalysisFailure::Analysis(LlmError::InvalidApiKey(_)) => ErrorKind::InvalidCredential,
            AnalysisFailure::Analysis(LlmError::Parse { .. }) => ErrorKind::Parse,
            AnalysisFailure::Analysis(_) => ErrorKind::Remote,
        }
    }

    /// The single string shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisFailure::EmptyContent => EMPTY_CONTENT_MESSAGE.to_string(),
            AnalysisFailure::Superseded => self.to_string(),
            AnalysisFailure::Extraction(e) => format!("Analysis Error: {e}"),
            AnalysisFailure::Analysis(e) => {
                let detail = match e {
                    LlmError::NotConfigured => {
                        "Analysis service API key is not configured. Cannot analyze resume."
                            .to_string()
                    }
                    LlmError::InvalidApiKey(_) => {
                        "Invalid API key. Please check your configuration.".to_string()
                    }
                    LlmError::Parse { source, .. } => format!(
                        "Failed to parse API response as JSON: {source}. Raw response logged."
                    ),
                    other => format!("Failed to analyze resume. API error: {other}"),
                };
                format!("Analysis Error: {detail}")
            }
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    selected_file: Option<SelectedFile>,
    record: Option<Arc<AnalyzedRecord>>,
    phase: Phase,
    error: Option<(ErrorKind, String)>,
    display: bool,
    generation: u64,
    analyzed_at: Option<DateTime<Utc>>,
}

impl SessionState {
    fn fail(&mut self, kind: ErrorKind, message: String) {
        self.error = Some((kind, message));
        self.phase = Phase::Failed;
        self.display = false;
    }

    /// Ends a run that was dropped before committing. The selection is kept
    /// so the client can retry.
    fn abandon(&mut self, generation: u64) {
        if self.generation == generation && self.phase.is_loading() {
            info!("Analysis run {generation} abandoned in {:?}", self.phase);
            self.phase = Phase::Idle;
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            is_loading: self.phase.is_loading(),
            error: self.error.as_ref().map(|(_, msg)| msg.clone()),
            error_kind: self.error.as_ref().map(|(kind, _)| *kind),
            file_name: self.selected_file.as_ref().map(|f| f.name.clone()),
            can_analyze: !self.phase.is_loading()
                && self.selected_file.as_ref().is_some_and(SelectedFile::is_pdf),
            display: self.display,
            record: self.record.clone(),
            analyzed_at: self.analyzed_at,
        }
    }
}

/// Read-only view of a session at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub is_loading: bool,
    pub error: Option<String>,
    pub error_kind: Option<ErrorKind>,
    pub file_name: Option<String>,
    /// Whether an analyze request would start a run right now.
    pub can_analyze: bool,
    pub display: bool,
    pub record: Option<Arc<AnalyzedRecord>>,
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl SessionSnapshot {
    /// The record to show, if the session is in a displayable state.
    pub fn displayable_record(&self) -> Option<&AnalyzedRecord> {
        if self.display && !self.is_loading && self.error.is_none() {
            self.record.as_deref()
        } else {
            None
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

pub struct AnalysisController {
    state: Arc<RwLock<SessionState>>,
    extractor: Arc<dyn TextExtractor>,
    analyzer: Arc<dyn ResumeAnalyzer>,
    loading_grace: Duration,
}

impl AnalysisController {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        analyzer: Arc<dyn ResumeAnalyzer>,
        loading_grace: Duration,
    ) -> Self {
        Self {
            state: Arc::new(RwLock::new(SessionState::default())),
            extractor,
            analyzer,
            loading_grace,
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.snapshot()
    }

    /// Replaces the selection. A non-PDF file is rejected and not stored.
    pub async fn on_file_selected(&self, file: Option<SelectedFile>) -> SessionSnapshot {
        let mut state = self.state.write().await;
        state.generation += 1;
        state.record = None;
        state.error = None;
        state.display = false;
        state.analyzed_at = None;
        state.phase = Phase::Idle;

        match file {
            Some(file) if !file.is_pdf() => {
                debug!(
                    "Rejected upload '{}' with media type '{}'",
                    file.name, file.media_type
                );
                state.selected_file = None;
                state.fail(ErrorKind::InputValidation, INVALID_TYPE_MESSAGE.to_string());
            }
            file => state.selected_file = file,
        }

        state.snapshot()
    }

    /// Runs the full pipeline for the current selection and returns the
    /// state after this run settles (or after it was superseded).
    pub async fn on_analyze_requested(&self) -> SessionSnapshot {
        let (generation, file) = {
            let mut state = self.state.write().await;
            let file = match state.selected_file.clone() {
                None => {
                    state.fail(ErrorKind::InputValidation, NO_FILE_MESSAGE.to_string());
                    return state.snapshot();
                }
                Some(file) if !file.is_pdf() => {
                    state.fail(ErrorKind::InputValidation, INVALID_TYPE_MESSAGE.to_string());
                    return state.snapshot();
                }
                Some(file) => file,
            };
            state.generation += 1;
            state.phase = Phase::Validating;
            state.error = None;
            state.record = None;
            state.display = false;
            state.analyzed_at = None;
            (state.generation, file)
        };

        let guard = RunGuard {
            state: self.state.clone(),
            generation,
            armed: true,
        };
        let outcome = self.run(generation, file).await;
        let snapshot = self.commit(generation, outcome).await;
        guard.disarm();
        snapshot
    }

    async fn run(
        &self,
        generation: u64,
        file: SelectedFile,
    ) -> Result<AnalyzedRecord, AnalysisFailure> {
        if !self.loading_grace.is_zero() {
            tokio::time::sleep(self.loading_grace).await;
        }

        self.advance(generation, Phase::Extracting).await?;
        let text = self.extractor.extract(file.bytes).await?;
        if text.trim().is_empty() {
            return Err(AnalysisFailure::EmptyContent);
        }

        self.advance(generation, Phase::Analyzing).await?;
        Ok(self.analyzer.analyze(&text).await?)
    }

    async fn advance(&self, generation: u64, phase: Phase) -> Result<(), AnalysisFailure> {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return Err(AnalysisFailure::Superseded);
        }
        debug!("Analysis run {generation}: {:?} -> {:?}", state.phase, phase);
        state.phase = phase;
        Ok(())
    }

    async fn commit(
        &self,
        generation: u64,
        outcome: Result<AnalyzedRecord, AnalysisFailure>,
    ) -> SessionSnapshot {
        let mut state = self.state.write().await;
        if state.generation != generation {
            info!(
                "Analysis run {generation} superseded by run {}; discarding its outcome",
                state.generation
            );
            return state.snapshot();
        }

        match outcome {
            Ok(record) => {
                state.record = Some(Arc::new(record));
                state.display = true;
                state.phase = Phase::Displaying;
                state.analyzed_at = Some(Utc::now());
                info!("Analysis run {generation} completed");
            }
            Err(AnalysisFailure::Superseded) => {}
            Err(failure) => {
                warn!("Analysis run {generation} failed: {failure}");
                state.fail(failure.kind(), failure.user_message());
            }
        }
        state.snapshot()
    }
}

/// Leaves the loading phases if the analyze future is dropped mid-run,
/// e.g. when the requesting client disconnects.
struct RunGuard {
    state: Arc<RwLock<SessionState>>,
    generation: u64,
    armed: bool,
}

impl RunGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let generation = self.generation;
        match self.state.try_write() {
            Ok(mut state) => state.abandon(generation),
            Err(_) => {
                // Someone else holds the lock; finish the reset on the runtime.
                if let Ok(handle) = tokio::runtime::Handle::try_current() {
                    let state = self.state.clone();
                    handle.spawn(async move { state.write().await.abandon(generation) });
                }
            }
        }
    }
}
