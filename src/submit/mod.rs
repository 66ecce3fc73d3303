//! Submission Flow: validates input, posts it to `/classify` and drives the
//! view through the submission lifecycle.
//!
//! ```text
//! Idle -> Submitting -> Success -> Idle
//!                    \-> Failure -> Idle
//! ```
//!
//! Input that fails validation goes straight to `Failure` without a request.
//! There is no guard against overlapping submissions: a caller sharing one
//! store between flows may interleave appends.

use std::fs;
use std::path::Path;

use chrono::Utc;

use crate::api::multipart::content_type_for;
use crate::api::{ApiClient, MultipartForm};
use crate::context::AppContext;
use crate::error::{ClientError, ClientResult};
use crate::logging::{ActivityEvent, ActivityLog};
use crate::model::{ClassificationRecord, ClassifyResponse, ClassifyResult};
use crate::store::HistoryStore;

/// Multipart field carrying pasted text.
pub const TEXT_FIELD: &str = "email_text";

/// Multipart field repeated once per uploaded file.
pub const FILES_FIELD: &str = "files[]";

// ---------------------------------------------------------------------------
// View contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Submitting,
    Success,
    Failure,
}

/// What the flow needs from whoever displays it (web page, terminal, test).
pub trait SubmissionView {
    fn hide_results(&mut self);
    fn clear_error(&mut self);
    fn show_loading(&mut self);
    fn hide_loading(&mut self);
    fn show_error(&mut self, message: &str);
    fn show_results(&mut self, results: &[ClassifyResult]);
    fn show_history(&mut self, records: &[ClassificationRecord]);

    /// Called on every state transition.
    fn on_state(&mut self, _state: FlowState) {}
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        Self {
            content_type: content_type_for(&filename).to_string(),
            filename,
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> ClientResult<Self> {
        let bytes = fs::read(path).map_err(|source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(filename, bytes))
    }
}

/// Validated submission content: either pasted text or at least one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionInput {
    Text(String),
    Files(Vec<Upload>),
}

impl SubmissionInput {
    /// Non-empty text wins over files; neither is a validation error.
    pub fn from_parts(text: Option<&str>, files: Vec<Upload>) -> ClientResult<Self> {
        if let Some(text) = text
            && !text.is_empty()
        {
            return Ok(Self::Text(text.to_string()));
        }
        if !files.is_empty() {
            return Ok(Self::Files(files));
        }
        Err(ClientError::missing_input())
    }

    /// Like [`from_parts`](Self::from_parts), reading the files from disk.
    /// Files are not read when text is present.
    pub fn from_cli<P: AsRef<Path>>(text: Option<&str>, paths: &[P]) -> ClientResult<Self> {
        if text.is_some_and(|t| !t.is_empty()) {
            return Self::from_parts(text, Vec::new());
        }
        let files = paths
            .iter()
            .map(|p| Upload::from_path(p.as_ref()))
            .collect::<ClientResult<Vec<_>>>()?;
        Self::from_parts(None, files)
    }

    pub fn to_form(&self) -> MultipartForm {
        let mut form = MultipartForm::new();
        match self {
            Self::Text(text) => {
                form.text(TEXT_FIELD, text);
            }
            Self::Files(files) => {
                for file in files {
                    form.file(FILES_FIELD, &file.filename, &file.content_type, &file.bytes);
                }
            }
        }
        form
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Files(_) => None,
        }
    }

    /// `"text"` or `"files"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Files(_) => "files",
        }
    }
}

// ---------------------------------------------------------------------------
// Flow
// ---------------------------------------------------------------------------

pub struct SubmissionFlow<'a, V: SubmissionView> {
    client: &'a ApiClient,
    store: &'a dyn HistoryStore,
    view: V,
    state: FlowState,
    activity: Option<ActivityLog>,
}

impl<'a, V: SubmissionView> SubmissionFlow<'a, V> {
    pub fn new(
        ctx: &AppContext,
        client: &'a ApiClient,
        store: &'a dyn HistoryStore,
        view: V,
    ) -> Self {
        Self {
            client,
            store,
            view,
            state: FlowState::Idle,
            activity: ActivityLog::from_config(&ctx.config),
        }
    }

    /// Override where submissions are recorded (`None` disables it).
    pub fn with_activity_log(mut self, activity: Option<ActivityLog>) -> Self {
        self.activity = activity;
        self
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }

    /// Validate raw input and submit it.
    pub fn submit(
        &mut self,
        text: Option<&str>,
        files: Vec<Upload>,
    ) -> ClientResult<ClassifyResponse> {
        self.submit_prepared(SubmissionInput::from_parts(text, files))
    }

    /// Submit input prepared elsewhere; a preparation error (validation,
    /// unreadable file) is reported like any other failure, without a request.
    pub fn submit_prepared(
        &mut self,
        prepared: ClientResult<SubmissionInput>,
    ) -> ClientResult<ClassifyResponse> {
        match prepared {
            Ok(input) => self.submit_input(&input),
            Err(e) => {
                self.fail("none", &e);
                Err(e)
            }
        }
    }

    /// Submit already-validated input.
    pub fn submit_input(&mut self, input: &SubmissionInput) -> ClientResult<ClassifyResponse> {
        self.transition(FlowState::Submitting);
        self.view.hide_results();
        self.view.clear_error();
        self.view.show_loading();

        let outcome = self.client.classify(&input.to_form());
        self.view.hide_loading();

        match outcome {
            Ok(response) => {
                self.succeed(input, &response);
                Ok(response)
            }
            Err(e) => {
                self.fail(input.kind(), &e);
                Err(e)
            }
        }
    }

    fn succeed(&mut self, input: &SubmissionInput, response: &ClassifyResponse) {
        self.transition(FlowState::Success);
        log::info!("classified {} item(s)", response.items().len());

        if let Some(result) = response.single_success() {
            let record = ClassificationRecord::from_submission(result, input.text(), Utc::now());
            // The classification already succeeded; a failed local write only
            // costs the history entry.
            if let Err(e) = self.store.append(record) {
                log::warn!(
                    "failed to record classification in {} history: {e:#}",
                    self.store.kind()
                );
            }
        }

        self.view.show_results(response.items());

        // Reload strictly after the append so the new entry is visible.
        let history = self.store.load();
        self.view.show_history(&history);

        if let Some(activity) = &self.activity {
            activity.record(&ActivityEvent::success(input.kind(), response.items().len()));
        }
        self.transition(FlowState::Idle);
    }

    fn fail(&mut self, input_kind: &str, error: &ClientError) {
        self.transition(FlowState::Failure);
        log::warn!("submission failed ({}): {error}", error.kind());

        self.view.show_error(&error.to_string());

        if let Some(activity) = &self.activity {
            activity.record(&ActivityEvent::failure(input_kind, &error.to_string()));
        }
        self.transition(FlowState::Idle);
    }

    fn transition(&mut self, state: FlowState) {
        self.state = state;
        self.view.on_state(state);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
