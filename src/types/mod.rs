use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Deserialize;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::config::Config;
use crate::errors::WikiError;
use crate::services::{MarkdownService, RevisionStore, SessionStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: RevisionStore,
    pub markdown: MarkdownService,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, WikiError> {
        let store = RevisionStore::new(config.content_root.as_ref().clone(), config.utc_offset);
        Ok(Self {
            config: Arc::new(config),
            store,
            markdown: MarkdownService::new()?,
            sessions: SessionStore::new(),
        })
    }
}

const REVISION_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");

const REVISION_EXTENSION: &str = ".md";

/// Identity of one revision: its creation second, encoded in the file name
/// as `YYYY-MM-DD_HH-MM-SS.md`. Lexicographic order of the names equals
/// chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RevisionId(PrimitiveDateTime);

impl RevisionId {
    pub fn from_timestamp(at: PrimitiveDateTime) -> Self {
        Self(at.replace_nanosecond(0).unwrap_or(at))
    }

    /// Current wall-clock second in the given offset
    pub fn now(offset: UtcOffset) -> Self {
        let now = OffsetDateTime::now_utc().to_offset(offset);
        Self::from_timestamp(PrimitiveDateTime::new(now.date(), now.time()))
    }

    pub fn timestamp(&self) -> PrimitiveDateTime {
        self.0
    }

    pub fn file_name(&self) -> String {
        format!("{}{}", self, REVISION_EXTENSION)
    }

    /// Parse a directory entry name; `None` for anything that is not a revision file
    pub fn from_file_name(name: &str) -> Option<Self> {
        name.strip_suffix(REVISION_EXTENSION)?.parse().ok()
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.0.format(REVISION_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&label)
    }
}

impl FromStr for RevisionId {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveDateTime::parse(s, REVISION_FORMAT).map(Self)
    }
}

/// Per-session editor state for one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    pub selection: Option<RevisionId>,
    pub pending_delete_revision: Option<RevisionId>,
}

impl EditorState {
    pub fn browsing(selection: Option<RevisionId>) -> Self {
        Self { selection, pending_delete_revision: None }
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.pending_delete_revision.is_some()
    }
}

/// Rendered page for the anonymous read path
#[derive(Debug, Clone)]
pub struct ReadView {
    pub title: String,
    pub content: String,
    pub last_modified: RevisionId,
}

/// Everything the editor template needs
#[derive(Debug, Clone)]
pub struct EditView {
    pub title: String,
    pub content: String,
    pub preview_content: String,
    pub revisions: Vec<RevisionId>,
    pub selected_revision: Option<RevisionId>,
    pub delete_enabled: bool,
    pub show_confirm_popup: bool,
}

/// Query string of a GET request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewQuery {
    pub edit: Option<String>,
}

impl ViewQuery {
    pub fn wants_editor(&self) -> bool {
        self.edit.as_deref() == Some("true")
    }
}

/// Raw editor form submission; several fields may be present at once
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditSubmission {
    pub content: Option<String>,
    pub action: Option<String>,
    pub revision: Option<String>,
}
