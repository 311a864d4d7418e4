//! Editor state machine.
//!
//! The workflow is either browsing a selected revision or confirming the
//! deletion of one (`EditorState::pending_delete_revision`). Every request
//! is turned into one [`EditCommand`] and applied to the state the actor's
//! session carried in; the result is either a view to render together with
//! the next state, or a redirect back to the read path.

use log::{info, warn};

use crate::errors::WikiError;
use crate::services::{MarkdownService, RevisionStore};
use crate::types::{EditSubmission, EditView, EditorState, RevisionId};

/// Body shown when a page has no content yet
pub const DRAFT_BODY: &str = "Write your content here";

/// Placeholder editor text for `title`
pub fn draft_content(title: &str) -> String {
    format!("# {}\n\n{}", title, DRAFT_BODY)
}

/// One editor interaction, decoded from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Fresh entry: show the latest revision
    Enter,
    Save { content: String },
    Preview { content: String },
    Cancel,
    /// Raw revision identifier picked in the history list
    Select { revision: String },
    RequestDelete { content: Option<String> },
    AbortDelete { content: Option<String> },
    ConfirmDelete,
}

impl EditCommand {
    /// Decode a form submission. Several fields may be present at once; the
    /// first match in save, preview, cancel, revision pick, delete, del_no,
    /// del_yes wins.
    pub fn from_submission(form: EditSubmission) -> Self {
        let action = form.action.as_deref().unwrap_or_default();
        let revision = form.revision.filter(|r| !r.trim().is_empty());

        match action {
            "save" => return EditCommand::Save { content: form.content.unwrap_or_default() },
            "preview" => return EditCommand::Preview { content: form.content.unwrap_or_default() },
            "cancel" => return EditCommand::Cancel,
            _ => {}
        }
        if let Some(revision) = revision {
            return EditCommand::Select { revision };
        }
        match action {
            "delete" => EditCommand::RequestDelete { content: form.content },
            "del_no" => EditCommand::AbortDelete { content: form.content },
            "del_yes" => EditCommand::ConfirmDelete,
            _ => EditCommand::Enter,
        }
    }
}

/// Result of applying a command
#[derive(Debug, Clone)]
pub enum EditOutcome {
    Render { state: EditorState, view: EditView },
    /// Leave the editor and go to the read path of the page
    Redirect { title: String },
}

/// Editor workflow for one page
pub struct EditWorkflow<'a> {
    store: &'a RevisionStore,
    markdown: &'a MarkdownService,
    title: &'a str,
}

impl<'a> EditWorkflow<'a> {
    pub fn new(store: &'a RevisionStore, markdown: &'a MarkdownService, title: &'a str) -> Self {
        Self { store, markdown, title }
    }

    /// Apply `command` to the state carried by the session. Without a carried
    /// state the latest revision is taken as the selection.
    pub fn handle(&self, state: Option<EditorState>, command: EditCommand) -> Result<EditOutcome, WikiError> {
        let state = match state {
            Some(state) => state,
            None => EditorState::browsing(self.store.latest(self.title)?),
        };

        match command {
            EditCommand::Enter => self.browse_latest(),
            EditCommand::Save { content } => {
                let id = self.store.write(self.title, &content)?;
                info!("Saved '{}' as revision {}", self.title, id);
                Ok(self.redirect())
            }
            EditCommand::Preview { content } => {
                self.show(EditorState::browsing(state.selection), content)
            }
            EditCommand::Cancel => Ok(self.redirect()),
            EditCommand::Select { revision } => self.select(&revision),
            EditCommand::RequestDelete { content } => self.request_delete(state, content),
            EditCommand::AbortDelete { content } => {
                self.show_selection(EditorState::browsing(state.selection), content)
            }
            EditCommand::ConfirmDelete => self.confirm_delete(state),
        }
    }

    fn select(&self, raw: &str) -> Result<EditOutcome, WikiError> {
        let Ok(id) = raw.parse::<RevisionId>() else {
            warn!("Ignoring malformed revision {:?} for '{}'", raw, self.title);
            return self.empty_draft();
        };
        match self.load(&id)? {
            Some(content) => self.show(EditorState::browsing(Some(id)), with_draft(self.title, content)),
            None => self.empty_draft(),
        }
    }

    fn request_delete(&self, state: EditorState, content: Option<String>) -> Result<EditOutcome, WikiError> {
        let Some(target) = state.selection else {
            return self.show_selection(EditorState::browsing(None), content);
        };
        let next = EditorState { selection: Some(target), pending_delete_revision: Some(target) };
        self.show_selection(next, content)
    }

    fn confirm_delete(&self, state: EditorState) -> Result<EditOutcome, WikiError> {
        let Some(target) = state.pending_delete_revision else {
            return self.show_selection(EditorState::browsing(state.selection), None);
        };

        match self.store.delete(self.title, &target) {
            Ok(()) => info!("Revision {} of '{}' was deleted", target, self.title),
            Err(WikiError::NotFound) => {
                warn!("Revision {} of '{}' vanished before deletion", target, self.title);
                return self.empty_draft();
            }
            Err(e) => return Err(e),
        }

        if !self.store.exists(self.title)? {
            return Ok(self.redirect());
        }
        self.browse_latest()
    }

    /// Select the newest revision, or fall back to the draft
    fn browse_latest(&self) -> Result<EditOutcome, WikiError> {
        match self.store.latest(self.title)? {
            Some(id) => self.show_selection(EditorState::browsing(Some(id)), None),
            None => self.empty_draft(),
        }
    }

    /// Show `content` if the form carried any, otherwise the selected revision
    fn show_selection(&self, state: EditorState, content: Option<String>) -> Result<EditOutcome, WikiError> {
        if let Some(content) = content {
            return self.show(state, content);
        }
        let Some(id) = state.selection else {
            return self.empty_draft();
        };
        match self.load(&id)? {
            Some(stored) => self.show(state, with_draft(self.title, stored)),
            None => self.empty_draft(),
        }
    }

    fn empty_draft(&self) -> Result<EditOutcome, WikiError> {
        self.show(EditorState::browsing(None), draft_content(self.title))
    }

    fn show(&self, state: EditorState, content: String) -> Result<EditOutcome, WikiError> {
        let revisions = self.store.list_revisions(self.title)?;
        let view = EditView {
            title: self.title.to_string(),
            preview_content: self.markdown.render_sections(&content),
            content,
            revisions,
            selected_revision: state.selection,
            delete_enabled: state.selection.is_some() && !state.is_confirming_delete(),
            show_confirm_popup: state.is_confirming_delete(),
        };
        Ok(EditOutcome::Render { state, view })
    }

    /// Content of `id`, `None` when it disappeared from the store
    fn load(&self, id: &RevisionId) -> Result<Option<String>, WikiError> {
        match self.store.read(self.title, id) {
            Ok(content) => Ok(Some(content)),
            Err(WikiError::NotFound) => {
                warn!("Revision {} of '{}' not found, showing empty draft", id, self.title);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn redirect(&self) -> EditOutcome {
        EditOutcome::Redirect { title: self.title.to_string() }
    }
}

/// Stored empty revisions are presented as the draft placeholder
fn with_draft(title: &str, content: String) -> String {
    if content.is_empty() { draft_content(title) } else { content }
}
