//! Palimpsest - a minimal wiki with file-based page revisions
//!
//! Pages are directories of timestamped Markdown revisions. Anyone can read
//! the latest revision; staff edit through a small state machine that
//! previews, switches between and deletes revisions.

pub mod components;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod services;
pub mod types;
pub mod utils;

#[cfg(test)]
mod tests;

use axum::{routing::get, Router};

// Re-export commonly used items
pub use config::Config;
pub use errors::WikiError;
pub use types::{AppState, EditView, EditorState, ReadView, RevisionId};
pub use services::{EditCommand, EditOutcome, EditWorkflow, MarkdownService, PageService, RevisionStore, SessionStore};
pub use components::TemplateComponent;

/// Routes: `/` serves the home page, every other path is a page title.
/// Both accept GET and POST.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::handle_root).post(handlers::submit_root))
        .route("/*path", get(handlers::handle_path).post(handlers::submit_path))
        .with_state(state)
}
