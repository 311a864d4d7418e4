pub mod edit_workflow;
pub mod markdown_service;
pub mod page_service;
pub mod revision_store;
pub mod session_service;

pub use edit_workflow::{EditCommand, EditOutcome, EditWorkflow};
pub use markdown_service::MarkdownService;
pub use page_service::PageService;
pub use revision_store::RevisionStore;
pub use session_service::SessionStore;
