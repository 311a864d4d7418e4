use log::{debug, info};

use crate::errors::WikiError;
use crate::services::{MarkdownService, RevisionStore};
use crate::types::ReadView;

/// Anonymous read path: latest revision of a page, rendered
pub struct PageService<'a> {
    store: &'a RevisionStore,
    markdown: &'a MarkdownService,
}

impl<'a> PageService<'a> {
    pub fn new(store: &'a RevisionStore, markdown: &'a MarkdownService) -> Self {
        Self { store, markdown }
    }

    pub fn read(&self, title: &str) -> Result<ReadView, WikiError> {
        let Some(latest) = self.store.latest(title)? else {
            info!("Page '{}' has no revisions", title);
            return Err(WikiError::NotFound);
        };
        debug!("Serving revision {} of '{}'", latest, title);

        let raw = self.store.read(title, &latest)?;
        Ok(ReadView {
            title: title.to_string(),
            content: self.markdown.render_sections(&raw),
            last_modified: latest,
        })
    }
}
