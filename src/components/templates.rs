use crate::types::{EditView, ReadView};
use crate::utils::{escape_attr, escape_html, page_href};

const NO_HISTORY: &str = "There is no version history.";

/// Component for handling HTML template rendering
pub struct TemplateComponent;

impl TemplateComponent {
    /// Create a new template component
    pub fn new() -> Self {
        Self
    }

    /// Wrap rendered body markup in the HTML shell
    pub fn render_shell(&self, title: &str, body: &str) -> String {
        format!(
            "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"><title>{}</title></head><body><main class=\"content\">{}</main></body></html>",
            escape_html(title),
            body
        )
    }

    /// Read view of a page
    pub fn render_page(&self, view: &ReadView) -> String {
        let href = page_href(&view.title);
        let body = format!(
            "<article class=\"page\">{}</article><footer class=\"meta\"><p>Last modified: {}</p><p><a href=\"{}?edit=true\">Edit</a></p></footer>",
            view.content,
            escape_html(&view.last_modified.to_string()),
            escape_attr(&href)
        );
        self.render_shell(&view.title, &body)
    }

    /// Staff editor with preview, history picker and delete confirmation
    pub fn render_editor(&self, view: &EditView) -> String {
        let action = escape_attr(&page_href(&view.title));
        let mut body = String::new();

        body.push_str(&format!("<h1 class=\"editor-title\">Editing {}</h1>", escape_html(&view.title)));

        // History picker posts on its own so the main form never carries a revision field
        body.push_str(&format!("<form class=\"history\" method=\"post\" action=\"{}\">", action));
        if view.revisions.is_empty() {
            body.push_str(&format!(
                "<select name=\"revision\" disabled><option disabled selected>{}</option></select><button type=\"submit\" disabled>Open</button>",
                escape_html(NO_HISTORY)
            ));
        } else {
            body.push_str("<select name=\"revision\">");
            for revision in &view.revisions {
                let label = revision.to_string();
                let selected = if view.selected_revision == Some(*revision) { " selected" } else { "" };
                body.push_str(&format!(
                    "<option value=\"{}\"{}>{}</option>",
                    escape_attr(&label),
                    selected,
                    escape_html(&label)
                ));
            }
            body.push_str("</select><button type=\"submit\">Open</button>");
        }
        body.push_str("</form>");

        body.push_str(&format!("<form class=\"editor\" method=\"post\" action=\"{}\">", action));
        body.push_str(&format!(
            "<textarea name=\"content\" rows=\"24\" cols=\"80\">{}</textarea>",
            escape_html(&view.content)
        ));
        body.push_str("<div class=\"editor-actions\">");
        body.push_str("<button type=\"submit\" name=\"action\" value=\"save\">Save</button>");
        body.push_str("<button type=\"submit\" name=\"action\" value=\"preview\">Preview</button>");
        body.push_str("<button type=\"submit\" name=\"action\" value=\"cancel\">Cancel</button>");
        body.push_str(&format!(
            "<button type=\"submit\" name=\"action\" value=\"delete\"{}>Delete revision</button>",
            if view.delete_enabled { "" } else { " disabled" }
        ));
        body.push_str("</div></form>");

        if view.show_confirm_popup {
            let target = view
                .selected_revision
                .map(|r| r.to_string())
                .unwrap_or_default();
            body.push_str(&format!(
                "<div class=\"confirm-popup\" role=\"dialog\"><p>Delete revision {}?</p><form method=\"post\" action=\"{}\"><button type=\"submit\" name=\"action\" value=\"del_yes\">Delete</button><button type=\"submit\" name=\"action\" value=\"del_no\">Keep</button></form></div>",
                escape_html(&target),
                action
            ));
        }

        body.push_str(&format!("<section class=\"preview\">{}</section>", view.preview_content));
        self.render_shell(&format!("Edit {}", view.title), &body)
    }

    pub fn render_not_found(&self) -> String {
        self.render_shell(
            "404 - Not Found",
            "<div class=\"error-page\"><h1 class=\"error-title\">Page not found</h1><p><a href=\"/\">Go Home</a></p></div>",
        )
    }
}

impl Default for TemplateComponent {
    fn default() -> Self {
        Self::new()
    }
}
