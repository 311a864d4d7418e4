use pulldown_cmark::{html, Options, Parser};
use regex::Regex;

use crate::errors::WikiError;

/// Matches one complete heading element, capturing its level
const HEADING_PATTERN: &str = r"(?is)<h([1-9])\b[^>]*>.*?</h[1-9]\s*>";

/// Service for handling markdown rendering
#[derive(Clone)]
pub struct MarkdownService {
    options: Options,
    heading: Regex,
}

impl MarkdownService {
    /// Create a new markdown service
    pub fn new() -> Result<Self, WikiError> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_FOOTNOTES);

        let heading = Regex::new(HEADING_PATTERN).map_err(|e| WikiError::RenderError(e.to_string()))?;
        Ok(Self { options, heading })
    }

    /// Plain Markdown to HTML conversion
    pub fn render(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.options);
        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }

    /// Wrap every fragment between headings in `<div class="levelN">`, where
    /// N is the level of the closest preceding heading (1 before any).
    ///
    /// Fragments holding only whitespace are dropped, including the `"\n"`
    /// that pulldown-cmark emits between adjacent headings. A plain split on
    /// headings would wrap that newline in its own empty `<div>`; this one
    /// deliberately does not.
    pub fn sectionize(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len() + 64);
        let mut level = 1u8;
        let mut cursor = 0usize;

        for caps in self.heading.captures_iter(html) {
            let Some(whole) = caps.get(0) else { continue };
            push_section(&mut out, &html[cursor..whole.start()], level);
            out.push_str(whole.as_str());
            level = caps
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(level);
            cursor = whole.end();
        }
        push_section(&mut out, &html[cursor..], level);
        out
    }

    /// Render Markdown and sectionize the result
    pub fn render_sections(&self, markdown: &str) -> String {
        self.sectionize(&self.render(markdown))
    }
}

fn push_section(out: &mut String, fragment: &str, level: u8) {
    if fragment.trim().is_empty() {
        return;
    }
    out.push_str(&format!("\n<div class=\"level{}\">", level));
    out.push_str(fragment);
    out.push_str("</div>\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> MarkdownService {
        MarkdownService::new().expect("markdown service")
    }

    #[test]
    fn empty_input_renders_nothing() {
        let md = service();
        assert_eq!(md.sectionize(&md.render("")), "");
        assert_eq!(md.render_sections("   \n\n"), "");
    }

    #[test]
    fn text_before_any_heading_is_level_one() {
        let html = service().render_sections("just a paragraph");
        assert_eq!(html, "\n<div class=\"level1\"><p>just a paragraph</p>\n</div>\n");
    }

    #[test]
    fn fragments_take_the_level_of_the_preceding_heading() {
        let html = service().render_sections("# Hello\n\nWorld\n\n## Sub\n\nDetail\n\n### Deep\n\nMore");
        assert!(html.starts_with("<h1>Hello</h1>"));
        assert!(html.contains("<div class=\"level1\">\n<p>World</p>\n</div>"));
        assert!(html.contains("<h2>Sub</h2>\n<div class=\"level2\">\n<p>Detail</p>\n</div>"));
        assert!(html.contains("<h3>Deep</h3>\n<div class=\"level3\">\n<p>More</p>\n</div>"));
    }

    #[test]
    fn adjacent_headings_produce_no_empty_wrappers() {
        let html = service().render_sections("# One\n## Two\n");
        assert_eq!(html, "<h1>One</h1><h2>Two</h2>");
    }

    #[test]
    fn heading_markup_is_preserved() {
        let md = service();
        let raw = "<p>intro</p><H2 id=\"x\">Title <em>it</em></H2><p>body</p><hr />";
        let html = md.sectionize(raw);
        assert!(html.contains("<H2 id=\"x\">Title <em>it</em></H2>"));
        assert!(html.contains("<div class=\"level1\"><p>intro</p></div>"));
        assert!(html.contains("<div class=\"level2\"><p>body</p><hr /></div>"));
    }

    #[test]
    fn level_drops_back_on_shallower_heading() {
        let html = service().render_sections("### Three\n\na\n\n# One\n\nb");
        assert!(html.contains("<div class=\"level3\">\n<p>a</p>\n</div>"));
        assert!(html.contains("<div class=\"level1\">\n<p>b</p>\n</div>"));
    }

    #[test]
    fn tables_are_enabled() {
        let html = service().render("| a | b |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table>"));
    }
}
