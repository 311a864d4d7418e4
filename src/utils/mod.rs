use std::path::{Component, Path};

use crate::errors::WikiError;

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace("&", "&amp;")
        .replace("<", "&lt;")
        .replace(">", "&gt;")
        .replace("\"", "&quot;")
        .replace("'", "&#39;")
}

/// Escape HTML attribute values
pub fn escape_attr(text: &str) -> String {
    escape_html(text)
}

/// Normalize a request path into a page title: no leading/trailing or
/// doubled slashes, no `.` segments
pub fn normalize_path(path: &str) -> String {
    path.split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Reject titles that would escape the content root
pub fn ensure_safe_path(title: &str) -> Result<(), WikiError> {
    if title.is_empty() {
        return Err(WikiError::InvalidPath);
    }
    for comp in Path::new(title).components() {
        match comp {
            Component::Normal(_) => {}
            _ => return Err(WikiError::InvalidPath),
        }
    }
    Ok(())
}

/// URL of the read path for a title, percent-encoding anything outside the
/// unreserved set
pub fn page_href(title: &str) -> String {
    let mut href = String::with_capacity(title.len() + 1);
    href.push('/');
    for byte in title.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                href.push(byte as char)
            }
            _ => href.push_str(&format!("%{:02X}", byte)),
        }
    }
    href
}
