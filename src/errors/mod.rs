use std::{fmt, io};
use axum::{http::StatusCode, response::{Html, IntoResponse, Response}};

/// Custom error types for the wiki application
#[derive(Debug)]
pub enum WikiError {
    Io(io::Error),
    NotFound,
    InvalidPath,
    Forbidden,
    Config(String),
    RenderError(String),
}

impl From<io::Error> for WikiError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => WikiError::NotFound,
            _ => WikiError::Io(err),
        }
    }
}

impl fmt::Display for WikiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WikiError::Io(e) => write!(f, "I/O error: {}", e),
            WikiError::NotFound => write!(f, "Page not found"),
            WikiError::InvalidPath => write!(f, "Invalid path"),
            WikiError::Forbidden => write!(f, "Staff access required"),
            WikiError::Config(e) => write!(f, "Configuration error: {}", e),
            WikiError::RenderError(e) => write!(f, "Render error: {}", e),
        }
    }
}

impl std::error::Error for WikiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WikiError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl IntoResponse for WikiError {
    fn into_response(self) -> Response {
        match self {
            WikiError::NotFound => (
                StatusCode::NOT_FOUND,
                Html(crate::components::TemplateComponent::new().render_not_found()),
            )
                .into_response(),
            WikiError::InvalidPath => (StatusCode::BAD_REQUEST, "Invalid path").into_response(),
            WikiError::Forbidden => (StatusCode::FORBIDDEN, "Staff access required").into_response(),
            other => {
                log::error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()).into_response()
            }
        }
    }
}
