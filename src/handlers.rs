use axum::{
    extract::{Form, Path as AxumPath, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::components::TemplateComponent;
use crate::config::Config;
use crate::errors::WikiError;
use crate::services::{EditCommand, EditOutcome, EditWorkflow, PageService, SessionStore};
use crate::types::{AppState, EditSubmission, ViewQuery};
use crate::utils::{ensure_safe_path, normalize_path, page_href};

pub const SESSION_COOKIE: &str = "palimpsest_session";
pub const STAFF_COOKIE: &str = "palimpsest_staff";

/// What a request to a page asks for
#[derive(Debug)]
pub enum PageRequest {
    View,
    Edit,
    Submit(EditSubmission),
}

impl PageRequest {
    fn from_query(query: &ViewQuery) -> Self {
        if query.wants_editor() { PageRequest::Edit } else { PageRequest::View }
    }
}

/// Handle GET on the root path (the home page)
pub async fn handle_root(
    State(state): State<AppState>,
    Query(query): Query<ViewQuery>,
    headers: HeaderMap,
) -> Result<Response, WikiError> {
    let title = state.config.home_title.clone();
    log::info!("Root request received, serving '{}'", title);
    serve_page(&state, &title, &headers, PageRequest::from_query(&query))
}

/// Handle POST on the root path
pub async fn submit_root(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<EditSubmission>,
) -> Result<Response, WikiError> {
    let title = state.config.home_title.clone();
    serve_page(&state, &title, &headers, PageRequest::Submit(form))
}

/// Handle GET on a page path
pub async fn handle_path(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
    Query(query): Query<ViewQuery>,
    headers: HeaderMap,
) -> Result<Response, WikiError> {
    log::info!("Path request received: '{}'", path);
    let title = title_for(&state.config, &path);
    serve_page(&state, &title, &headers, PageRequest::from_query(&query))
}

/// Handle POST on a page path
pub async fn submit_path(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
    headers: HeaderMap,
    Form(form): Form<EditSubmission>,
) -> Result<Response, WikiError> {
    log::info!("Submission received for: '{}'", path);
    let title = title_for(&state.config, &path);
    serve_page(&state, &title, &headers, PageRequest::Submit(form))
}

fn title_for(config: &Config, path: &str) -> String {
    let normalized = normalize_path(path);
    if normalized.is_empty() { config.home_title.clone() } else { normalized }
}

/// Single entry point for a page: the read path, or the editor when the
/// request asks for it or carries a submission
pub fn serve_page(
    state: &AppState,
    title: &str,
    headers: &HeaderMap,
    request: PageRequest,
) -> Result<Response, WikiError> {
    ensure_safe_path(title)?;

    match request {
        PageRequest::View => {
            let view = PageService::new(&state.store, &state.markdown).read(title)?;
            Ok(Html(TemplateComponent::new().render_page(&view)).into_response())
        }
        PageRequest::Edit => serve_editor(state, title, headers, EditCommand::Enter),
        PageRequest::Submit(form) => {
            serve_editor(state, title, headers, EditCommand::from_submission(form))
        }
    }
}

fn serve_editor(
    state: &AppState,
    title: &str,
    headers: &HeaderMap,
    command: EditCommand,
) -> Result<Response, WikiError> {
    if !is_staff(&state.config, headers) {
        log::warn!("Rejected non-staff edit request for '{}'", title);
        return Err(WikiError::Forbidden);
    }

    let (session_id, fresh_session) = match cookie_value(headers, SESSION_COOKIE) {
        Some(id) if state.sessions.contains(&id) => (id, false),
        _ => (SessionStore::new_session_id(), true),
    };
    let carried = state.sessions.load(&session_id, title);
    log::debug!("Editor command for '{}': {:?} (carried {:?})", title, command, carried);

    let workflow = EditWorkflow::new(&state.store, &state.markdown, title);
    match workflow.handle(carried, command)? {
        EditOutcome::Render { state: next, view } => {
            state.sessions.store(&session_id, title, next);
            let mut response = Html(TemplateComponent::new().render_editor(&view)).into_response();
            if fresh_session {
                let cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, session_id);
                if let Ok(value) = HeaderValue::from_str(&cookie) {
                    response.headers_mut().append(header::SET_COOKIE, value);
                }
            }
            Ok(response)
        }
        EditOutcome::Redirect { title } => {
            // Leaving the editor ends the session; a fresh one is never handed out here
            if !fresh_session {
                state.sessions.clear(&session_id);
            }
            Ok(Redirect::to(&page_href(&title)).into_response())
        }
    }
}

/// Staff present the configured token as a bearer token or a cookie
fn is_staff(config: &Config, headers: &HeaderMap) -> bool {
    let Some(token) = config.staff_token.as_deref() else {
        return false;
    };

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);
    if bearer.is_some_and(|candidate| tokens_match(candidate, token)) {
        return true;
    }
    cookie_value(headers, STAFF_COOKIE).is_some_and(|candidate| tokens_match(&candidate, token))
}

/// Constant-time comparison for equal-length tokens
fn tokens_match(candidate: &str, token: &str) -> bool {
    let (a, b) = (candidate.as_bytes(), token.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
