use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, header},
    response::Response,
};
use time::macros::offset;

use crate::config::Config;
use crate::handlers::SESSION_COOKIE;
use crate::types::{AppState, RevisionId};
use crate::app_router;

pub(super) const STAFF_TOKEN: &str = "staff-secret";

pub(super) struct TestHarness {
    _temp: tempfile::TempDir,
    pub(super) state: AppState,
    pub(super) router: Router,
}

impl TestHarness {
    pub(super) fn setup() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let config = Config {
            content_root: std::sync::Arc::new(temp.path().to_path_buf()),
            home_title: "home".to_string(),
            utc_offset: offset!(+9),
            staff_token: Some(STAFF_TOKEN.to_string()),
            ..Config::new()
        };
        let state = AppState::new(config).expect("state");
        let router = app_router(state.clone());
        Self { _temp: temp, state, router }
    }

    pub(super) fn seed(&self, title: &str, label: &str, content: &str) -> RevisionId {
        let id: RevisionId = label.parse().expect("revision label");
        self.state
            .store
            .write_revision(title, &id, content)
            .expect("seed revision");
        id
    }
}

pub(super) fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("get request")
}

pub(super) fn staff_get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", STAFF_TOKEN));
    if let Some(session) = session {
        builder = builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, session));
    }
    builder.body(Body::empty()).expect("staff get request")
}

pub(super) fn staff_post(uri: &str, form: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::AUTHORIZATION, format!("Bearer {}", STAFF_TOKEN));
    if let Some(session) = session {
        builder = builder.header(header::COOKIE, format!("{}={}", SESSION_COOKIE, session));
    }
    builder.body(Body::from(form.to_string())).expect("staff post request")
}

pub(super) async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body bytes");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

/// Session id handed out through `Set-Cookie`
pub(super) fn session_from(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .and_then(|pair| pair.strip_prefix(&format!("{}=", SESSION_COOKIE)))
        .map(str::to_string)
}

pub(super) fn location(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
}
