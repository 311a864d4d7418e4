use tokio::net::TcpListener;

use palimpsest::logger::Logger;
use palimpsest::{app_router, AppState, Config, WikiError};

#[tokio::main]
async fn main() -> Result<(), WikiError> {
    if let Err(e) = Logger::init() {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let config = Config::from_env()?;
    std::fs::create_dir_all(config.content_root.as_path())?;
    if config.staff_token.is_none() {
        log::warn!("PALIMPSEST_STAFF_TOKEN is not set, editing is disabled");
    }

    let addr = config.socket_addr()?;
    log::info!(
        "Serving pages from {:?} (home '{}', revision offset {})",
        config.content_root,
        config.home_title,
        config.utc_offset
    );

    let app = app_router(AppState::new(config)?);
    let listener = TcpListener::bind(addr).await?;
    log::info!("Wiki listening on http://{}", addr);
    axum::serve(listener, app).await.map_err(WikiError::from)
}
