use std::path::PathBuf;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_bird_handler, create_form_handler, delete_bird_handler, fallback_handler,
    get_bird_handler, health_handler, index_handler, list_birds_handler, search_birds_handler,
    update_bird_handler, update_form_handler,
};
use crate::state::AppState;
use crate::views::IMAGES_PATH;

/// Default cap on request bodies, which bounds photo uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Router settings that are not part of the shared state.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory served under `/images`.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("public/images"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

pub struct App {}

impl App {
    pub fn router(state: AppState, config: &AppConfig) -> Router {
        Router::new()
            .route("/", get(index_handler))
            .route("/health", get(health_handler))
            .nest(
                "/birds",
                Router::new()
                    .route("/", get(list_birds_handler))
                    .route("/create", get(create_form_handler).post(create_bird_handler))
                    .route("/search", get(search_birds_handler))
                    .route("/{id}", get(get_bird_handler))
                    .route("/{id}/update", get(update_form_handler).post(update_bird_handler))
                    .route("/{id}/delete", post(delete_bird_handler)),
            )
            .nest_service(IMAGES_PATH, ServeDir::new(&config.upload_dir))
            .fallback(fallback_handler)
            .layer(DefaultBodyLimit::max(config.max_upload_bytes))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
