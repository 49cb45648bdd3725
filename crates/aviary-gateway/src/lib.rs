//! HTTP gateway for the Aviary bird catalog.
//!
//! Server-rendered pages for listing, viewing, creating, updating, deleting
//! and searching birds, backed by any [`aviary_core::Repository`] and
//! [`aviary_core::AttachmentStore`].

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod views;

pub use app::{App, AppConfig, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::AppError;
pub use state::AppState;
