mod bird;
mod health;

pub use bird::{BirdForm, SearchQuery, IMAGE_FIELD};
pub use health::HealthResponse;
