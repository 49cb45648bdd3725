//! Page templates and the view records they render.

use askama::Template;
use aviary_core::{BirdDetails, ConservationStatus};
use axum::response::Html;

use crate::error::Result;

/// URL prefix under which stored photos are served.
pub const IMAGES_PATH: &str = "/images";

/// A bird flattened for display. Absent values render as empty text.
#[derive(Debug, Clone, Default)]
pub struct BirdView {
    pub id: i64,
    pub primary_name: String,
    pub english_name: String,
    pub scientific_name: String,
    pub order_name: String,
    pub family: String,
    pub weight: String,
    pub length: String,
    pub status_name: String,
    pub status_colour: String,
    pub photo_url: Option<String>,
    pub photographer: String,
}

impl From<BirdDetails> for BirdView {
    fn from(bird: BirdDetails) -> Self {
        let (status_name, status_colour) = bird
            .status
            .map(|status| (status.status_name, status.status_colour))
            .unwrap_or_default();
        let (photo_url, photographer) = match bird.photo {
            Some(photo) => (
                Some(format!("{IMAGES_PATH}/{}", photo.filename)),
                photo.photographer.unwrap_or_default(),
            ),
            None => (None, String::new()),
        };

        Self {
            id: bird.bird_id.get(),
            primary_name: bird.fields.primary_name,
            english_name: bird.fields.english_name,
            scientific_name: bird.fields.scientific_name,
            order_name: bird.fields.order_name,
            family: bird.fields.family,
            weight: display_measurement(bird.fields.weight),
            length: display_measurement(bird.fields.length),
            status_name,
            status_colour,
            photo_url,
            photographer,
        }
    }
}

fn display_measurement(value: Option<f64>) -> String {
    value.map(|n| n.to_string()).unwrap_or_default()
}

/// One entry of the status drop-down on the bird forms.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub status_id: i64,
    pub status_name: String,
    pub selected: bool,
}

impl StatusOption {
    pub fn list(statuses: &[ConservationStatus], selected: Option<i64>) -> Vec<Self> {
        statuses
            .iter()
            .map(|status| StatusOption {
                status_id: status.status_id,
                status_name: status.status_name.clone(),
                selected: selected == Some(status.status_id),
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexPage {
    pub title: String,
    pub statuses: Vec<ConservationStatus>,
    pub birds: Vec<BirdView>,
}

#[derive(Template)]
#[template(path = "bird_page.html")]
pub struct BirdPage {
    pub title: String,
    pub statuses: Vec<ConservationStatus>,
    pub bird: BirdView,
}

#[derive(Template)]
#[template(path = "create_bird.html")]
pub struct CreateBirdPage {
    pub title: String,
    pub statuses: Vec<ConservationStatus>,
    pub options: Vec<StatusOption>,
    pub values: BirdView,
}

#[derive(Template)]
#[template(path = "update_bird.html")]
pub struct UpdateBirdPage {
    pub title: String,
    pub statuses: Vec<ConservationStatus>,
    pub options: Vec<StatusOption>,
    pub values: BirdView,
}

#[derive(Template)]
#[template(path = "search_results.html")]
pub struct SearchResultsPage {
    pub title: String,
    pub statuses: Vec<ConservationStatus>,
    pub term: String,
    pub birds: Vec<BirdView>,
}

/// Rendered for unmatched paths, with an empty sidebar.
#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundPage {
    pub title: String,
    pub statuses: Vec<ConservationStatus>,
}

pub fn render(page: &impl Template) -> Result<Html<String>> {
    Ok(Html(page.render()?))
}
