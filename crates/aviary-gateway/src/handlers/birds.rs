use aviary_core::{BirdDetails, BirdId, Photo, SearchOutcome, SearchTerm};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::model::{BirdForm, SearchQuery};
use crate::state::AppState;
use crate::views::{
    render, BirdPage, BirdView, CreateBirdPage, IndexPage, NotFoundPage, SearchResultsPage,
    StatusOption, UpdateBirdPage,
};

const BIRDS_PATH: &str = "/birds";
const BIRD_NOT_FOUND: &str = "Bird not found";
const NO_SEARCH_MATCH: &str = "No birds found matching the search term.";

pub async fn index_handler() -> Redirect {
    Redirect::to(BIRDS_PATH)
}

pub async fn list_birds_handler(State(state): State<AppState>) -> Result<Html<String>> {
    let statuses = state.repository().list_statuses().await?;
    let birds = state.repository().list_birds().await?;

    render(&IndexPage {
        title: "Birds of Aotearoa".to_string(),
        statuses,
        birds: birds.into_iter().map(BirdView::from).collect(),
    })
}

pub async fn get_bird_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let bird = find_bird(&state, &id).await?;
    let statuses = state.repository().list_statuses().await?;

    render(&BirdPage {
        title: bird.fields.english_name.clone(),
        statuses,
        bird: bird.into(),
    })
}

pub async fn create_form_handler(State(state): State<AppState>) -> Result<Html<String>> {
    let statuses = state.repository().list_statuses().await?;

    render(&CreateBirdPage {
        title: "Create New Bird".to_string(),
        options: StatusOption::list(&statuses, None),
        statuses,
        values: BirdView::default(),
    })
}

pub async fn create_bird_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect> {
    let mut form = BirdForm::from_multipart(multipart).await?;
    let photo = store_upload(&state, &mut form).await?;

    let id = state
        .repository()
        .create_bird_with_photo(&form.fields, photo.as_ref())
        .await?;
    info!(bird_id = %id, with_photo = photo.is_some(), "created bird");

    Ok(Redirect::to(BIRDS_PATH))
}

pub async fn update_form_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Html<String>> {
    let bird = find_bird(&state, &id).await?;
    let statuses = state.repository().list_statuses().await?;

    render(&UpdateBirdPage {
        title: format!("Update {}", bird.fields.english_name),
        options: StatusOption::list(&statuses, bird.fields.status_id),
        statuses,
        values: bird.into(),
    })
}

pub async fn update_bird_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect> {
    let id = parse_bird_id(&id)?;
    let mut form = BirdForm::from_multipart(multipart).await?;
    let photo = store_upload(&state, &mut form).await?;

    let updated = state
        .repository()
        .update_bird_with_photo(id, &form.fields, photo.as_ref())
        .await?;
    if updated {
        info!(bird_id = %id, with_photo = photo.is_some(), "updated bird");
    } else {
        debug!(bird_id = %id, "update skipped, bird does not exist");
    }

    Ok(Redirect::to(BIRDS_PATH))
}

pub async fn delete_bird_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect> {
    // A path that is not an id names no bird, which deletes nothing.
    if let Ok(id) = id.parse::<BirdId>() {
        let deleted = state.repository().delete_bird(id).await?;
        info!(bird_id = %id, deleted, "delete bird");
    }

    Ok(Redirect::to(BIRDS_PATH))
}

pub async fn search_birds_handler(
    Query(query): Query<SearchQuery>,
    State(state): State<AppState>,
) -> Result<Response> {
    let term = SearchTerm::new(query.bird_identifier.unwrap_or_default());
    let statuses = state.repository().list_statuses().await?;
    let birds = state.repository().search_birds(&term).await?;

    match SearchOutcome::from(birds) {
        SearchOutcome::NoMatch => Err(AppError::NotFound(NO_SEARCH_MATCH)),
        SearchOutcome::Single(id) => {
            Ok(Redirect::to(&format!("{BIRDS_PATH}/{id}/update")).into_response())
        }
        SearchOutcome::Many(birds) => {
            let page = render(&SearchResultsPage {
                title: "Search Results".to_string(),
                statuses,
                term: term.as_str().to_string(),
                birds: birds.into_iter().map(BirdView::from).collect(),
            })?;
            Ok(page.into_response())
        }
    }
}

pub async fn fallback_handler() -> Result<(StatusCode, Html<String>)> {
    let page = render(&NotFoundPage {
        title: "404 - Page Not Found".to_string(),
        statuses: Vec::new(),
    })?;
    Ok((StatusCode::NOT_FOUND, page))
}

/// Stores the uploaded file, if any, before the database write that
/// references it.
async fn store_upload(state: &AppState, form: &mut BirdForm) -> Result<Option<Photo>> {
    match form.upload.take() {
        Some(upload) => {
            let filename = state.attachments().store(upload).await?;
            Ok(Some(form.photo(filename)))
        }
        None => Ok(None),
    }
}

fn parse_bird_id(id: &str) -> Result<BirdId> {
    id.parse().map_err(|_| AppError::NotFound(BIRD_NOT_FOUND))
}

async fn find_bird(state: &AppState, id: &str) -> Result<BirdDetails> {
    let id = parse_bird_id(id)?;
    state
        .repository()
        .get_bird(id)
        .await?
        .ok_or(AppError::NotFound(BIRD_NOT_FOUND))
}
