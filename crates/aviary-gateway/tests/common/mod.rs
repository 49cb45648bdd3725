#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use aviary_core::{AttachmentStore, BirdFields, Repository};
use aviary_gateway::{App, AppConfig, AppState};
use aviary_storage::{default_statuses, InMemoryAttachmentStore, InMemoryRepository};
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const BOUNDARY: &str = "aviary-test-boundary";

/// A router over in-memory storage, with handles to inspect what it wrote.
pub struct TestApp {
    pub repository: Arc<InMemoryRepository>,
    pub attachments: Arc<InMemoryAttachmentStore>,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryRepository::with_statuses(default_statuses()));
        let attachments = Arc::new(InMemoryAttachmentStore::new());
        let router = build_router(repository.clone(), attachments.clone(), AppConfig::default());

        Self {
            repository,
            attachments,
            router,
        }
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_form(&self, uri: &str, parts: &[Part<'_>]) -> Response<Body> {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body(parts)))
                .unwrap(),
        )
        .await
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn build_router(
    repository: Arc<dyn Repository>,
    attachments: Arc<dyn AttachmentStore>,
    config: AppConfig,
) -> Router {
    App::router(AppState::new(repository, attachments), &config)
}

pub fn config_with_upload_dir(upload_dir: PathBuf) -> AppConfig {
    AppConfig {
        upload_dir,
        ..AppConfig::default()
    }
}

/// One part of a hand-built `multipart/form-data` body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, filename, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// The text fields of a complete bird form.
pub fn bird_parts<'a>(fields: &'a BirdFields, numbers: &'a [String; 3]) -> Vec<Part<'a>> {
    vec![
        Part::Text("primary_name", &fields.primary_name),
        Part::Text("english_name", &fields.english_name),
        Part::Text("scientific_name", &fields.scientific_name),
        Part::Text("order_name", &fields.order_name),
        Part::Text("family", &fields.family),
        Part::Text("weight", &numbers[0]),
        Part::Text("length", &numbers[1]),
        Part::Text("status_id", &numbers[2]),
    ]
}

/// Renders the optional numbers of `fields` the way a browser submits them.
pub fn form_numbers(fields: &BirdFields) -> [String; 3] {
    [
        fields.weight.map(|n| n.to_string()).unwrap_or_default(),
        fields.length.map(|n| n.to_string()).unwrap_or_default(),
        fields.status_id.map(|n| n.to_string()).unwrap_or_default(),
    ]
}

pub fn kiwi() -> BirdFields {
    BirdFields {
        primary_name: "Kiwi".to_string(),
        english_name: "North Island Brown Kiwi".to_string(),
        scientific_name: "Apteryx mantelli".to_string(),
        order_name: "Apterygiformes".to_string(),
        family: "Apterygidae".to_string(),
        weight: Some(2800.0),
        length: Some(40.0),
        status_id: Some(3),
    }
}

pub fn kea() -> BirdFields {
    BirdFields {
        primary_name: "Kea".to_string(),
        english_name: "Kea".to_string(),
        scientific_name: "Nestor notabilis".to_string(),
        order_name: "Psittaciformes".to_string(),
        family: "Strigopidae".to_string(),
        weight: Some(1000.0),
        length: Some(46.0),
        status_id: Some(9),
    }
}

pub fn kaka() -> BirdFields {
    BirdFields {
        primary_name: "Kākā".to_string(),
        english_name: "New Zealand Kaka".to_string(),
        scientific_name: "Nestor meridionalis".to_string(),
        order_name: "Psittaciformes".to_string(),
        family: "Strigopidae".to_string(),
        weight: Some(500.0),
        length: Some(45.0),
        status_id: Some(4),
    }
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
