use std::sync::Arc;

use aviary_core::{AttachmentStore, Repository};

/// Shared handles injected into every handler.
#[derive(Clone)]
pub struct AppState {
    repository: Arc<dyn Repository>,
    attachments: Arc<dyn AttachmentStore>,
}

impl AppState {
    pub fn new(repository: Arc<dyn Repository>, attachments: Arc<dyn AttachmentStore>) -> Self {
        Self {
            repository,
            attachments,
        }
    }

    pub fn repository(&self) -> &dyn Repository {
        self.repository.as_ref()
    }

    pub fn attachments(&self) -> &dyn AttachmentStore {
        self.attachments.as_ref()
    }
}
