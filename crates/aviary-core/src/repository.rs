use crate::bird::{BirdDetails, BirdFields, BirdId, ConservationStatus, Photo};
use crate::error::Result;
use crate::search::SearchTerm;
use async_trait::async_trait;
use std::fmt::Display;

/// What happens to a bird's photo rows when the bird is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhotoRetention {
    /// Photo rows outlive their bird. Bird ids are never reused, so the
    /// orphans are never displayed.
    #[default]
    Keep,
    /// Photo rows are deleted together with their bird.
    Cascade,
}

impl Display for PhotoRetention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhotoRetention::Keep => write!(f, "keep"),
            PhotoRetention::Cascade => write!(f, "cascade"),
        }
    }
}

/// A read-only view of the bird catalog.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Lists every conservation status, ordered by id.
    async fn list_statuses(&self) -> Result<Vec<ConservationStatus>>;

    /// Lists every bird with its status and photo, ordered by id.
    async fn list_birds(&self) -> Result<Vec<BirdDetails>>;

    /// Retrieves one bird. Returns `None` if the id does not exist.
    async fn get_bird(&self, id: BirdId) -> Result<Option<BirdDetails>>;

    /// Returns the birds matching `term`, ordered by id.
    /// An empty term yields an empty list.
    async fn search_birds(&self, term: &SearchTerm) -> Result<Vec<BirdDetails>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a bird and returns its generated id.
    async fn create_bird(&self, fields: &BirdFields) -> Result<BirdId>;

    /// Inserts a photo row for a bird. Existing photos are left alone.
    async fn attach_photo(&self, id: BirdId, photo: &Photo) -> Result<()>;

    /// Overwrites all fields of a bird.
    /// Returns `false` if no bird has this id.
    async fn update_bird(&self, id: BirdId, fields: &BirdFields) -> Result<bool>;

    /// Replaces every photo of a bird with `photo`, atomically.
    async fn replace_photo(&self, id: BirdId, photo: &Photo) -> Result<()>;

    /// Deletes a bird, applying the repository's [`PhotoRetention`].
    /// Returns `true` if the bird existed.
    async fn delete_bird(&self, id: BirdId) -> Result<bool>;

    /// Creates a bird and, when given, its photo in one atomic step.
    async fn create_bird_with_photo(
        &self,
        fields: &BirdFields,
        photo: Option<&Photo>,
    ) -> Result<BirdId>;

    /// Overwrites a bird and, when given, replaces its photo in one atomic step.
    /// Returns `false` if no bird has this id, in which case nothing is written.
    async fn update_bird_with_photo(
        &self,
        id: BirdId,
        fields: &BirdFields,
        photo: Option<&Photo>,
    ) -> Result<bool>;
}
