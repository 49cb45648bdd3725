use async_trait::async_trait;
use aviary_core::bird::{BirdDetails, BirdFields, BirdId, ConservationStatus, Photo};
use aviary_core::error::{Result, StorageError};
use aviary_core::repository::{PhotoRetention, ReadRepository, Repository};
use aviary_core::search::SearchTerm;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// A stored photo row. `photo_id` orders rows the way the MySQL
/// auto-increment key does.
#[derive(Debug, Clone)]
struct PhotoRow {
    photo_id: u64,
    bird_id: BirdId,
    photo: Photo,
}

#[derive(Debug, Default)]
struct Tables {
    statuses: BTreeMap<i64, ConservationStatus>,
    birds: BTreeMap<BirdId, BirdFields>,
    photos: Vec<PhotoRow>,
    next_bird_id: i64,
    next_photo_id: u64,
}

impl Tables {
    fn check_status(&self, fields: &BirdFields) -> Result<()> {
        match fields.status_id {
            Some(status_id) if !self.statuses.contains_key(&status_id) => {
                Err(StorageError::Constraint(format!(
                    "unknown conservation status {status_id}"
                )))
            }
            _ => Ok(()),
        }
    }

    fn insert_bird(&mut self, fields: &BirdFields) -> Result<BirdId> {
        self.check_status(fields)?;
        self.next_bird_id += 1;
        let id = BirdId::new(self.next_bird_id);
        self.birds.insert(id, fields.clone());
        Ok(id)
    }

    fn insert_photo(&mut self, bird_id: BirdId, photo: &Photo) {
        self.next_photo_id += 1;
        self.photos.push(PhotoRow {
            photo_id: self.next_photo_id,
            bird_id,
            photo: photo.clone(),
        });
    }

    fn delete_photos(&mut self, bird_id: BirdId) -> usize {
        let before = self.photos.len();
        self.photos.retain(|row| row.bird_id != bird_id);
        before - self.photos.len()
    }

    fn update_bird(&mut self, id: BirdId, fields: &BirdFields) -> Result<bool> {
        self.check_status(fields)?;
        match self.birds.get_mut(&id) {
            Some(existing) => {
                *existing = fields.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn details(&self, bird_id: BirdId, fields: &BirdFields) -> BirdDetails {
        let status = fields
            .status_id
            .and_then(|status_id| self.statuses.get(&status_id))
            .cloned();
        let photo = self
            .photos
            .iter()
            .filter(|row| row.bird_id == bird_id)
            .max_by_key(|row| row.photo_id)
            .map(|row| row.photo.clone());

        BirdDetails {
            bird_id,
            fields: fields.clone(),
            status,
            photo,
        }
    }
}

/// In-memory implementation of the bird repository.
///
/// All tables sit behind one lock, so every write is atomic the same way a
/// transaction is in the MySQL backend. Bird ids are never reused.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
    retention: PhotoRetention,
}

impl InMemoryRepository {
    /// Creates an empty repository without conservation statuses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding the given conservation statuses.
    pub fn with_statuses(statuses: impl IntoIterator<Item = ConservationStatus>) -> Self {
        let repo = Self::new();
        repo.tables.write().statuses = statuses
            .into_iter()
            .map(|status| (status.status_id, status))
            .collect();
        repo
    }

    /// Sets what happens to photo rows when their bird is deleted.
    pub fn with_retention(mut self, retention: PhotoRetention) -> Self {
        self.retention = retention;
        self
    }

    /// Number of photo rows stored for a bird, orphans included.
    pub fn photo_count(&self, id: BirdId) -> usize {
        self.tables
            .read()
            .photos
            .iter()
            .filter(|row| row.bird_id == id)
            .count()
    }
}

/// The standard New Zealand threat classifications, matching the MySQL seed.
pub fn default_statuses() -> Vec<ConservationStatus> {
    [
        (1, "Not Threatened", "#02a028"),
        (2, "Naturally Uncommon", "#649a31"),
        (3, "Relict", "#99cb68"),
        (4, "Recovering", "#fecc33"),
        (5, "Declining", "#fe9a01"),
        (6, "Nationally Increasing", "#c26967"),
        (7, "Nationally Vulnerable", "#9b0000"),
        (8, "Nationally Endangered", "#660032"),
        (9, "Nationally Critical", "#320033"),
        (10, "Extinct", "#000000"),
        (11, "Data Deficient", "#000000"),
    ]
    .into_iter()
    .map(|(status_id, name, colour)| ConservationStatus {
        status_id,
        status_name: name.to_string(),
        status_colour: colour.to_string(),
    })
    .collect()
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn list_statuses(&self) -> Result<Vec<ConservationStatus>> {
        Ok(self.tables.read().statuses.values().cloned().collect())
    }

    async fn list_birds(&self) -> Result<Vec<BirdDetails>> {
        let tables = self.tables.read();
        Ok(tables
            .birds
            .iter()
            .map(|(id, fields)| tables.details(*id, fields))
            .collect())
    }

    async fn get_bird(&self, id: BirdId) -> Result<Option<BirdDetails>> {
        let tables = self.tables.read();
        Ok(tables
            .birds
            .get(&id)
            .map(|fields| tables.details(id, fields)))
    }

    async fn search_birds(&self, term: &SearchTerm) -> Result<Vec<BirdDetails>> {
        let tables = self.tables.read();
        Ok(tables
            .birds
            .iter()
            .filter(|(id, fields)| term.matches(**id, fields))
            .map(|(id, fields)| tables.details(*id, fields))
            .collect())
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_bird(&self, fields: &BirdFields) -> Result<BirdId> {
        self.tables.write().insert_bird(fields)
    }

    async fn attach_photo(&self, id: BirdId, photo: &Photo) -> Result<()> {
        self.tables.write().insert_photo(id, photo);
        Ok(())
    }

    async fn update_bird(&self, id: BirdId, fields: &BirdFields) -> Result<bool> {
        self.tables.write().update_bird(id, fields)
    }

    async fn replace_photo(&self, id: BirdId, photo: &Photo) -> Result<()> {
        let mut tables = self.tables.write();
        tables.delete_photos(id);
        tables.insert_photo(id, photo);
        Ok(())
    }

    async fn delete_bird(&self, id: BirdId) -> Result<bool> {
        let mut tables = self.tables.write();
        if self.retention == PhotoRetention::Cascade {
            tables.delete_photos(id);
        }
        Ok(tables.birds.remove(&id).is_some())
    }

    async fn create_bird_with_photo(
        &self,
        fields: &BirdFields,
        photo: Option<&Photo>,
    ) -> Result<BirdId> {
        let mut tables = self.tables.write();
        let id = tables.insert_bird(fields)?;
        if let Some(photo) = photo {
            tables.insert_photo(id, photo);
        }
        Ok(id)
    }

    async fn update_bird_with_photo(
        &self,
        id: BirdId,
        fields: &BirdFields,
        photo: Option<&Photo>,
    ) -> Result<bool> {
        let mut tables = self.tables.write();
        if !tables.update_bird(id, fields)? {
            return Ok(false);
        }
        if let Some(photo) = photo {
            tables.delete_photos(id);
            tables.insert_photo(id, photo);
        }
        Ok(true)
    }
}
