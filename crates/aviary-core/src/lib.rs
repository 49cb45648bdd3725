//! Core types and traits for the Aviary bird catalog.
//!
//! This crate provides the domain records, the repository and attachment
//! store contracts, and the search semantics shared by the storage backends
//! and the HTTP gateway.

pub mod attachment;
pub mod bird;
pub mod error;
pub mod repository;
pub mod search;

pub use attachment::{attachment_filename, AttachmentStore, Upload};
pub use bird::{BirdDetails, BirdFields, BirdId, ConservationStatus, Photo};
pub use error::{AttachmentError, CoreError, StorageError};
pub use repository::{PhotoRetention, ReadRepository, Repository};
pub use search::{SearchOutcome, SearchTerm};
