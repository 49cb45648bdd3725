pub mod attachment;
pub mod memory;
pub mod mysql;

pub use attachment::{InMemoryAttachmentStore, LocalAttachmentStore};
pub use aviary_core::{AttachmentStore, ReadRepository, Repository, StorageError};
pub use memory::{default_statuses, InMemoryRepository};
pub use mysql::MySqlRepository;
