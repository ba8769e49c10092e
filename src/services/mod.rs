//! Services module
//!
//! This module contains business logic services

pub mod admin;
pub mod ingestion;
pub mod notification;
pub mod storage;

// Re-export commonly used services
pub use admin::{AdminService, MAX_REJECTION_REASON_CHARS};
pub use ingestion::{ImageIngestor, IngestedImage};
pub use notification::NotificationService;
pub use storage::{FileStorage, LocalDiskStorage, StorageArea, StoredFile};
