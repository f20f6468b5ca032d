//! Infrastructure layer for Tidytrack.
//!
//! Storage adapters for the repository ports, the production clock and
//! identifier services, a file-backed camera, configuration and path
//! resolution.

pub mod blob_repository;
pub mod camera;
pub mod config;
pub mod dto;
pub mod paths;
pub mod services;
pub mod sqlite_database;
pub mod sqlite_repository;
pub mod storage;

pub use crate::blob_repository::{
    BlobCommentRepository, BlobPictureRepository, BlobSessionRepository,
};
pub use crate::camera::FileCameraDevice;
pub use crate::config::{AppConfig, StorageBackend};
pub use crate::paths::TrackerPaths;
pub use crate::services::{SystemTimeService, UuidGenerator};
pub use crate::sqlite_database::SqliteDatabase;
pub use crate::sqlite_repository::{
    SqliteCommentRepository, SqlitePictureRepository, SqliteSessionRepository,
};
