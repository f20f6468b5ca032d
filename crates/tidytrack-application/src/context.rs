//! Explicitly constructed dependency context.
//!
//! `AppContext` picks a storage adapter from the configuration, builds the
//! three repositories over it and hands them to one [`SessionUseCase`]. The
//! structured store's database handle lives here so every repository shares
//! it for the lifetime of the context.

use crate::session_service::SessionService;
use crate::session_usecase::SessionUseCase;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tidytrack_core::error::Result;
use tidytrack_core::picture::PictureRepository;
use tidytrack_core::service::{IdGenerator, TimeService};
use tidytrack_core::session::{CommentRepository, SessionRepository};
use tidytrack_infrastructure::storage::{BlobStore, FileBlobStore};
use tidytrack_infrastructure::{
    AppConfig, BlobCommentRepository, BlobPictureRepository, BlobSessionRepository,
    SqliteCommentRepository, SqliteDatabase, SqlitePictureRepository, SqliteSessionRepository,
    StorageBackend, SystemTimeService, TrackerPaths, UuidGenerator,
};

struct Repositories {
    sessions: Arc<dyn SessionRepository>,
    comments: Arc<dyn CommentRepository>,
    pictures: Arc<dyn PictureRepository>,
}

/// Everything the front end needs, wired once at startup.
pub struct AppContext {
    config: AppConfig,
    data_dir: PathBuf,
    database: Option<Arc<SqliteDatabase>>,
    session_service: SessionService,
}

impl AppContext {
    /// Builds a context with the system clock and UUID identifiers.
    pub fn from_config(config: AppConfig, paths: &TrackerPaths) -> Result<Self> {
        Self::with_services(
            config,
            paths,
            Arc::new(SystemTimeService),
            Arc::new(UuidGenerator),
        )
    }

    /// Builds a context with caller-supplied time and identifier services.
    ///
    /// `storage.data_dir` in the configuration takes precedence over the
    /// data directory from `paths`. Nothing is opened on disk until the first
    /// repository call.
    pub fn with_services(
        config: AppConfig,
        paths: &TrackerPaths,
        time_service: Arc<dyn TimeService>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Result<Self> {
        let data_paths = match &config.storage.data_dir {
            Some(dir) => TrackerPaths::new(Some(dir.as_path())),
            None => paths.clone(),
        };
        let data_dir = data_paths.data_dir()?;

        let (repositories, database) = match config.storage.backend {
            StorageBackend::Sqlite => {
                let db = Arc::new(SqliteDatabase::open(data_paths.database_file()?));
                let repositories = Repositories {
                    sessions: Arc::new(SqliteSessionRepository::new(db.clone())),
                    comments: Arc::new(SqliteCommentRepository::new(db.clone())),
                    pictures: Arc::new(SqlitePictureRepository::new(db.clone())),
                };
                (repositories, Some(db))
            }
            StorageBackend::Blob => {
                let store: Arc<dyn BlobStore> =
                    Arc::new(FileBlobStore::new(data_paths.blob_dir()?));
                let repositories = Repositories {
                    sessions: Arc::new(BlobSessionRepository::new(store.clone())),
                    comments: Arc::new(BlobCommentRepository::new(store.clone())),
                    pictures: Arc::new(BlobPictureRepository::new(store)),
                };
                (repositories, None)
            }
        };

        tracing::info!(
            "Using {} storage in {}",
            config.storage.backend,
            data_dir.display()
        );

        let usecase = Arc::new(SessionUseCase::new(
            repositories.sessions,
            repositories.comments,
            repositories.pictures,
            time_service,
            id_generator,
        ));

        Ok(Self {
            config,
            data_dir,
            database,
            session_service: SessionService::new(usecase),
        })
    }

    pub fn session_service(&self) -> &SessionService {
        &self.session_service
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Directory holding the session data.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The shared structured store, when the sqlite backend is selected.
    pub fn database(&self) -> Option<&Arc<SqliteDatabase>> {
        self.database.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedClock, SequentialIds, t0};
    use tempfile::TempDir;

    fn context(backend: StorageBackend, dir: &TempDir) -> AppContext {
        let mut config = AppConfig::default();
        config.storage.backend = backend;
        AppContext::with_services(
            config,
            &TrackerPaths::new(Some(dir.path())),
            Arc::new(FixedClock::new(t0())),
            Arc::new(SequentialIds::default()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_sqlite_context_opens_database_lazily() {
        let dir = TempDir::new().unwrap();
        let ctx = context(StorageBackend::Sqlite, &dir);

        let db = ctx.database().unwrap().clone();
        assert!(!db.is_initialized());

        ctx.session_service()
            .start_session("Desk", 10, "<img>")
            .await
            .unwrap();

        assert!(db.is_initialized());
        assert!(dir.path().join("tidytrack.db").exists());
    }

    #[tokio::test]
    async fn test_blob_context_writes_blob_files() {
        let dir = TempDir::new().unwrap();
        let ctx = context(StorageBackend::Blob, &dir);
        assert!(ctx.database().is_none());

        let session = ctx
            .session_service()
            .start_session("Desk", 10, "<img>")
            .await
            .unwrap();

        assert!(dir.path().join("blobs").join("sessions.json").exists());
        assert!(dir.path().join("blobs").join("pictures.json").exists());
        let listed = ctx.session_service().get_all_sessions().await.unwrap();
        assert_eq!(listed, vec![session]);
    }

    #[tokio::test]
    async fn test_both_backends_run_the_same_scenario() {
        for backend in [StorageBackend::Sqlite, StorageBackend::Blob] {
            let dir = TempDir::new().unwrap();
            let ctx = context(backend, &dir);
            let service = ctx.session_service();

            let session = service
                .start_session("Clean garage", 30, "<img-a>")
                .await
                .unwrap();
            let id = session.session_id.clone();
            let comment = service.add_comment(&id, "halfway done").await.unwrap();
            assert_eq!(comment.timestamp, t0());
            service.pause_session(&id).await.unwrap();
            let ended = service.end_session(&id, "<img-b>").await.unwrap();

            let details = service.get_session_details(&id).await.unwrap();
            assert_eq!(details, ended, "backend: {}", backend);
            assert_eq!(details.comments, vec![comment]);

            service.delete_session(&id).await.unwrap();
            assert!(service.get_all_sessions().await.unwrap().is_empty());
            let before_id = session.before_picture_id.unwrap();
            assert!(service.get_picture(&before_id).await.unwrap().is_none());
        }
    }

    #[test]
    fn test_configured_data_dir_overrides_paths() {
        let base = TempDir::new().unwrap();
        let data = TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.storage.data_dir = Some(data.path().to_path_buf());

        let ctx = AppContext::from_config(config, &TrackerPaths::new(Some(base.path()))).unwrap();

        assert_eq!(ctx.data_dir(), data.path());
        assert_eq!(
            ctx.database().unwrap().path(),
            Some(data.path().join("tidytrack.db").as_path())
        );
    }
}
