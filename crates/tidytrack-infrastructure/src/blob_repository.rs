//! Blob-store-backed repository implementations.
//!
//! Each collection is one JSON array stored under a fixed key:
//!
//! ```text
//! sessions -> [SessionRecord, ...]
//! comments -> [CommentRecord, ...]
//! pictures -> [PictureRecord, ...]
//! ```
//!
//! Queries read the whole collection and filter linearly; writes rewrite the
//! whole collection. Saving an existing ID replaces the record in place, so
//! collection order is first-insertion order.

use crate::dto::{CommentRecord, Keyed, PictureRecord, SessionRecord};
use crate::storage::BlobStore;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;
use std::sync::Arc;
use tidytrack_core::error::Result;
use tidytrack_core::picture::{Picture, PictureRepository};
use tidytrack_core::session::{Comment, CommentRepository, Session, SessionRepository};
use tokio::sync::Mutex;

const SESSIONS_KEY: &str = "sessions";
const COMMENTS_KEY: &str = "comments";
const PICTURES_KEY: &str = "pictures";

/// One serialized collection inside a blob store.
///
/// Read-modify-write cycles are serialized within the process so two saves
/// through the same repository cannot drop each other's records.
struct BlobCollection<R> {
    store: Arc<dyn BlobStore>,
    key: &'static str,
    write_lock: Mutex<()>,
    _record: PhantomData<fn() -> R>,
}

impl<R> BlobCollection<R>
where
    R: Serialize + DeserializeOwned + Keyed + Send,
{
    fn new(store: Arc<dyn BlobStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            write_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    async fn load(&self) -> Result<Vec<R>> {
        match self.store.get_item(self.key).await? {
            Some(json) if !json.trim().is_empty() => Ok(serde_json::from_str(&json)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn upsert(&self, record: R) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        match records.iter().position(|r| r.key() == record.key()) {
            Some(index) => records[index] = record,
            None => records.push(record),
        }
        self.store_all(&records).await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|r| r.key() != key);
        if records.len() == before {
            return Ok(());
        }
        self.store_all(&records).await
    }

    async fn find(&self, key: &str) -> Result<Option<R>> {
        Ok(self.load().await?.into_iter().find(|r| r.key() == key))
    }

    async fn store_all(&self, records: &[R]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        self.store.set_item(self.key, &json).await
    }
}

/// Session repository over a flat blob store.
pub struct BlobSessionRepository {
    sessions: BlobCollection<SessionRecord>,
}

impl BlobSessionRepository {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            sessions: BlobCollection::new(store, SESSIONS_KEY),
        }
    }
}

#[async_trait]
impl SessionRepository for BlobSessionRepository {
    async fn save(&self, session: &Session) -> Result<()> {
        tracing::debug!("Saving session {} to blob store", session.session_id);
        self.sessions.upsert(SessionRecord::from(session)).await
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        self.sessions
            .find(session_id)
            .await?
            .map(Session::try_from)
            .transpose()
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        self.sessions
            .load()
            .await?
            .into_iter()
            .map(Session::try_from)
            .collect()
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.sessions.remove(session_id).await
    }
}

/// Comment repository over a flat blob store.
pub struct BlobCommentRepository {
    comments: BlobCollection<CommentRecord>,
}

impl BlobCommentRepository {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            comments: BlobCollection::new(store, COMMENTS_KEY),
        }
    }
}

#[async_trait]
impl CommentRepository for BlobCommentRepository {
    async fn save(&self, comment: &Comment) -> Result<()> {
        self.comments.upsert(CommentRecord::from(comment)).await
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Comment>> {
        self.comments
            .load()
            .await?
            .into_iter()
            .filter(|c| c.session_id == session_id)
            .map(Comment::try_from)
            .collect()
    }

    async fn delete(&self, comment_id: &str) -> Result<()> {
        self.comments.remove(comment_id).await
    }
}

/// Picture repository over a flat blob store.
pub struct BlobPictureRepository {
    pictures: BlobCollection<PictureRecord>,
}

impl BlobPictureRepository {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            pictures: BlobCollection::new(store, PICTURES_KEY),
        }
    }
}

#[async_trait]
impl PictureRepository for BlobPictureRepository {
    async fn save(&self, picture: &Picture) -> Result<()> {
        self.pictures.upsert(PictureRecord::from(picture)).await
    }

    async fn find_by_id(&self, picture_id: &str) -> Result<Option<Picture>> {
        Ok(self.pictures.find(picture_id).await?.map(Picture::from))
    }

    async fn delete(&self, picture_id: &str) -> Result<()> {
        self.pictures.remove(picture_id).await
    }
}
