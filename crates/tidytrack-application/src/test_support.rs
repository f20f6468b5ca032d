//! In-memory doubles shared by the application tests.

use crate::session_usecase::SessionUseCase;
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tidytrack_core::error::{Result, TrackerError};
use tidytrack_core::picture::{Picture, PictureRepository};
use tidytrack_core::service::{IdGenerator, TimeService};
use tidytrack_core::session::{Comment, CommentRepository, Session, SessionRepository};

/// Instant every fixture clock starts at.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap()
}

/// Clock that only moves when told to.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl TimeService for FixedClock {
    fn current_time(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Generates "id-1", "id-2", ...
#[derive(Default)]
pub struct SequentialIds {
    next: AtomicUsize,
}

impl IdGenerator for SequentialIds {
    fn generate(&self) -> String {
        format!("id-{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

fn write_failure() -> TrackerError {
    TrackerError::storage("simulated write failure")
}

#[derive(Default)]
pub struct InMemorySessions {
    items: Mutex<Vec<Session>>,
    fail_writes: AtomicBool,
}

impl InMemorySessions {
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn get(&self, session_id: &str) -> Option<Session> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.session_id == session_id)
            .cloned()
    }

    /// Writes directly, bypassing the failure switch.
    pub fn put(&self, session: Session) {
        let mut items = self.items.lock().unwrap();
        match items.iter().position(|s| s.session_id == session.session_id) {
            Some(index) => items[index] = session,
            None => items.push(session),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessions {
    async fn save(&self, session: &Session) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(write_failure());
        }
        self.put(session.clone());
        Ok(())
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        Ok(self.get(session_id))
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(write_failure());
        }
        self.items
            .lock()
            .unwrap()
            .retain(|s| s.session_id != session_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryComments {
    items: Mutex<Vec<Comment>>,
}

impl InMemoryComments {
    pub fn for_session(&self, session_id: &str) -> Vec<Comment> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.session_id == session_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CommentRepository for InMemoryComments {
    async fn save(&self, comment: &Comment) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        match items.iter().position(|c| c.comment_id == comment.comment_id) {
            Some(index) => items[index] = comment.clone(),
            None => items.push(comment.clone()),
        }
        Ok(())
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Comment>> {
        Ok(self.for_session(session_id))
    }

    async fn delete(&self, comment_id: &str) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .retain(|c| c.comment_id != comment_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryPictures {
    items: Mutex<Vec<Picture>>,
}

impl InMemoryPictures {
    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PictureRepository for InMemoryPictures {
    async fn save(&self, picture: &Picture) -> Result<()> {
        let mut items = self.items.lock().unwrap();
        match items.iter().position(|p| p.picture_id == picture.picture_id) {
            Some(index) => items[index] = picture.clone(),
            None => items.push(picture.clone()),
        }
        Ok(())
    }

    async fn find_by_id(&self, picture_id: &str) -> Result<Option<Picture>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.picture_id == picture_id)
            .cloned())
    }

    async fn delete(&self, picture_id: &str) -> Result<()> {
        self.items
            .lock()
            .unwrap()
            .retain(|p| p.picture_id != picture_id);
        Ok(())
    }
}

/// A use case wired to in-memory doubles the test can inspect.
pub struct Fixture {
    pub usecase: Arc<SessionUseCase>,
    pub clock: Arc<FixedClock>,
    pub sessions: Arc<InMemorySessions>,
    pub comments: Arc<InMemoryComments>,
    pub pictures: Arc<InMemoryPictures>,
}

impl Fixture {
    pub fn new() -> Self {
        let clock = Arc::new(FixedClock::new(t0()));
        let sessions = Arc::new(InMemorySessions::default());
        let comments = Arc::new(InMemoryComments::default());
        let pictures = Arc::new(InMemoryPictures::default());

        let usecase = Arc::new(SessionUseCase::new(
            sessions.clone(),
            comments.clone(),
            pictures.clone(),
            clock.clone(),
            Arc::new(SequentialIds::default()),
        ));

        Self {
            usecase,
            clock,
            sessions,
            comments,
            pictures,
        }
    }
}
