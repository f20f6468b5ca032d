//! Session use case implementation.
//!
//! `SessionUseCase` enforces the session lifecycle over the repository ports:
//!
//! ```text
//!   start ──> IN_PROGRESS <──resume── PAUSED
//!                 │  └─────pause──────>  │
//!                 └──end──> ENDED <──end─┘
//! ```
//!
//! `ENDED` is terminal. Pausing a paused session and resuming a running one
//! are accepted no-ops.
//!
//! Multi-step writes are not atomic. When the final session write of
//! `start_session`, `add_comment*` or `end_session` fails, the record written
//! just before it (picture or comment) is deleted again, best effort, and the
//! original error is returned. `delete_session` removes children first, so a
//! failure part-way leaves the session in place and the call can be retried.

use std::sync::Arc;
use tidytrack_core::error::{Result, TrackerError};
use tidytrack_core::picture::{Picture, PictureRepository, PictureType};
use tidytrack_core::service::{IdGenerator, TimeService};
use tidytrack_core::session::{
    Comment, CommentRepository, Session, SessionRepository, SessionStatus,
};

/// Use case for the session lifecycle.
///
/// Time and identity come exclusively from the injected `TimeService` and
/// `IdGenerator`, so every timestamp and ID is reproducible under test.
pub struct SessionUseCase {
    /// Repository for session data persistence
    session_repository: Arc<dyn SessionRepository>,
    /// Repository for comments
    comment_repository: Arc<dyn CommentRepository>,
    /// Repository for before/after pictures
    picture_repository: Arc<dyn PictureRepository>,
    time_service: Arc<dyn TimeService>,
    id_generator: Arc<dyn IdGenerator>,
}

impl SessionUseCase {
    /// Creates a new `SessionUseCase` instance.
    pub fn new(
        session_repository: Arc<dyn SessionRepository>,
        comment_repository: Arc<dyn CommentRepository>,
        picture_repository: Arc<dyn PictureRepository>,
        time_service: Arc<dyn TimeService>,
        id_generator: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            session_repository,
            comment_repository,
            picture_repository,
            time_service,
            id_generator,
        }
    }

    /// Returns the clock this use case reads.
    pub fn time_service(&self) -> &Arc<dyn TimeService> {
        &self.time_service
    }

    /// Starts a new session.
    ///
    /// Saves the BEFORE picture, then the session in `IN_PROGRESS` linked to
    /// it. The title is stored as given; only its trimmed form must be
    /// non-empty.
    ///
    /// # Errors
    ///
    /// - `Validation` if the title is blank or `goal_time` is zero
    /// - any storage error from the repositories
    pub async fn start_session(
        &self,
        title: &str,
        goal_time: u32,
        before_picture_data: &str,
    ) -> Result<Session> {
        if title.trim().is_empty() {
            return Err(TrackerError::validation("Session title cannot be empty"));
        }
        if goal_time == 0 {
            return Err(TrackerError::validation(
                "Goal time must be greater than zero",
            ));
        }

        let session_id = self.id_generator.generate();
        let picture_id = self.id_generator.generate();

        let before_picture = Picture {
            picture_id: picture_id.clone(),
            session_id: session_id.clone(),
            picture_data: before_picture_data.to_string(),
            picture_type: PictureType::Before,
        };
        self.picture_repository.save(&before_picture).await?;

        let session = Session {
            session_id,
            title: title.to_string(),
            goal_time,
            start_time: self.time_service.current_time(),
            end_time: None,
            before_picture_id: Some(picture_id.clone()),
            after_picture_id: None,
            comments: Vec::new(),
            status: SessionStatus::InProgress,
        };
        if let Err(e) = self.session_repository.save(&session).await {
            self.discard_picture(&picture_id).await;
            return Err(e);
        }

        tracing::info!(
            "Started session {} ('{}', goal {} min)",
            session.session_id,
            session.title,
            session.goal_time
        );
        Ok(session)
    }

    /// Adds a text comment to a session that has not ended.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `InvalidState` if the session has ended
    pub async fn add_comment(&self, session_id: &str, text: &str) -> Result<Comment> {
        self.append_comment(session_id, text, None).await
    }

    /// Adds a comment carrying an encoded image to a session that has not ended.
    ///
    /// Same guards as [`SessionUseCase::add_comment`].
    pub async fn add_comment_with_picture(
        &self,
        session_id: &str,
        text: &str,
        picture_data: &str,
    ) -> Result<Comment> {
        self.append_comment(session_id, text, Some(picture_data.to_string()))
            .await
    }

    async fn append_comment(
        &self,
        session_id: &str,
        text: &str,
        picture_data: Option<String>,
    ) -> Result<Comment> {
        let mut session = self.load_session(session_id).await?;
        ensure_not_ended(&session, "Cannot add comments to an ended session")?;

        let comment = Comment {
            comment_id: self.id_generator.generate(),
            session_id: session_id.to_string(),
            timestamp: self.time_service.current_time(),
            text: text.to_string(),
            picture_data,
        };
        self.comment_repository.save(&comment).await?;

        session.comments.push(comment.clone());
        if let Err(e) = self.session_repository.update(&session).await {
            if let Err(cleanup) = self.comment_repository.delete(&comment.comment_id).await {
                tracing::warn!(
                    "Failed to remove orphaned comment {}: {}",
                    comment.comment_id,
                    cleanup
                );
            }
            return Err(e);
        }

        tracing::debug!(
            "Added comment {} to session {}",
            comment.comment_id,
            session_id
        );
        Ok(comment)
    }

    /// Pauses a session. Pausing a paused session succeeds without change.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `InvalidState` if the session has ended
    pub async fn pause_session(&self, session_id: &str) -> Result<Session> {
        self.set_status(
            session_id,
            SessionStatus::Paused,
            "Cannot pause an ended session",
        )
        .await
    }

    /// Resumes a session. Resuming a running session succeeds without change.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `InvalidState` if the session has ended
    pub async fn resume_session(&self, session_id: &str) -> Result<Session> {
        self.set_status(
            session_id,
            SessionStatus::InProgress,
            "Cannot resume an ended session",
        )
        .await
    }

    async fn set_status(
        &self,
        session_id: &str,
        status: SessionStatus,
        ended_message: &str,
    ) -> Result<Session> {
        let mut session = self.load_session(session_id).await?;
        ensure_not_ended(&session, ended_message)?;

        session.status = status;
        self.session_repository.update(&session).await?;

        tracing::debug!("Session {} is now {}", session_id, status);
        Ok(session)
    }

    /// Ends a session with an AFTER picture.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    /// - `InvalidState` if the session has already ended
    pub async fn end_session(&self, session_id: &str, after_picture_data: &str) -> Result<Session> {
        let mut session = self.load_session(session_id).await?;
        ensure_not_ended(&session, "Session is already ended")?;

        let picture_id = self.id_generator.generate();
        let after_picture = Picture {
            picture_id: picture_id.clone(),
            session_id: session_id.to_string(),
            picture_data: after_picture_data.to_string(),
            picture_type: PictureType::After,
        };
        self.picture_repository.save(&after_picture).await?;

        session.finish(self.time_service.current_time(), picture_id.clone());
        if let Err(e) = self.session_repository.update(&session).await {
            self.discard_picture(&picture_id).await;
            return Err(e);
        }

        tracing::info!("Ended session {}", session_id);
        Ok(session)
    }

    /// Returns every stored session.
    pub async fn get_all_sessions(&self) -> Result<Vec<Session>> {
        self.session_repository.list_all().await
    }

    /// Returns a session with its comments.
    ///
    /// If the stored session carries no comments, they are loaded from the
    /// comment repository.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    pub async fn get_session_details(&self, session_id: &str) -> Result<Session> {
        let mut session = self.load_session(session_id).await?;

        if session.comments.is_empty() {
            session.comments = self.comment_repository.list_by_session(session_id).await?;
        }

        Ok(session)
    }

    /// Returns a picture by ID, or `None` if there is no such picture.
    pub async fn get_picture(&self, picture_id: &str) -> Result<Option<Picture>> {
        self.picture_repository.find_by_id(picture_id).await
    }

    /// Deletes a session with its pictures and comments.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session does not exist
    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        let session = self.load_session(session_id).await?;

        for picture_id in [&session.before_picture_id, &session.after_picture_id]
            .into_iter()
            .flatten()
        {
            self.picture_repository.delete(picture_id).await?;
        }

        let comments = self.comment_repository.list_by_session(session_id).await?;
        for comment in &comments {
            self.comment_repository.delete(&comment.comment_id).await?;
        }

        self.session_repository.delete(session_id).await?;

        tracing::info!(
            "Deleted session {} ({} comments)",
            session_id,
            comments.len()
        );
        Ok(())
    }

    async fn load_session(&self, session_id: &str) -> Result<Session> {
        self.session_repository
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("session", session_id))
    }

    async fn discard_picture(&self, picture_id: &str) {
        if let Err(e) = self.picture_repository.delete(picture_id).await {
            tracing::warn!("Failed to remove orphaned picture {}: {}", picture_id, e);
        }
    }
}

fn ensure_not_ended(session: &Session, message: &str) -> Result<()> {
    if session.is_ended() {
        return Err(TrackerError::invalid_state(message));
    }
    Ok(())
}
