//! Session and comment repository traits.
//!
//! Define the interface for session and comment persistence operations.

use super::{Comment, Session};
use crate::error::Result;
use async_trait::async_trait;

/// An abstract repository for managing session persistence.
///
/// This trait defines the contract for persisting and retrieving sessions,
/// decoupling the use cases from the specific storage mechanism (SQLite,
/// flat key-value blobs, in-memory test doubles).
///
/// # Implementation Notes
///
/// Implementations must:
/// - Round-trip `start_time`/`end_time` and comment timestamps exactly
/// - Return owned copies, so callers cannot corrupt stored state
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Saves a session, overwriting any session with the same ID.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Finds a session by its ID.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: Session found
    /// - `Ok(None)`: Session not found
    /// - `Err(_)`: Error occurred during retrieval
    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>>;

    /// Lists all stored sessions.
    async fn list_all(&self) -> Result<Vec<Session>>;

    /// Updates a session. Same semantics as [`SessionRepository::save`].
    async fn update(&self, session: &Session) -> Result<()> {
        self.save(session).await
    }

    /// Deletes a session from storage.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Session deleted successfully (or didn't exist)
    /// - `Err(_)`: Error occurred during deletion
    async fn delete(&self, session_id: &str) -> Result<()>;
}

/// An abstract repository for managing comment persistence.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Saves a comment, overwriting any comment with the same ID.
    async fn save(&self, comment: &Comment) -> Result<()>;

    /// Lists the comments belonging to a session.
    ///
    /// # Arguments
    ///
    /// * `session_id` - The session ID to filter by
    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Comment>>;

    /// Deletes a comment. Deleting a missing comment succeeds.
    async fn delete(&self, comment_id: &str) -> Result<()>;
}
