//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Core session entity (`Session`) and its lifecycle status
//! - `comment`: Timestamped comments attached to a session
//! - `repository`: Repository traits for session and comment persistence

mod comment;
mod model;
mod repository;

// Re-export public API
pub use comment::Comment;
pub use model::{Session, SessionStatus};
pub use repository::{CommentRepository, SessionRepository};
