//! Comment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A timestamped note attached to a session.
///
/// Comments are immutable once created and live no longer than their session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Opaque unique identifier
    pub comment_id: String,
    /// Owning session
    pub session_id: String,
    /// When the comment was made
    pub timestamp: DateTime<Utc>,
    /// Comment body
    pub text: String,
    /// Optional encoded image attached to the comment
    pub picture_data: Option<String>,
}
