//! Session domain model.

use super::comment::Comment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a session.
///
/// A session starts `InProgress`, may move between `InProgress` and `Paused`
/// any number of times, and ends in `Ended`, which has no outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    /// The session is running.
    InProgress,
    /// The session is temporarily paused.
    Paused,
    /// The session is finished. Terminal.
    Ended,
}

impl SessionStatus {
    /// Returns the persisted tag for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::InProgress => "IN_PROGRESS",
            SessionStatus::Paused => "PAUSED",
            SessionStatus::Ended => "ENDED",
        }
    }

    /// Parses a persisted tag back into a status.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "IN_PROGRESS" => Some(SessionStatus::InProgress),
            "PAUSED" => Some(SessionStatus::Paused),
            "ENDED" => Some(SessionStatus::Ended),
            _ => None,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked tidy-up session.
///
/// `end_time` is set if and only if `status` is [`SessionStatus::Ended`].
/// `comments` keeps insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque unique identifier
    pub session_id: String,
    /// Human-readable title, stored as entered
    pub title: String,
    /// Goal duration in minutes
    pub goal_time: u32,
    /// When the session was started
    pub start_time: DateTime<Utc>,
    /// When the session was ended
    pub end_time: Option<DateTime<Utc>>,
    /// Picture taken when the session started
    pub before_picture_id: Option<String>,
    /// Picture taken when the session ended
    pub after_picture_id: Option<String>,
    /// Comments in the order they were added
    pub comments: Vec<Comment>,
    /// Current lifecycle status
    pub status: SessionStatus,
}

impl Session {
    /// Returns true once the session has reached its terminal state.
    pub fn is_ended(&self) -> bool {
        self.status == SessionStatus::Ended
    }

    /// Moves the session to `Ended`, keeping `end_time` and `status` in step.
    pub fn finish(&mut self, at: DateTime<Utc>, after_picture_id: String) {
        self.after_picture_id = Some(after_picture_id);
        self.end_time = Some(at);
        self.status = SessionStatus::Ended;
    }
}
