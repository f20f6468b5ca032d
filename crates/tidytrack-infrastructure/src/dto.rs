//! Persisted record shapes.
//!
//! Records are what the adapters actually store. Instants are kept as
//! RFC 3339 strings with nanosecond precision and a `Z` offset, so they parse
//! back to the identical instant regardless of the storage medium. Field
//! names are camelCase to keep the stored JSON compatible with records
//! written by the browser build.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tidytrack_core::error::{Result, TrackerError};
use tidytrack_core::picture::{Picture, PictureType};
use tidytrack_core::session::{Comment, Session, SessionStatus};

/// Formats an instant in the persisted representation.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parses an instant from the persisted representation.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

/// Records that are addressed by a primary key.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Stored shape of a [`Comment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRecord {
    pub comment_id: String,
    pub session_id: String,
    pub timestamp: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture_data: Option<String>,
}

impl From<&Comment> for CommentRecord {
    fn from(comment: &Comment) -> Self {
        CommentRecord {
            comment_id: comment.comment_id.clone(),
            session_id: comment.session_id.clone(),
            timestamp: format_instant(&comment.timestamp),
            text: comment.text.clone(),
            picture_data: comment.picture_data.clone(),
        }
    }
}

impl TryFrom<CommentRecord> for Comment {
    type Error = TrackerError;

    fn try_from(record: CommentRecord) -> Result<Self> {
        Ok(Comment {
            timestamp: parse_instant(&record.timestamp)?,
            comment_id: record.comment_id,
            session_id: record.session_id,
            text: record.text,
            picture_data: record.picture_data,
        })
    }
}

impl Keyed for CommentRecord {
    fn key(&self) -> &str {
        &self.comment_id
    }
}

/// Stored shape of a [`Session`], comments embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_id: String,
    pub title: String,
    pub goal_time: u32,
    pub start_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before_picture_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_picture_id: Option<String>,
    #[serde(default)]
    pub comments: Vec<CommentRecord>,
    pub session_status: SessionStatus,
}

impl From<&Session> for SessionRecord {
    fn from(session: &Session) -> Self {
        SessionRecord {
            session_id: session.session_id.clone(),
            title: session.title.clone(),
            goal_time: session.goal_time,
            start_time: format_instant(&session.start_time),
            end_time: session.end_time.as_ref().map(format_instant),
            before_picture_id: session.before_picture_id.clone(),
            after_picture_id: session.after_picture_id.clone(),
            comments: session.comments.iter().map(CommentRecord::from).collect(),
            session_status: session.status,
        }
    }
}

impl TryFrom<SessionRecord> for Session {
    type Error = TrackerError;

    fn try_from(record: SessionRecord) -> Result<Self> {
        let comments = record
            .comments
            .into_iter()
            .map(Comment::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Session {
            start_time: parse_instant(&record.start_time)?,
            end_time: record.end_time.as_deref().map(parse_instant).transpose()?,
            session_id: record.session_id,
            title: record.title,
            goal_time: record.goal_time,
            before_picture_id: record.before_picture_id,
            after_picture_id: record.after_picture_id,
            comments,
            status: record.session_status,
        })
    }
}

impl Keyed for SessionRecord {
    fn key(&self) -> &str {
        &self.session_id
    }
}

/// Stored shape of a [`Picture`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureRecord {
    pub picture_id: String,
    pub session_id: String,
    pub picture_data: String,
    pub picture_type: PictureType,
}

impl From<&Picture> for PictureRecord {
    fn from(picture: &Picture) -> Self {
        PictureRecord {
            picture_id: picture.picture_id.clone(),
            session_id: picture.session_id.clone(),
            picture_data: picture.picture_data.clone(),
            picture_type: picture.picture_type,
        }
    }
}

impl From<PictureRecord> for Picture {
    fn from(record: PictureRecord) -> Self {
        Picture {
            picture_id: record.picture_id,
            session_id: record.session_id,
            picture_data: record.picture_data,
            picture_type: record.picture_type,
        }
    }
}

impl Keyed for PictureRecord {
    fn key(&self) -> &str {
        &self.picture_id
    }
}
