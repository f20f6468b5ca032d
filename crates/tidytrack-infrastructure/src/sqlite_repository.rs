//! SQLite-backed repository implementations.
//!
//! All three repositories share one [`SqliteDatabase`]. Rows are mapped
//! through the same records the blob adapter stores, so both adapters agree
//! on instant formatting and status tags. Upserts use `ON CONFLICT DO UPDATE`
//! to keep the original rowid, and listings are ordered by rowid, which gives
//! first-insertion order.

use crate::dto::{CommentRecord, PictureRecord, SessionRecord, format_instant};
use crate::sqlite_database::SqliteDatabase;
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::sync::Arc;
use tidytrack_core::error::{Result, TrackerError};
use tidytrack_core::picture::{Picture, PictureRepository, PictureType};
use tidytrack_core::session::{
    Comment, CommentRepository, Session, SessionRepository, SessionStatus,
};

fn storage_error(context: &'static str) -> impl Fn(sqlx::Error) -> TrackerError {
    move |e| TrackerError::storage(format!("{}: {}", context, e))
}

fn column<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(name).map_err(|e| {
        TrackerError::storage(format!("Failed to read column '{}': {}", name, e))
    })
}

fn session_from_row(row: &SqliteRow) -> Result<Session> {
    let status_tag: String = column(row, "session_status")?;
    let session_status = SessionStatus::parse(&status_tag)
        .ok_or_else(|| TrackerError::storage(format!("Unknown session status '{}'", status_tag)))?;
    let goal_time: i64 = column(row, "goal_time")?;
    let comments_json: String = column(row, "comments")?;

    let record = SessionRecord {
        session_id: column(row, "session_id")?,
        title: column(row, "title")?,
        goal_time: u32::try_from(goal_time)
            .map_err(|_| TrackerError::storage(format!("Goal time out of range: {}", goal_time)))?,
        start_time: column(row, "start_time")?,
        end_time: column(row, "end_time")?,
        before_picture_id: column(row, "before_picture_id")?,
        after_picture_id: column(row, "after_picture_id")?,
        comments: serde_json::from_str(&comments_json)?,
        session_status,
    };
    Session::try_from(record)
}

fn comment_from_row(row: &SqliteRow) -> Result<Comment> {
    let record = CommentRecord {
        comment_id: column(row, "comment_id")?,
        session_id: column(row, "session_id")?,
        timestamp: column(row, "timestamp")?,
        text: column(row, "text")?,
        picture_data: column(row, "picture_data")?,
    };
    Comment::try_from(record)
}

fn picture_from_row(row: &SqliteRow) -> Result<Picture> {
    let type_tag: String = column(row, "picture_type")?;
    let picture_type = PictureType::parse(&type_tag)
        .ok_or_else(|| TrackerError::storage(format!("Unknown picture type '{}'", type_tag)))?;

    Ok(PictureRecord {
        picture_id: column(row, "picture_id")?,
        session_id: column(row, "session_id")?,
        picture_data: column(row, "picture_data")?,
        picture_type,
    }
    .into())
}

/// Session repository over the structured store.
pub struct SqliteSessionRepository {
    db: Arc<SqliteDatabase>,
}

impl SqliteSessionRepository {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepository {
    async fn save(&self, session: &Session) -> Result<()> {
        let pool = self.db.pool().await?;
        let comments: Vec<CommentRecord> =
            session.comments.iter().map(CommentRecord::from).collect();
        let comments_json = serde_json::to_string(&comments)?;

        tracing::debug!("Saving session {} to sqlite", session.session_id);

        sqlx::query(
            r#"
            INSERT INTO sessions (
                session_id, title, goal_time, start_time, end_time,
                before_picture_id, after_picture_id, comments, session_status
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(session_id) DO UPDATE SET
                title = excluded.title,
                goal_time = excluded.goal_time,
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                before_picture_id = excluded.before_picture_id,
                after_picture_id = excluded.after_picture_id,
                comments = excluded.comments,
                session_status = excluded.session_status
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.title)
        .bind(i64::from(session.goal_time))
        .bind(format_instant(&session.start_time))
        .bind(session.end_time.as_ref().map(format_instant))
        .bind(&session.before_picture_id)
        .bind(&session.after_picture_id)
        .bind(comments_json)
        .bind(session.status.as_str())
        .execute(pool)
        .await
        .map_err(storage_error("Failed to save session"))?;

        Ok(())
    }

    async fn find_by_id(&self, session_id: &str) -> Result<Option<Session>> {
        let pool = self.db.pool().await?;
        let row = sqlx::query("SELECT * FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .fetch_optional(pool)
            .await
            .map_err(storage_error("Failed to load session"))?;

        row.as_ref().map(session_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Session>> {
        let pool = self.db.pool().await?;
        let rows = sqlx::query("SELECT * FROM sessions ORDER BY rowid")
            .fetch_all(pool)
            .await
            .map_err(storage_error("Failed to list sessions"))?;

        rows.iter().map(session_from_row).collect()
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let pool = self.db.pool().await?;
        sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(session_id)
            .execute(pool)
            .await
            .map_err(storage_error("Failed to delete session"))?;
        Ok(())
    }
}

/// Comment repository over the structured store.
pub struct SqliteCommentRepository {
    db: Arc<SqliteDatabase>,
}

impl SqliteCommentRepository {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn save(&self, comment: &Comment) -> Result<()> {
        let pool = self.db.pool().await?;
        sqlx::query(
            r#"
            INSERT INTO comments (comment_id, session_id, timestamp, text, picture_data)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(comment_id) DO UPDATE SET
                session_id = excluded.session_id,
                timestamp = excluded.timestamp,
                text = excluded.text,
                picture_data = excluded.picture_data
            "#,
        )
        .bind(&comment.comment_id)
        .bind(&comment.session_id)
        .bind(format_instant(&comment.timestamp))
        .bind(&comment.text)
        .bind(&comment.picture_data)
        .execute(pool)
        .await
        .map_err(storage_error("Failed to save comment"))?;
        Ok(())
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Comment>> {
        let pool = self.db.pool().await?;
        let rows = sqlx::query("SELECT * FROM comments WHERE session_id = ? ORDER BY rowid")
            .bind(session_id)
            .fetch_all(pool)
            .await
            .map_err(storage_error("Failed to list comments"))?;

        rows.iter().map(comment_from_row).collect()
    }

    async fn delete(&self, comment_id: &str) -> Result<()> {
        let pool = self.db.pool().await?;
        sqlx::query("DELETE FROM comments WHERE comment_id = ?")
            .bind(comment_id)
            .execute(pool)
            .await
            .map_err(storage_error("Failed to delete comment"))?;
        Ok(())
    }
}

/// Picture repository over the structured store.
pub struct SqlitePictureRepository {
    db: Arc<SqliteDatabase>,
}

impl SqlitePictureRepository {
    pub fn new(db: Arc<SqliteDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PictureRepository for SqlitePictureRepository {
    async fn save(&self, picture: &Picture) -> Result<()> {
        let pool = self.db.pool().await?;
        sqlx::query(
            r#"
            INSERT INTO pictures (picture_id, session_id, picture_data, picture_type)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(picture_id) DO UPDATE SET
                session_id = excluded.session_id,
                picture_data = excluded.picture_data,
                picture_type = excluded.picture_type
            "#,
        )
        .bind(&picture.picture_id)
        .bind(&picture.session_id)
        .bind(&picture.picture_data)
        .bind(picture.picture_type.as_str())
        .execute(pool)
        .await
        .map_err(storage_error("Failed to save picture"))?;
        Ok(())
    }

    async fn find_by_id(&self, picture_id: &str) -> Result<Option<Picture>> {
        let pool = self.db.pool().await?;
        let row = sqlx::query("SELECT * FROM pictures WHERE picture_id = ?")
            .bind(picture_id)
            .fetch_optional(pool)
            .await
            .map_err(storage_error("Failed to load picture"))?;

        row.as_ref().map(picture_from_row).transpose()
    }

    async fn delete(&self, picture_id: &str) -> Result<()> {
        let pool = self.db.pool().await?;
        sqlx::query("DELETE FROM pictures WHERE picture_id = ?")
            .bind(picture_id)
            .execute(pool)
            .await
            .map_err(storage_error("Failed to delete picture"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_unknown_status_tag_is_a_storage_error() {
        let db = Arc::new(SqliteDatabase::in_memory());
        let pool = db.pool().await.unwrap();
        sqlx::query(
            "INSERT INTO sessions VALUES ('s-1', 'x', 5, '2025-01-01T00:00:00Z', NULL, NULL, NULL, '[]', 'DONE')",
        )
        .execute(pool)
        .await
        .unwrap();

        let repo = SqliteSessionRepository::new(db);
        let err = repo.find_by_id("s-1").await.unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn test_upsert_keeps_listing_position() {
        let db = Arc::new(SqliteDatabase::in_memory());
        let repo = SqliteSessionRepository::new(db);
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();

        let mut first = Session {
            session_id: "a".to_string(),
            title: "A".to_string(),
            goal_time: 10,
            start_time: start,
            end_time: None,
            before_picture_id: None,
            after_picture_id: None,
            comments: Vec::new(),
            status: SessionStatus::InProgress,
        };
        let second = Session {
            session_id: "b".to_string(),
            title: "B".to_string(),
            ..first.clone()
        };

        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();
        first.status = SessionStatus::Paused;
        repo.update(&first).await.unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].session_id, "a");
        assert_eq!(all[0].status, SessionStatus::Paused);
        assert_eq!(all[1].session_id, "b");
    }
}
