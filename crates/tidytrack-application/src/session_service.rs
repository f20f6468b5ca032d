//! Session service facade.
//!
//! `SessionService` is what a UI drives. Every lifecycle operation delegates
//! to [`SessionUseCase`]; the service adds the display helpers for elapsed
//! time and local dates.

use crate::session_usecase::SessionUseCase;
use chrono::{DateTime, Local, TimeZone, Utc};
use std::sync::Arc;
use tidytrack_core::error::Result;
use tidytrack_core::picture::Picture;
use tidytrack_core::session::{Comment, Session};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Facade over the session use case.
#[derive(Clone)]
pub struct SessionService {
    usecase: Arc<SessionUseCase>,
}

impl SessionService {
    /// Creates a new SessionService.
    ///
    /// # Arguments
    ///
    /// * `usecase` - The use case every operation delegates to
    pub fn new(usecase: Arc<SessionUseCase>) -> Self {
        Self { usecase }
    }

    pub async fn start_session(
        &self,
        title: &str,
        goal_time: u32,
        before_picture_data: &str,
    ) -> Result<Session> {
        self.usecase
            .start_session(title, goal_time, before_picture_data)
            .await
    }

    pub async fn add_comment(&self, session_id: &str, text: &str) -> Result<Comment> {
        self.usecase.add_comment(session_id, text).await
    }

    pub async fn add_comment_with_picture(
        &self,
        session_id: &str,
        text: &str,
        picture_data: &str,
    ) -> Result<Comment> {
        self.usecase
            .add_comment_with_picture(session_id, text, picture_data)
            .await
    }

    pub async fn pause_session(&self, session_id: &str) -> Result<Session> {
        self.usecase.pause_session(session_id).await
    }

    pub async fn resume_session(&self, session_id: &str) -> Result<Session> {
        self.usecase.resume_session(session_id).await
    }

    pub async fn end_session(&self, session_id: &str, after_picture_data: &str) -> Result<Session> {
        self.usecase
            .end_session(session_id, after_picture_data)
            .await
    }

    pub async fn get_all_sessions(&self) -> Result<Vec<Session>> {
        self.usecase.get_all_sessions().await
    }

    pub async fn get_session_details(&self, session_id: &str) -> Result<Session> {
        self.usecase.get_session_details(session_id).await
    }

    pub async fn get_picture(&self, picture_id: &str) -> Result<Option<Picture>> {
        self.usecase.get_picture(picture_id).await
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.usecase.delete_session(session_id).await
    }

    /// Formats the span from `start` to `end` as `HH:MM:SS`.
    ///
    /// A running session (`end == None`) is measured up to the use case's
    /// clock. Partial seconds are dropped, hours are not capped at 24, and a
    /// span that ends before it starts renders as `00:00:00`.
    pub fn format_duration(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> String {
        let end = end.unwrap_or_else(|| self.usecase.time_service().current_time());
        format_span(start, end)
    }

    /// Formats an instant in the machine's local time zone as
    /// `YYYY-MM-DD HH:MM:SS`.
    pub fn format_date(&self, instant: DateTime<Utc>) -> String {
        format_in_zone(instant, &Local)
    }
}

fn format_span(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let total = (end - start).num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

fn format_in_zone<Tz>(instant: DateTime<Utc>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    instant.with_timezone(zone).format(DATE_FORMAT).to_string()
}
