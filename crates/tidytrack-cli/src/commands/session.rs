use anyhow::{Context, Result, bail};
use std::path::Path;
use tidytrack_application::SessionService;
use tidytrack_core::camera::CameraDevice;
use tidytrack_core::session::{Session, SessionStatus};
use tidytrack_infrastructure::FileCameraDevice;
use tidytrack_infrastructure::camera::decode_data_url;

/// Captures one frame from an image file.
async fn capture(photo: &Path) -> Result<String> {
    let camera = FileCameraDevice::new(photo);
    camera.initialize().await?;
    let picture = camera.take_picture().await;
    camera.stop().await;
    Ok(picture?)
}

fn status_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::InProgress => "in progress",
        SessionStatus::Paused => "paused",
        SessionStatus::Ended => "ended",
    }
}

fn print_summary(service: &SessionService, session: &Session) {
    println!(
        "{}  {}  [{}]  {} / {} min  started {}",
        session.session_id,
        session.title,
        status_label(session.status),
        service.format_duration(session.start_time, session.end_time),
        session.goal_time,
        service.format_date(session.start_time),
    );
}

pub async fn start(service: &SessionService, title: &str, goal: u32, photo: &Path) -> Result<()> {
    let before = capture(photo).await?;
    let session = service.start_session(title, goal, &before).await?;
    println!("Started session {}", session.session_id);
    Ok(())
}

pub async fn comment(
    service: &SessionService,
    id: &str,
    text: &str,
    photo: Option<&Path>,
) -> Result<()> {
    let comment = match photo {
        Some(photo) => {
            let picture = capture(photo).await?;
            service.add_comment_with_picture(id, text, &picture).await?
        }
        None => service.add_comment(id, text).await?,
    };
    println!(
        "Added comment {} at {}",
        comment.comment_id,
        service.format_date(comment.timestamp)
    );
    Ok(())
}

pub async fn pause(service: &SessionService, id: &str) -> Result<()> {
    let session = service.pause_session(id).await?;
    println!(
        "Session {} is {}",
        session.session_id,
        status_label(session.status)
    );
    Ok(())
}

pub async fn resume(service: &SessionService, id: &str) -> Result<()> {
    let session = service.resume_session(id).await?;
    println!(
        "Session {} is {}",
        session.session_id,
        status_label(session.status)
    );
    Ok(())
}

pub async fn end(service: &SessionService, id: &str, photo: &Path) -> Result<()> {
    let after = capture(photo).await?;
    let session = service.end_session(id, &after).await?;
    println!(
        "Ended session {} after {} (goal {} min)",
        session.session_id,
        service.format_duration(session.start_time, session.end_time),
        session.goal_time
    );
    Ok(())
}

pub async fn list(service: &SessionService) -> Result<()> {
    let sessions = service.get_all_sessions().await?;
    if sessions.is_empty() {
        println!("No sessions yet.");
        return Ok(());
    }
    for session in &sessions {
        print_summary(service, session);
    }
    Ok(())
}

pub async fn show(service: &SessionService, id: &str) -> Result<()> {
    let session = service.get_session_details(id).await?;
    print_summary(service, &session);

    if let Some(end_time) = session.end_time {
        println!("  ended    {}", service.format_date(end_time));
    }
    if let Some(picture_id) = &session.before_picture_id {
        println!("  before   {}", picture_id);
    }
    if let Some(picture_id) = &session.after_picture_id {
        println!("  after    {}", picture_id);
    }

    if session.comments.is_empty() {
        println!("  (no comments)");
    }
    for comment in &session.comments {
        let marker = if comment.picture_data.is_some() {
            " [photo]"
        } else {
            ""
        };
        println!(
            "  {}  {}{}",
            service.format_date(comment.timestamp),
            comment.text,
            marker
        );
    }
    Ok(())
}

pub async fn picture(service: &SessionService, id: &str, out: Option<&Path>) -> Result<()> {
    let Some(picture) = service.get_picture(id).await? else {
        bail!("Picture '{}' not found", id);
    };

    let decoded = decode_data_url(&picture.picture_data);
    match out {
        Some(out) => {
            let Some((_, bytes)) = decoded else {
                bail!("Picture '{}' is not a base64 data URL", id);
            };
            tokio::fs::write(out, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", out.display()))?;
            println!("Wrote {} bytes to {}", bytes.len(), out.display());
        }
        None => {
            let (mime, size) = match &decoded {
                Some((mime, bytes)) => (mime.as_str(), bytes.len()),
                None => ("unknown", picture.picture_data.len()),
            };
            println!(
                "{}  session {}  {}  {}  {} bytes",
                picture.picture_id, picture.session_id, picture.picture_type, mime, size
            );
        }
    }
    Ok(())
}

pub async fn delete(service: &SessionService, id: &str) -> Result<()> {
    service.delete_session(id).await?;
    println!("Deleted session {}", id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_capture_reads_photo_as_data_url() {
        let dir = TempDir::new().unwrap();
        let photo = dir.path().join("before.png");
        std::fs::write(&photo, b"\x89PNG").unwrap();

        let data = capture(&photo).await.unwrap();

        assert!(data.starts_with("data:image/png;base64,"));
        let (_, bytes) = decode_data_url(&data).unwrap();
        assert_eq!(bytes, b"\x89PNG");
    }

    #[tokio::test]
    async fn test_capture_missing_photo_fails() {
        let dir = TempDir::new().unwrap();
        assert!(capture(&dir.path().join("missing.jpg")).await.is_err());
    }
}
