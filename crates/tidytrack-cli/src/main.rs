use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tidytrack_infrastructure::{AppConfig, StorageBackend, TrackerPaths};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tidytrack")]
#[command(about = "Tidytrack - timed tidy-up sessions with before/after photos", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Storage backend: sqlite or blob
    #[arg(long, global = true)]
    backend: Option<StorageBackend>,

    /// Directory holding session data
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session with a "before" photo
    Start {
        #[arg(long)]
        title: String,
        /// Goal time in minutes
        #[arg(long)]
        goal: u32,
        /// Image file used as the before photo
        #[arg(long)]
        photo: PathBuf,
    },
    /// Add a comment to a running or paused session
    Comment {
        id: String,
        text: String,
        /// Attach an image file to the comment
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Pause a session
    Pause { id: String },
    /// Resume a paused session
    Resume { id: String },
    /// End a session with an "after" photo
    End {
        id: String,
        #[arg(long)]
        photo: PathBuf,
    },
    /// List all sessions
    List,
    /// Show a session with its comments
    Show { id: String },
    /// Show a stored picture, or write it to a file
    Picture {
        id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Delete a session with its pictures and comments
    Delete { id: String },
    /// Install the offline cache against a server and resolve paths through it
    CacheCheck {
        #[arg(long)]
        base_url: String,
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => TrackerPaths::new(None).config_file()?,
    };
    let mut config = AppConfig::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    tracing::debug!("Loaded config from {}", path.display());

    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = Some(dir.clone());
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let ctx = commands::build_context(config)?;
    let service = ctx.session_service();

    match cli.command {
        Commands::Start { title, goal, photo } => {
            commands::session::start(service, &title, goal, &photo).await?
        }
        Commands::Comment { id, text, photo } => {
            commands::session::comment(service, &id, &text, photo.as_deref()).await?
        }
        Commands::Pause { id } => commands::session::pause(service, &id).await?,
        Commands::Resume { id } => commands::session::resume(service, &id).await?,
        Commands::End { id, photo } => commands::session::end(service, &id, &photo).await?,
        Commands::List => commands::session::list(service).await?,
        Commands::Show { id } => commands::session::show(service, &id).await?,
        Commands::Picture { id, out } => {
            commands::session::picture(service, &id, out.as_deref()).await?
        }
        Commands::Delete { id } => commands::session::delete(service, &id).await?,
        Commands::CacheCheck { base_url, paths } => {
            commands::cache::check(ctx.config(), &base_url, &paths).await?
        }
    }

    Ok(())
}
