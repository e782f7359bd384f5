use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use backend_lib::{
    config::Settings,
    create_router,
    storage::{FlatFileStorage, UserStore},
    AppState,
};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ex-libris", version, about = "Ex Libris library server")]
struct Cli {
    /// Path to the TOML config file (defaults to ./exlibris.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server
    Serve,
    /// Grant (or with --revoke, remove) admin rights for a user by email or username
    GrantAdmin {
        identifier: String,
        #[arg(long)]
        revoke: bool,
    },
}

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    settings.validate().context("refusing to start")?;

    let addr = settings.bind_addr;
    let state = Arc::new(AppState::from_settings(settings)?);
    let app = create_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn grant_admin(settings: Settings, identifier: &str, revoke: bool) -> anyhow::Result<()> {
    let storage = FlatFileStorage::new(&settings.data_dir)?;
    let user = storage.set_admin(identifier, !revoke).await?;
    info!(
        user_id = %user.id,
        username = %user.username,
        is_admin = user.is_admin,
        "admin flag updated; takes effect on the user's next login"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(&settings);

    match cli.command {
        Command::Serve => serve(settings).await,
        Command::GrantAdmin { identifier, revoke } => {
            grant_admin(settings, &identifier, revoke).await
        },
    }
}
