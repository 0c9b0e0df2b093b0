//! Tenancy Server: application entry point.

mod config;
mod state;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tenancy_auth::AuthError;
use tenancy_db::{DbError, DbManager};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ConfigError, ServerConfig};
use crate::state::AppState;

#[derive(Debug, Parser)]
#[command(name = "tenancy-server", about = "Multi-tenant accounts and sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations, then serve until interrupted (default).
    Serve,
    /// Apply pending migrations and exit.
    Migrate,
    /// Write the migration scripts to a directory.
    Generate {
        #[arg(long, default_value = "database/migrations")]
        out: PathBuf,
    },
    /// Delete expired sessions and exit.
    PurgeSessions,
}

#[derive(Debug, thiserror::Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

#[tokio::main]
async fn main() {
    let _env = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "tenancy=info".into()))
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        error!(error = %err, "tenancy server failed");
        eprintln!("{err}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Migrate => {
            let db = DbManager::connect(&config.database).await?;
            tenancy_db::run_migrations(db.pool()).await?;
            Ok(())
        }
        Command::Generate { out } => {
            let written = tenancy_db::write_migration_files(&out)?;
            for path in written {
                info!(path = %path.display(), "migration written");
            }
            Ok(())
        }
        Command::PurgeSessions => {
            let db = DbManager::connect(&config.database).await?;
            let state = AppState::new(db.pool().clone(), &config);
            let removed = state.sessions.delete_expired_sessions().await?;
            println!("removed {removed} expired sessions");
            Ok(())
        }
    }
}

async fn serve(config: &ServerConfig) -> Result<(), ServerError> {
    info!(mode = %config.mode, "Starting tenancy server...");

    let db = DbManager::connect(&config.database).await?;
    tenancy_db::run_migrations(db.pool()).await?;

    let state = AppState::new(db.pool().clone(), config);
    info!(
        cookie = %state.sessions.config().cookie_name,
        secure = state.sessions.config().secure_cookies,
        "session service ready"
    );

    shutdown_signal().await;

    db.pool().close().await;
    info!("Tenancy server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("signal received, starting graceful shutdown");
}
