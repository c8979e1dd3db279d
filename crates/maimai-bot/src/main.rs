//! maimai bot binary.
//!
//! Loads the config (first argument, default `maimai.yaml`), connects to the
//! room once and runs a single session until the connection drops, a handler
//! escalates, or Ctrl+C / SIGTERM arrives.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{fmt, EnvFilter};

use maimai_bot::room::Stores;
use maimai_bot::session::{Collaborators, Session, SessionEnd};
use maimai_bot::store::{MemoryMessageLog, MemorySeenStore};
use maimai_bot::title::HttpTitleFetcher;
use maimai_bot::{config, transport};
use maimai_core::error::Result;

#[tokio::main]
async fn main() -> ExitCode {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(end) => {
            tracing::info!(?end, "maimai stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(code = e.code().as_str(), error = %e, "maimai failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<SessionEnd> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "maimai.yaml".to_string());
    let cfg = config::load_from_file(&path)?;

    let titles = Arc::new(HttpTitleFetcher::new(
        Duration::from_millis(cfg.links.fetch_timeout_ms),
        cfg.links.ignored_titles.clone(),
    )?);
    let stores = Stores {
        seen: Arc::new(MemorySeenStore::new()),
        log: Arc::new(MemoryMessageLog::new()),
    };

    let (outbox, outbound) = transport::outbox();
    let session = Session::new(&cfg, outbox, Collaborators { stores, titles })?;

    let url = cfg.room.url();
    let (mut source, writer) = transport::ws::connect(&url, outbound, session.kill_token()).await?;
    session.room().set_nick(&cfg.room.nick)?;
    tracing::info!(room = %cfg.room.name, nick = %cfg.room.nick, "maimai starting");

    let end = session.run(&mut source, shutdown_signal()).await;
    if let Err(e) = writer.await {
        tracing::warn!(error = %e, "writer task did not exit cleanly");
    }
    end
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}
