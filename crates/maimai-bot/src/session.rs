//! Session wiring for one room connection.
//!
//! - Build the Room (outbox, stores, error channel)
//! - Register the enabled handlers with the dispatcher
//! - Supervise: stop on connection end, external shutdown, or the first
//!   escalated handler error

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use maimai_core::error::{MaimaiError, Result};

use crate::config::BotConfig;
use crate::dispatch::{Dispatcher, Stopped};
use crate::handlers;
use crate::room::{Room, Stores};
use crate::title::TitleFetcher;
use crate::transport::{Outbox, PacketSource};

/// External collaborators the session does not own the internals of.
#[derive(Clone)]
pub struct Collaborators {
    pub stores: Stores,
    pub titles: Arc<dyn TitleFetcher>,
}

/// How a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The connection closed; the caller may reconnect with a fresh session.
    Disconnected,
    /// Shutdown was requested.
    Shutdown,
}

pub struct Session {
    room: Arc<Room>,
    dispatcher: Dispatcher,
    errors: mpsc::UnboundedReceiver<MaimaiError>,
}

impl Session {
    pub fn new(cfg: &BotConfig, outbox: Outbox, collab: Collaborators) -> Result<Self> {
        let (err_tx, errors) = mpsc::unbounded_channel();
        let room = Arc::new(Room::new(cfg.room.name.clone(), outbox, collab.stores, err_tx));

        let mut dispatcher = Dispatcher::new(cfg.dispatch.queue);
        for handler in handlers::build(cfg, collab.titles, &dispatcher.kill_token())? {
            dispatcher.register(Arc::clone(&room), handler);
        }

        tracing::info!(room = %cfg.room.name, handlers = ?dispatcher.live_handlers(), "session ready");
        Ok(Self {
            room,
            dispatcher,
            errors,
        })
    }

    pub fn room(&self) -> Arc<Room> {
        Arc::clone(&self.room)
    }

    pub fn kill_token(&self) -> CancellationToken {
        self.dispatcher.kill_token()
    }

    pub fn live_handlers(&self) -> Vec<&'static str> {
        self.dispatcher.live_handlers()
    }

    /// Pump `source` through the handlers until the connection ends,
    /// `shutdown` resolves, or a handler escalates. Handlers are always
    /// stopped and joined before returning; an escalation raised while they
    /// finish is returned as the error.
    pub async fn run<S, F>(mut self, source: &mut S, shutdown: F) -> Result<SessionEnd>
    where
        S: PacketSource + ?Sized,
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let outcome = tokio::select! {
            stopped = self.dispatcher.run(source) => match stopped {
                Stopped::SourceClosed => Ok(SessionEnd::Disconnected),
                Stopped::Killed => Ok(SessionEnd::Shutdown),
            },
            Some(err) = self.errors.recv() => Err(err),
            _ = &mut shutdown => Ok(SessionEnd::Shutdown),
        };

        match outcome {
            // Let handlers finish what already arrived.
            Ok(SessionEnd::Disconnected) => self.dispatcher.drain().await,
            _ => self.dispatcher.join().await,
        }

        // Escalations raised while handlers wound down still end the session.
        let outcome = match (outcome, self.errors.try_recv()) {
            (Ok(_), Ok(err)) => Err(err),
            (outcome, _) => outcome,
        };
        tracing::info!(room = %self.room.name(), ?outcome, "session finished");
        outcome
    }
}
