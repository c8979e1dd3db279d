use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use maimai_core::error::Result;
use maimai_core::protocol::Packet;

use crate::config::QueuePolicy;
use crate::room::Room;
use crate::transport::PacketSource;

/// One reaction policy, run as its own task.
///
/// Every handler sees every packet; `wants` is the filter, `react` runs once
/// per wanted packet, sequentially, in arrival order. The packet is shared
/// with the other handlers and is read-only.
#[async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &'static str;
    fn wants(&self, packet: &Packet) -> bool;
    async fn react(&self, room: &Arc<Room>, packet: &Packet) -> Result<()>;
}

/// Why `Dispatcher::run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stopped {
    /// The connection ended.
    SourceClosed,
    /// Shutdown was signalled.
    Killed,
}

enum Inlet {
    Bounded(mpsc::Sender<Arc<Packet>>),
    Unbounded(mpsc::UnboundedSender<Arc<Packet>>),
}

impl Inlet {
    fn is_closed(&self) -> bool {
        match self {
            Inlet::Bounded(tx) => tx.is_closed(),
            Inlet::Unbounded(tx) => tx.is_closed(),
        }
    }
}

enum Intake {
    Bounded(mpsc::Receiver<Arc<Packet>>),
    Unbounded(mpsc::UnboundedReceiver<Arc<Packet>>),
}

impl Intake {
    async fn recv(&mut self) -> Option<Arc<Packet>> {
        match self {
            Intake::Bounded(rx) => rx.recv().await,
            Intake::Unbounded(rx) => rx.recv().await,
        }
    }
}

struct Outlet {
    name: &'static str,
    tx: Inlet,
}

/// Single reader of the inbound stream; copies every packet to every live
/// handler, and owns the kill broadcast.
pub struct Dispatcher {
    policy: QueuePolicy,
    kill: CancellationToken,
    outlets: Vec<Outlet>,
    tasks: Vec<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(policy: QueuePolicy) -> Self {
        Self {
            policy,
            kill: CancellationToken::new(),
            outlets: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Clone of the kill signal, for tasks that must stop with the handlers.
    pub fn kill_token(&self) -> CancellationToken {
        self.kill.clone()
    }

    /// Give `handler` its own input queue and spawn its loop.
    pub fn register(&mut self, room: Arc<Room>, handler: Arc<dyn Handler>) {
        let (tx, intake) = match self.policy {
            QueuePolicy::Unbounded => {
                let (tx, rx) = mpsc::unbounded_channel();
                (Inlet::Unbounded(tx), Intake::Unbounded(rx))
            }
            QueuePolicy::Bounded { capacity } => {
                let (tx, rx) = mpsc::channel(capacity.max(1));
                (Inlet::Bounded(tx), Intake::Bounded(rx))
            }
        };
        let name = handler.name();
        self.outlets.push(Outlet { name, tx });
        self.tasks
            .push(tokio::spawn(run_handler(room, handler, intake, self.kill.clone())));
        tracing::debug!(handler = name, policy = ?self.policy, "handler registered");
    }

    /// Names of handlers still accepting packets.
    pub fn live_handlers(&self) -> Vec<&'static str> {
        self.outlets
            .iter()
            .filter(|o| !o.tx.is_closed())
            .map(|o| o.name)
            .collect()
    }

    /// Deliver one packet to every live handler, in registration order.
    ///
    /// Unbounded queues never block. A full bounded queue blocks until the
    /// handler catches up or kill fires. Handlers that exited are pruned.
    pub async fn fan_out(&mut self, packet: Packet) {
        let packet = Arc::new(packet);
        let mut lost = false;

        for outlet in &self.outlets {
            let delivered = match &outlet.tx {
                Inlet::Unbounded(tx) => tx.send(Arc::clone(&packet)).is_ok(),
                Inlet::Bounded(tx) => {
                    tokio::select! {
                        biased;
                        _ = self.kill.cancelled() => return,
                        res = tx.send(Arc::clone(&packet)) => res.is_ok(),
                    }
                }
            };
            if !delivered {
                tracing::debug!(handler = outlet.name, "handler gone; pruning");
                lost = true;
            }
        }

        if lost {
            self.outlets.retain(|o| !o.tx.is_closed());
        }
    }

    /// Read `source` until it ends or kill fires.
    pub async fn run<S: PacketSource + ?Sized>(&mut self, source: &mut S) -> Stopped {
        loop {
            let next = tokio::select! {
                biased;
                _ = self.kill.cancelled() => return Stopped::Killed,
                p = source.next_packet() => p,
            };
            let Some(packet) = next else {
                tracing::info!("inbound stream ended");
                return Stopped::SourceClosed;
            };
            tracing::trace!(packet_type = %packet.packet_type, id = %packet.id, "inbound");
            self.fan_out(packet).await;
        }
    }

    /// Broadcast kill. Idempotent; safe after handlers already exited.
    pub fn shutdown(&self) {
        if !self.kill.is_cancelled() {
            tracing::info!(handlers = self.tasks.len(), "shutting down handlers");
        }
        self.kill.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.kill.is_cancelled()
    }

    /// Kill and wait for every handler task to finish. Queued packets are
    /// abandoned.
    pub async fn join(self) {
        self.shutdown();
        drop(self.outlets);
        await_tasks(self.tasks).await;
    }

    /// Close every input queue, let handlers finish what is already queued,
    /// then fire kill for anything still tied to it.
    pub async fn drain(self) {
        drop(self.outlets);
        await_tasks(self.tasks).await;
        self.kill.cancel();
    }
}

async fn await_tasks(tasks: Vec<JoinHandle<()>>) {
    for res in futures_util::future::join_all(tasks).await {
        if let Err(e) = res {
            tracing::warn!(error = %e, "handler task did not exit cleanly");
        }
    }
}

async fn run_handler(
    room: Arc<Room>,
    handler: Arc<dyn Handler>,
    mut intake: Intake,
    kill: CancellationToken,
) {
    let name = handler.name();
    tracing::debug!(handler = name, "handler started");

    loop {
        let packet = tokio::select! {
            biased;
            _ = kill.cancelled() => break,
            p = intake.recv() => match p {
                Some(p) => p,
                None => break,
            },
        };

        if !handler.wants(&packet) {
            continue;
        }

        // Raced against kill too: a reaction stuck in I/O must not hold up
        // shutdown.
        let res = tokio::select! {
            biased;
            _ = kill.cancelled() => break,
            r = handler.react(&room, &packet) => r,
        };

        if let Err(e) = res {
            if e.is_fatal() {
                tracing::warn!(handler = name, packet_type = %packet.packet_type, "handler terminating");
                room.report(e);
                break;
            }
            tracing::debug!(handler = name, packet_type = %packet.packet_type, error = %e, "packet skipped");
        }
    }

    tracing::debug!(handler = name, "handler stopped");
}
