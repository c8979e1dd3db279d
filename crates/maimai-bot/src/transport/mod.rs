//! Transport layer.
//!
//! The dispatcher reads inbound packets through `PacketSource`; handlers
//! write through the room's `Outbox`, an unbounded queue drained by a single
//! writer task, so concurrent sends never interleave on the socket.

pub mod ws;

use async_trait::async_trait;
use tokio::sync::mpsc;

use maimai_core::protocol::Packet;

/// Outgoing packet queue.
pub type Outbox = mpsc::UnboundedSender<Packet>;
/// Writer side of the outgoing queue.
pub type OutboxRx = mpsc::UnboundedReceiver<Packet>;

pub fn outbox() -> (Outbox, OutboxRx) {
    mpsc::unbounded_channel()
}

/// Inbound packets, one at a time, in arrival order. `None` means the
/// connection is gone.
#[async_trait]
pub trait PacketSource: Send {
    async fn next_packet(&mut self) -> Option<Packet>;
}

#[async_trait]
impl PacketSource for mpsc::Receiver<Packet> {
    async fn next_packet(&mut self) -> Option<Packet> {
        self.recv().await
    }
}

#[async_trait]
impl PacketSource for mpsc::UnboundedReceiver<Packet> {
    async fn next_packet(&mut self) -> Option<Packet> {
        self.recv().await
    }
}
