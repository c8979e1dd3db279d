//! WebSocket connection to the room.
//!
//! Responsibilities:
//! - Connect (no retry; reconnect policy belongs to whoever runs the session)
//! - Decode text frames into envelopes; skip frames that are not envelopes
//! - Drain the outbox into the socket from one writer task

use async_trait::async_trait;
use futures_util::stream::SplitStream;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use maimai_core::error::{MaimaiError, Result};
use maimai_core::protocol::Packet;

use super::{OutboxRx, PacketSource};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Read half of the room socket.
pub struct WsSource {
    stream: SplitStream<WsStream>,
}

/// Open the socket and start the writer. The writer stops when `kill` fires
/// or every outbox sender is dropped.
pub async fn connect(
    url: &str,
    outbound: OutboxRx,
    kill: CancellationToken,
) -> Result<(WsSource, JoinHandle<()>)> {
    let (ws, _resp) = connect_async(url)
        .await
        .map_err(|e| MaimaiError::Transport(format!("connect {url}: {e}")))?;
    tracing::info!(%url, "connected");

    let (sink, stream) = ws.split();
    let writer = tokio::spawn(run_writer(sink, outbound, kill));
    Ok((WsSource { stream }, writer))
}

async fn run_writer<K>(mut sink: K, mut outbound: OutboxRx, kill: CancellationToken)
where
    K: Sink<Message> + Unpin,
    K::Error: std::fmt::Display,
{
    loop {
        let packet = tokio::select! {
            biased;
            _ = kill.cancelled() => {
                // Replies queued before kill still go out.
                while let Ok(packet) = outbound.try_recv() {
                    if !write_packet(&mut sink, &packet).await {
                        break;
                    }
                }
                break;
            }
            maybe = outbound.recv() => match maybe {
                Some(packet) => packet,
                None => break,
            },
        };
        if !write_packet(&mut sink, &packet).await {
            break;
        }
    }
    let _ = sink.close().await;
    tracing::debug!("writer stopped");
}

/// False once the socket is unusable.
async fn write_packet<K>(sink: &mut K, packet: &Packet) -> bool
where
    K: Sink<Message> + Unpin,
    K::Error: std::fmt::Display,
{
    let json = match packet.to_json() {
        Ok(j) => j,
        Err(e) => {
            tracing::warn!(packet_type = %packet.packet_type, error = %e, "outgoing packet dropped");
            return true;
        }
    };
    match sink.send(Message::text(json)).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "socket write failed");
            false
        }
    }
}

#[async_trait]
impl PacketSource for WsSource {
    async fn next_packet(&mut self) -> Option<Packet> {
        loop {
            let msg = match self.stream.next().await? {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(error = %e, "socket read failed");
                    return None;
                }
            };
            match msg {
                Message::Text(text) => match Packet::from_json(text.as_str()) {
                    Ok(packet) => return Some(packet),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping undecodable frame");
                        continue;
                    }
                },
                Message::Close(frame) => {
                    tracing::info!(?frame, "server closed connection");
                    return None;
                }
                // ping/pong are answered by tungstenite; binary is unused.
                _ => continue,
            }
        }
    }
}
