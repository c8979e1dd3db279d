use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::room::Room;

use super::left_text;

/// What a join (or first nick claim) means for the announcer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// No identity; nothing to do.
    Ignored,
    /// User came back inside the window; the pending leave is dropped.
    Returned,
    /// Genuinely new arrival.
    Announce,
}

/// Join-side transition.
pub fn on_join(room: &Room, user: &str) -> JoinOutcome {
    if user.is_empty() {
        return JoinOutcome::Ignored;
    }
    if room.leaving().clear(user) {
        JoinOutcome::Returned
    } else {
        JoinOutcome::Announce
    }
}

/// Part-side transition: mark pending-leave and schedule the confirmation.
#[derive(Clone)]
pub struct PartDebouncer {
    delay: Duration,
    cancel: Option<CancellationToken>,
}

impl PartDebouncer {
    /// With `cancel`, pending confirmations are dropped when it fires;
    /// without, they outlive the session like fire-and-forget timers.
    pub fn new(delay: Duration, cancel: Option<CancellationToken>) -> Self {
        Self { delay, cancel }
    }

    pub fn schedule(&self, room: &Arc<Room>, user: &str) -> Option<JoinHandle<()>> {
        if user.is_empty() {
            return None;
        }
        let ticket = room.leaving().mark(user);
        tracing::debug!(user = %user, ticket, delay_secs = self.delay.as_secs(), "leave pending");

        let room = Arc::clone(room);
        let user = user.to_string();
        let delay = self.delay;
        let cancel = self.cancel.clone();

        Some(tokio::spawn(async move {
            match cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            tracing::debug!(user = %user, "leave confirmation cancelled by shutdown");
                            return;
                        }
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                None => tokio::time::sleep(delay).await,
            }

            // Re-check now, against whatever the join handler did meanwhile.
            if room.leaving().confirm(&user, ticket) {
                if let Err(e) = room.send_text(&left_text(&user), "") {
                    tracing::warn!(user = %user, error = %e, "leave announcement not sent");
                }
            } else {
                tracing::debug!(user = %user, ticket, "leave superseded");
            }
        }))
    }
}
