//! Presence debounce: join/part announcements with a delayed leave
//! confirmation, so users hopping out and back in do not spam the room.
//!
//! States per user: present (absent from the leaving-set) and pending-leave
//! (in the leaving-set). A part marks pending-leave and schedules a
//! confirmation; a join inside the window clears the mark; the confirmation
//! announces only if the mark it scheduled for is still the current one.

mod debounce;
mod leaving;

pub use debounce::{on_join, JoinOutcome, PartDebouncer};
pub use leaving::LeavingSet;

pub fn joined_text(user: &str) -> String {
    format!("< {user} joined the room. >")
}

pub fn left_text(user: &str) -> String {
    format!("< {user} left the room. >")
}
