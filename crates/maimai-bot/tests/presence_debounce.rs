//! Join/part debounce under a paused clock.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use maimai_bot::config::QueuePolicy;
use maimai_bot::dispatch::Dispatcher;
use maimai_bot::handlers::{NickChange, PresenceTracker};
use maimai_bot::presence::{on_join, JoinOutcome, PartDebouncer};

mod common;
use common::{contents, join_event, nick_event, part_event, settle, Harness, StaticTitles};

const DELAY: Duration = Duration::from_secs(300);

fn presence_dispatcher(h: &Harness, cancel: Option<CancellationToken>) -> Dispatcher {
    let mut d = Dispatcher::new(QueuePolicy::Unbounded);
    d.register(h.room.clone(), Arc::new(NickChange::new()));
    d.register(h.room.clone(), Arc::new(PresenceTracker::new(PartDebouncer::new(DELAY, cancel))));
    d
}

#[tokio::test(start_paused = true)]
async fn rejoin_inside_window_suppresses_leave() {
    let mut h = Harness::new();
    let mut d = presence_dispatcher(&h, None);

    d.fan_out(part_event("alice")).await;
    settle(Duration::from_secs(10)).await;
    assert!(h.room.leaving().is_leaving("alice"));

    d.fan_out(join_event("alice")).await;
    settle(Duration::from_secs(1)).await;
    assert!(!h.room.leaving().is_leaving("alice"));

    settle(DELAY + Duration::from_secs(5)).await;
    assert!(h.texts().is_empty(), "no leave and no extra join announcement");
    d.join().await;
}

#[tokio::test(start_paused = true)]
async fn back_to_back_part_and_join_is_silent() {
    let mut h = Harness::new();
    let mut d = presence_dispatcher(&h, None);

    d.fan_out(part_event("alice")).await;
    d.fan_out(join_event("alice")).await;
    d.fan_out(part_event("bob")).await;
    d.fan_out(nick_event("", "bob")).await;
    settle(DELAY + Duration::from_secs(1)).await;

    assert!(h.texts().is_empty());
    assert!(h.room.leaving().is_empty());
    d.join().await;
}

#[tokio::test(start_paused = true)]
async fn back_to_back_under_session_registration_order() {
    let mut h = Harness::new();
    let cfg = maimai_bot::config::load_from_str("version: 1\nroom: { name: test }\n").unwrap();
    let mut d = Dispatcher::new(QueuePolicy::Unbounded);
    for handler in
        maimai_bot::handlers::build(&cfg, Arc::new(StaticTitles::default()), &d.kill_token()).unwrap()
    {
        d.register(h.room.clone(), handler);
    }

    for _ in 0..3 {
        d.fan_out(part_event("alice")).await;
        d.fan_out(join_event("alice")).await;
    }
    settle(DELAY + Duration::from_secs(1)).await;

    assert!(h.texts().is_empty());
    d.join().await;
}

#[tokio::test(start_paused = true)]
async fn leave_is_announced_once_after_the_delay() {
    let mut h = Harness::new();
    let mut d = presence_dispatcher(&h, None);

    d.fan_out(part_event("alice")).await;
    settle(DELAY - Duration::from_secs(1)).await;
    assert!(h.texts().is_empty(), "nothing before the delay elapses");

    settle(Duration::from_secs(2)).await;
    let texts = h.texts();
    assert_eq!(contents(&texts), vec!["< alice left the room. >"]);
    assert_eq!(texts[0].1, "", "announcements are top-level");
    assert!(h.room.leaving().is_empty());

    settle(DELAY).await;
    assert!(h.texts().is_empty());
    d.join().await;
}

#[tokio::test(start_paused = true)]
async fn second_part_restarts_the_window() {
    let mut h = Harness::new();
    let mut d = presence_dispatcher(&h, None);

    d.fan_out(part_event("alice")).await;
    settle(Duration::from_secs(100)).await;
    d.fan_out(join_event("alice")).await;
    settle(Duration::from_secs(1)).await;
    d.fan_out(part_event("alice")).await;

    // First timer fires at ~300s and finds a newer mark.
    settle(Duration::from_secs(250)).await;
    assert!(h.texts().is_empty());
    assert!(h.room.leaving().is_leaving("alice"));

    // Second timer fires at ~401s.
    settle(Duration::from_secs(60)).await;
    assert_eq!(contents(&h.texts()), vec!["< alice left the room. >"]);
    d.join().await;
}

#[tokio::test(start_paused = true)]
async fn joins_and_first_nicks_are_announced() {
    let mut h = Harness::new();
    let mut d = presence_dispatcher(&h, None);

    d.fan_out(join_event("bob")).await;
    d.fan_out(nick_event("", "carol")).await;
    d.fan_out(nick_event("carol", "caroline")).await;
    d.fan_out(join_event("")).await;
    d.fan_out(nick_event("", "")).await;
    settle(Duration::from_secs(1)).await;

    let texts = h.texts();
    let mut got = contents(&texts);
    got.sort_unstable();
    assert_eq!(
        got,
        vec![
            "< bob joined the room. >",
            "< carol is now known as caroline. >",
            "< carol joined the room. >",
        ]
    );
    d.join().await;
}

#[tokio::test(start_paused = true)]
async fn first_nick_claim_cancels_pending_leave() {
    let mut h = Harness::new();
    let mut d = presence_dispatcher(&h, None);

    d.fan_out(part_event("dave")).await;
    settle(Duration::from_secs(1)).await;
    d.fan_out(nick_event("", "dave")).await;
    settle(DELAY + Duration::from_secs(1)).await;

    assert!(h.texts().is_empty());
    d.join().await;
}

#[tokio::test(start_paused = true)]
async fn cancellable_confirmation_dies_with_shutdown() {
    let mut h = Harness::new();
    let kill = CancellationToken::new();
    let debouncer = PartDebouncer::new(DELAY, Some(kill.clone()));

    let task = debouncer.schedule(&h.room, "erin").unwrap();
    settle(Duration::from_secs(1)).await;
    kill.cancel();
    task.await.unwrap();

    settle(DELAY).await;
    assert!(h.texts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn uncancellable_confirmation_outlives_shutdown() {
    let mut h = Harness::new();
    let mut d = presence_dispatcher(&h, None);

    d.fan_out(part_event("frank")).await;
    settle(Duration::from_secs(1)).await;
    d.join().await;

    settle(DELAY).await;
    assert_eq!(contents(&h.texts()), vec!["< frank left the room. >"]);
}

#[tokio::test]
async fn empty_identity_changes_nothing() {
    let h = Harness::new();
    let debouncer = PartDebouncer::new(DELAY, None);
    assert!(debouncer.schedule(&h.room, "").is_none());
    assert!(h.room.leaving().is_empty());
    assert_eq!(on_join(&h.room, ""), JoinOutcome::Ignored);
}

#[tokio::test]
async fn join_outcomes() {
    let h = Harness::new();
    assert_eq!(on_join(&h.room, "gina"), JoinOutcome::Announce);
    h.room.leaving().mark("gina");
    assert_eq!(on_join(&h.room, "gina"), JoinOutcome::Returned);
    assert_eq!(on_join(&h.room, "gina"), JoinOutcome::Announce);
}
