#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use maimai_bot::config::{self, QueuePolicy};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
room:
  name: "test"
presence:
  part_delay: 10 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
room:
  name: "test"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.room.name, "test");
    assert_eq!(cfg.room.nick, "maimai");
    assert_eq!(cfg.room.url(), "wss://euphoria.io/room/test/ws");
    assert_eq!(cfg.dispatch.queue, QueuePolicy::Unbounded);
    assert_eq!(cfg.presence.part_delay_secs, 300);
    assert!(cfg.presence.cancel_on_shutdown);
    assert_eq!(cfg.links.fetch_timeout_ms, 5000);
    assert_eq!(cfg.links.ignored_titles, vec!["Imgur".to_string()]);
    assert!(cfg.handlers.disabled.is_empty());
}

#[test]
fn full_config() {
    let ok = r#"
version: 1
room:
  name: "xkcd"
  nick: "bot"
  endpoint: "ws://localhost:8080/room/{room}/ws"
dispatch:
  queue: { mode: bounded, capacity: 64 }
presence:
  part_delay_secs: 30
  cancel_on_shutdown: false
links:
  fetch_timeout_ms: 1500
  ignored_titles: []
handlers:
  disabled: ["link-title", "scritch"]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.room.url(), "ws://localhost:8080/room/xkcd/ws");
    assert_eq!(cfg.dispatch.queue, QueuePolicy::Bounded { capacity: 64 });
    assert!(!cfg.presence.cancel_on_shutdown);
    assert!(cfg.links.ignored_titles.is_empty());
    assert!(!cfg.handlers.is_enabled("scritch"));
    assert!(cfg.handlers.is_enabled("ping-command"));
}

#[test]
fn unsupported_version() {
    let bad = r#"
version: 2
room:
  name: "test"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn room_is_required() {
    let err = config::load_from_str("version: 1\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn out_of_range_values_are_rejected() {
    for bad in [
        "version: 1\nroom: { name: \"\" }\n",
        "version: 1\nroom: { name: t, endpoint: \"https://euphoria.io\" }\n",
        "version: 1\nroom: { name: t }\ndispatch: { queue: { mode: bounded, capacity: 0 } }\n",
        "version: 1\nroom: { name: t }\npresence: { part_delay_secs: 0 }\n",
        "version: 1\nroom: { name: t }\npresence: { part_delay_secs: 7200 }\n",
        "version: 1\nroom: { name: t }\nlinks: { fetch_timeout_ms: 10 }\n",
    ] {
        let err = config::load_from_str(bad).expect_err(bad);
        assert_eq!(err.code().as_str(), "CONFIG", "{bad}");
    }
}

#[test]
fn unknown_handler_name_is_rejected() {
    let bad = r#"
version: 1
room:
  name: "test"
handlers:
  disabled: ["pingg"]
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
    assert!(err.to_string().contains("pingg"));
}

#[test]
fn bounded_queue_needs_capacity() {
    let bad = r#"
version: 1
room:
  name: "test"
dispatch:
  queue: { mode: bounded }
"#;
    assert!(config::load_from_str(bad).is_err());
}
