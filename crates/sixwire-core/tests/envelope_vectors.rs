//! Command envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use sixwire_core::protocol::envelope::CommandEnvelope;

fn load(name: &str) -> String {
    fs::read_to_string(format!("tests/vectors/{name}")).unwrap()
}

#[test]
fn parse_envelope_min() {
    let env: CommandEnvelope = serde_json::from_str(&load("envelope_min.json")).unwrap();
    assert_eq!(env.device_id.as_deref(), Some("dev-1"));
    assert_eq!(env.command.as_deref(), Some("message"));
    assert!(env.receivers.is_none());
    assert!(env.specific.is_none());
    assert!(env.search_path_map.is_none());
    assert!(env.rating.is_none());
}

#[test]
fn parse_envelope_search() {
    let env: CommandEnvelope = serde_json::from_str(&load("envelope_search.json")).unwrap();
    assert_eq!(env.device_id.as_deref(), Some("dev-1"));
    assert_eq!(env.origin_device_id.as_deref(), Some("dev-0"));
    assert_eq!(env.specific.as_deref(), Some("SEARCH"));
    assert_eq!(
        env.receivers.as_deref(),
        Some(&["dev-2".to_string(), "dev-3".to_string()][..])
    );
    assert_eq!(env.current_search_depth, Some(2));
    assert_eq!(env.max_depth, Some(6));

    let map = env.search_path_map.unwrap();
    assert_eq!(map.get(&1).map(String::as_str), Some("dev-0"));
    assert_eq!(map.get(&2).map(String::as_str), Some("dev-1"));

    // passthrough fields arrive as raw JSON, uninterpreted
    assert!(env.query.unwrap().is_object());
    assert_eq!(env.rating.unwrap(), serde_json::json!("4.5"));
}

#[test]
fn unknown_fields_are_ignored() {
    let env: CommandEnvelope = serde_json::from_str(
        r#"{"deviceId": "d", "command": "message", "somethingNew": 42}"#,
    )
    .unwrap();
    assert_eq!(env.device_id.as_deref(), Some("d"));
}

#[test]
fn empty_object_parses() {
    let env: CommandEnvelope = serde_json::from_str("{}").unwrap();
    assert!(env.device_id.is_none());
    assert!(env.command.is_none());
}
