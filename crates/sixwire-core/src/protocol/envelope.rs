//! Command envelope (JSON).
//!
//! Field presence is the forwarding discipline: a field participates in a
//! routing decision iff it arrived on the wire (`Some`), never by truthiness.
//! Opaque passthrough fields are carried as raw JSON values and never
//! interpreted. Unknown extra fields are ignored rather than carried.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Ordered path map carried by depth-tracked forwards: depth -> device id.
pub type SearchPathMap = BTreeMap<u32, String>;

/// One inbound protocol message.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandEnvelope {
    /// Sender identity; required for the sender to be registered.
    #[serde(rename = "deviceId", default)]
    pub device_id: Option<String>,
    /// The device that originated a search; `RESULT` routes back to it.
    #[serde(rename = "originDeviceId", default)]
    pub origin_device_id: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    /// Ordered delivery targets; forwarding requires a non-empty list.
    #[serde(default)]
    pub receivers: Option<Vec<String>>,
    #[serde(default)]
    pub specific: Option<String>,
    #[serde(default)]
    pub comment: Option<Value>,
    #[serde(rename = "currentSearchDepth", default)]
    pub current_search_depth: Option<u32>,
    #[serde(
        rename = "searchPathMap",
        default,
        deserialize_with = "lenient_path_map"
    )]
    pub search_path_map: Option<SearchPathMap>,
    /// Advisory depth bound, carried through without enforcement.
    #[serde(rename = "MAX_DEPTH", default)]
    pub max_depth: Option<u32>,

    // Opaque passthrough: carried verbatim, never interpreted.
    #[serde(default)]
    pub cellphone: Option<Value>,
    #[serde(default)]
    pub geozone: Option<Value>,
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(rename = "employmentSearchIds", default)]
    pub employment_search_ids: Option<Value>,
    #[serde(rename = "employmentMatchIds", default)]
    pub employment_match_ids: Option<Value>,
    #[serde(default)]
    pub hops: Option<Value>,
    #[serde(default)]
    pub rating: Option<Value>,
    #[serde(rename = "matchedDevices", default)]
    pub matched_devices: Option<Value>,
    #[serde(rename = "listingCategoryId", default)]
    pub listing_category_id: Option<Value>,
    #[serde(default)]
    pub query: Option<Value>,
    #[serde(default)]
    pub listings: Option<Value>,
    #[serde(default)]
    pub resume: Option<Value>,
    #[serde(default)]
    pub swap: Option<Value>,
}

/// Per-receiver outbound payload: every present envelope field except
/// `receivers`, rebuilt fresh for each receiver so a handler can rewrite
/// depth, path, rating, and identity on its own copy. Absent fields are
/// omitted from the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ForwardPayload {
    #[serde(rename = "deviceId", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(rename = "originDeviceId", skip_serializing_if = "Option::is_none")]
    pub origin_device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Value>,
    #[serde(
        rename = "currentSearchDepth",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_search_depth: Option<u32>,
    #[serde(rename = "searchPathMap", skip_serializing_if = "Option::is_none")]
    pub search_path_map: Option<SearchPathMap>,
    #[serde(rename = "MAX_DEPTH", skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cellphone: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geozone: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<Value>,
    #[serde(
        rename = "employmentSearchIds",
        skip_serializing_if = "Option::is_none"
    )]
    pub employment_search_ids: Option<Value>,
    #[serde(
        rename = "employmentMatchIds",
        skip_serializing_if = "Option::is_none"
    )]
    pub employment_match_ids: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hops: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Value>,
    #[serde(rename = "matchedDevices", skip_serializing_if = "Option::is_none")]
    pub matched_devices: Option<Value>,
    #[serde(
        rename = "listingCategoryId",
        skip_serializing_if = "Option::is_none"
    )]
    pub listing_category_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listings: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap: Option<Value>,
    /// Sender identity stamped by `RATING` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

impl ForwardPayload {
    /// Copy of the envelope's carried fields, addressed from its sender.
    pub fn from_envelope(env: &CommandEnvelope) -> Self {
        Self {
            device_id: env.device_id.clone(),
            origin_device_id: env.origin_device_id.clone(),
            command: env.command.clone(),
            specific: env.specific.clone(),
            comment: env.comment.clone(),
            current_search_depth: env.current_search_depth,
            search_path_map: env.search_path_map.clone(),
            max_depth: env.max_depth,
            cellphone: env.cellphone.clone(),
            geozone: env.geozone.clone(),
            latitude: env.latitude.clone(),
            longitude: env.longitude.clone(),
            employment_search_ids: env.employment_search_ids.clone(),
            employment_match_ids: env.employment_match_ids.clone(),
            hops: env.hops.clone(),
            rating: env.rating.clone(),
            matched_devices: env.matched_devices.clone(),
            listing_category_id: env.listing_category_id.clone(),
            query: env.query.clone(),
            listings: env.listings.clone(),
            resume: env.resume.clone(),
            swap: env.swap.clone(),
            sender: None,
        }
    }
}

/// parseFloat-style coercion for the `rating` field: numbers pass through,
/// numeric strings parse, anything else (including absence) is NaN. NaN has
/// no JSON representation and serializes as `null`.
pub fn coerce_rating(rating: Option<&Value>) -> f64 {
    match rating {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// `searchPathMap` arrives as a JSON object with decimal-string keys. Any
/// other shape degrades to absent; an entry whose key does not parse as an
/// integer is skipped. Non-string hop values are stringified.
fn lenient_path_map<'de, D>(de: D) -> std::result::Result<Option<SearchPathMap>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(de)?;
    Ok(v.as_ref().and_then(path_map_from_value))
}

fn path_map_from_value(v: &Value) -> Option<SearchPathMap> {
    let obj = v.as_object()?;
    let mut map = SearchPathMap::new();
    for (key, hop) in obj {
        let Ok(depth) = key.parse::<u32>() else {
            continue;
        };
        let hop = match hop {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        map.insert(depth, hop);
    }
    Some(map)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use serde_json::json;

    #[test]
    fn rating_coercion() {
        assert_eq!(coerce_rating(Some(&json!(4.5))), 4.5);
        assert_eq!(coerce_rating(Some(&json!("3.25"))), 3.25);
        assert_eq!(coerce_rating(Some(&json!(" 2 "))), 2.0);
        assert!(coerce_rating(Some(&json!("not a number"))).is_nan());
        assert!(coerce_rating(Some(&json!({"nested": true}))).is_nan());
        assert!(coerce_rating(None).is_nan());
    }

    #[test]
    fn nan_rating_serializes_as_null() {
        assert_eq!(Value::from(f64::NAN), Value::Null);
    }

    #[test]
    fn path_map_parses_decimal_keys_in_order() {
        let env: CommandEnvelope = serde_json::from_value(json!({
            "searchPathMap": {"2": "b", "1": "a", "10": "j"}
        }))
        .expect("envelope");
        let map = env.search_path_map.expect("map");
        let keys: Vec<u32> = map.keys().copied().collect();
        assert_eq!(keys, vec![1, 2, 10]);
        assert_eq!(map.get(&10).map(String::as_str), Some("j"));
    }

    #[test]
    fn malformed_path_map_degrades_to_absent() {
        let env: CommandEnvelope = serde_json::from_value(json!({
            "deviceId": "d",
            "searchPathMap": [1, 2, 3]
        }))
        .expect("envelope still parses");
        assert!(env.search_path_map.is_none());
        assert_eq!(env.device_id.as_deref(), Some("d"));
    }

    #[test]
    fn non_integer_path_keys_are_skipped() {
        let env: CommandEnvelope = serde_json::from_value(json!({
            "searchPathMap": {"1": "a", "size": "oops"}
        }))
        .expect("envelope");
        let map = env.search_path_map.expect("map");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1).map(String::as_str), Some("a"));
    }

    #[test]
    fn payload_omits_absent_fields_and_receivers() {
        let env: CommandEnvelope = serde_json::from_value(json!({
            "deviceId": "s",
            "command": "message",
            "receivers": ["a"],
            "specific": "CHAT",
            "comment": "hi"
        }))
        .expect("envelope");
        let payload = ForwardPayload::from_envelope(&env);
        let out = serde_json::to_value(&payload).expect("serialize");
        let obj = out.as_object().expect("object");
        assert_eq!(obj.get("deviceId"), Some(&json!("s")));
        assert_eq!(obj.get("comment"), Some(&json!("hi")));
        assert!(!obj.contains_key("receivers"));
        assert!(!obj.contains_key("rating"));
        assert!(!obj.contains_key("sender"));
    }
}
