//! Search-path tracking for depth-tracked forwards.
//!
//! The path map travels inside the message and must describe exactly the
//! route taken so far on this branch of the flood. Advancing therefore also
//! discards any deeper entries left behind when a caller reuses one payload
//! across sibling branches.

use crate::protocol::envelope::ForwardPayload;

/// Advance `payload` across one hop to `hop_device_id`.
///
/// Increments `currentSearchDepth` (absent counts as 0), records the hop at
/// the new depth, and drops every path entry strictly deeper than it.
/// `MAX_DEPTH` is carried through untouched: capping the flood is the
/// application's call, not the relay's.
pub fn advance(payload: &mut ForwardPayload, hop_device_id: &str) {
    let depth = payload.current_search_depth.unwrap_or(0).saturating_add(1);
    let mut map = payload.search_path_map.take().unwrap_or_default();
    map.insert(depth, hop_device_id.to_string());
    map.retain(|k, _| *k <= depth);
    payload.current_search_depth = Some(depth);
    payload.search_path_map = Some(map);
}
