//! Clipboard data contract: the self-describing envelope and paste re-keying.
//!
//! Copy writes `{type, elements, files}` as JSON. Paste accepts that envelope
//! back; anything else on the clipboard is treated as plain text.

#[cfg(test)]
#[path = "clipboard_test.rs"]
mod clipboard_test;

use std::collections::{HashMap, HashSet};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::camera::Point;
use crate::consts::CLIPBOARD_TYPE;
use crate::element::{Element, ElementData, ElementStore, FileId, GroupId, ImageFile};
use crate::factory::fresh_seed;
use crate::geometry::{center, union_bounding_box};

/// What copy writes to the clipboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub elements: Vec<Element>,
    #[serde(default)]
    pub files: HashMap<FileId, ImageFile>,
}

/// Interpretation of clipboard text.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardPayload {
    Elements(ClipboardEnvelope),
    Text(String),
}

/// Envelope of the live selected elements and the image files they reference.
#[must_use]
pub fn envelope_for_selection(store: &ElementStore, files: &HashMap<FileId, ImageFile>) -> ClipboardEnvelope {
    let elements: Vec<Element> = store.selected().cloned().collect();
    let files = elements
        .iter()
        .filter_map(|e| match e.data {
            ElementData::Image { file_id } => files.get(&file_id).map(|f| (file_id, *f)),
            _ => None,
        })
        .collect();
    ClipboardEnvelope { kind: CLIPBOARD_TYPE.to_string(), elements, files }
}

/// Serialize the selection for the clipboard.
///
/// # Errors
///
/// Propagates JSON serialization failures.
pub fn serialize_selection(store: &ElementStore, files: &HashMap<FileId, ImageFile>) -> Result<String, serde_json::Error> {
    serde_json::to_string(&envelope_for_selection(store, files))
}

/// Decide whether clipboard text is one of our envelopes.
#[must_use]
pub fn parse(text: &str) -> ClipboardPayload {
    match serde_json::from_str::<ClipboardEnvelope>(text) {
        Ok(envelope) if envelope.kind == CLIPBOARD_TYPE => ClipboardPayload::Elements(envelope),
        _ => ClipboardPayload::Text(text.to_string()),
    }
}

/// Milliseconds since the Unix epoch, or 0 if the clock is before it.
#[must_use]
pub fn now_ms() -> u64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    u64::try_from(dur.as_millis()).unwrap_or(0)
}

/// Group token for a pasted copy of `old`, stable for one paste operation.
#[must_use]
pub fn pasted_group_id(old: GroupId, pasted_at_ms: u64) -> GroupId {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{old}:{pasted_at_ms}").as_bytes())
}

/// Turn envelope elements into fresh, selected elements centred on `at`.
///
/// Ids are regenerated, group tokens are re-derived from the paste time,
/// seeds are redrawn against `store` and deleted entries are dropped.
pub fn rekey<R: Rng + ?Sized>(
    envelope: &ClipboardEnvelope,
    at: Point,
    pasted_at_ms: u64,
    store: &ElementStore,
    rng: &mut R,
) -> Vec<Element> {
    let mut taken = HashSet::new();
    let mut pasted: Vec<Element> = envelope
        .elements
        .iter()
        .filter(|e| !e.is_deleted())
        .cloned()
        .map(|mut e| {
            e.id = Uuid::new_v4();
            e.group_ids = e.group_ids.iter().map(|g| pasted_group_id(*g, pasted_at_ms)).collect();
            if e.shape().has_seed() {
                let seed = loop {
                    let candidate = fresh_seed(store, rng);
                    if taken.insert(candidate) {
                        break candidate;
                    }
                };
                e.set_seed(seed);
            }
            e.select();
            e
        })
        .collect();
    if let Some(bounds) = union_bounding_box(&pasted) {
        let offset = at - center(&bounds);
        for e in &mut pasted {
            e.translate(offset.x, offset.y);
        }
    }
    pasted
}
