//! Canonical encoding and action-script decoding.
//!
//! Canonical bytes come from postcard and feed state fingerprints. Action
//! scripts are JSON arrays of `{"type": ..., "payload": ...}` objects.

use crate::action::{ActionKind, EditAction};
use crate::error::{LogError, LogResult};
use retouch_core::{Fingerprinter, Hash};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

/// Trait for canonical serialization
///
/// Types must opt in explicitly. Types using `#[serde(flatten)]` cannot be
/// encoded by postcard and must not implement this.
pub trait CanonicalEncode: Serialize {
    /// Encode to canonical bytes
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Encode`] if the value cannot be represented
    fn encode(&self) -> LogResult<Vec<u8>> {
        Ok(postcard::to_allocvec(self)?)
    }

    /// BLAKE3 hash of the canonical bytes
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Encode`] if the value cannot be represented
    fn canonical_hash(&self) -> LogResult<Hash> {
        let bytes = self.encode()?;
        Ok(Fingerprinter::new().section(&bytes).finish())
    }
}

impl CanonicalEncode for EditAction {}

/// Decode one action object.
///
/// Unknown tags become [`EditAction::Unrecognized`] so a script from a newer
/// editor still loads. A known tag with a malformed payload is an error.
///
/// # Errors
///
/// Returns [`LogError::Decode`] if the object has no `type` tag or the
/// payload does not match the tag
pub fn decode_action(value: Value) -> LogResult<EditAction> {
    decode_at(0, value)
}

/// Decode a whole script.
///
/// Accepts either a bare array of actions or an object with an `actions`
/// array.
///
/// # Errors
///
/// Returns [`LogError::Json`] for malformed JSON and [`LogError::Decode`]
/// for the first entry that cannot be decoded
pub fn decode_script(json: &str) -> LogResult<Vec<EditAction>> {
    let root: Value = serde_json::from_str(json)?;
    let entries = match root {
        Value::Array(entries) => entries,
        Value::Object(mut obj) => match obj.remove("actions") {
            Some(Value::Array(entries)) => entries,
            _ => {
                return Err(LogError::Decode {
                    index: 0,
                    reason: "expected an `actions` array".to_string(),
                });
            }
        },
        _ => {
            return Err(LogError::Decode {
                index: 0,
                reason: "expected an array of actions".to_string(),
            });
        }
    };

    decode_actions(entries)
}

/// Decode already parsed action objects, reporting errors by position
///
/// # Errors
///
/// Returns [`LogError::Decode`] for the first entry that cannot be decoded
pub fn decode_actions(entries: Vec<Value>) -> LogResult<Vec<EditAction>> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| decode_at(index, entry))
        .collect()
}

fn decode_at(index: usize, value: Value) -> LogResult<EditAction> {
    let Value::Object(mut obj) = value else {
        return Err(LogError::Decode {
            index,
            reason: "action must be an object".to_string(),
        });
    };

    let tag = match obj.remove("type") {
        Some(Value::String(tag)) => tag,
        _ => {
            return Err(LogError::Decode {
                index,
                reason: "missing `type` tag".to_string(),
            });
        }
    };

    let Some(kind) = ActionKind::from_tag(&tag) else {
        warn!(index, tag = %tag, "unrecognized action type, keeping as opaque");
        return Ok(EditAction::Unrecognized { tag });
    };

    // Normalise to the canonical adjacent form, dropping unit payloads
    let mut canonical = Map::new();
    canonical.insert("type".to_string(), Value::String(kind.tag().to_string()));
    match obj.remove("payload") {
        None | Some(Value::Null) => {}
        Some(Value::Object(fields)) if fields.is_empty() && is_unit(kind) => {}
        Some(payload) => {
            canonical.insert("payload".to_string(), payload);
        }
    }

    serde_json::from_value(Value::Object(canonical)).map_err(|e| LogError::Decode {
        index,
        reason: format!("{}: {}", kind, e),
    })
}

const fn is_unit(kind: ActionKind) -> bool {
    matches!(
        kind,
        ActionKind::Swap | ActionKind::ResetAdjustments | ActionKind::RotateView | ActionKind::ResetAll
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Slot;
    use serde_json::json;

    #[test]
    fn test_decode_known_action() {
        let action = decode_action(json!({
            "type": "SET_OPACITY",
            "payload": { "value": 0.25 }
        }))
        .unwrap();
        assert_eq!(action, EditAction::SetOpacity { value: 0.25 });
    }

    #[test]
    fn test_decode_unit_payload_variants() {
        for payload in [json!(null), json!({})] {
            let action = decode_action(json!({ "type": "RESET_ALL", "payload": payload })).unwrap();
            assert_eq!(action, EditAction::ResetAll);
        }
        let action = decode_action(json!({ "type": "ROTATE_VIEW" })).unwrap();
        assert_eq!(action, EditAction::RotateView);
    }

    #[test]
    fn test_decode_swap_alias() {
        let action = decode_action(json!({ "type": "SWAP_LAYERS" })).unwrap();
        assert_eq!(action, EditAction::Swap);
    }

    #[test]
    fn test_decode_unknown_tag() {
        let action = decode_action(json!({
            "type": "WATERMARK",
            "payload": { "text": "x" }
        }))
        .unwrap();
        assert_eq!(
            action,
            EditAction::Unrecognized {
                tag: "WATERMARK".to_string()
            }
        );
    }

    #[test]
    fn test_decode_bad_payload_is_error() {
        let err = decode_action(json!({ "type": "STROKE", "payload": { "points": 3 } })).unwrap_err();
        assert!(matches!(err, LogError::Decode { index: 0, .. }));
    }

    #[test]
    fn test_decode_missing_tag() {
        assert!(decode_action(json!({ "payload": {} })).is_err());
        assert!(decode_action(json!([1, 2])).is_err());
    }

    #[test]
    fn test_decode_script_reports_index() {
        let script = r#"[
            { "type": "CLEAR_LAYER", "payload": { "slot": "A" } },
            { "type": "CROP", "payload": {} }
        ]"#;
        let err = decode_script(script).unwrap_err();
        assert!(matches!(err, LogError::Decode { index: 1, .. }));
    }

    #[test]
    fn test_decode_script_object_form() {
        let script = r#"{ "actions": [
            { "type": "CLEAR_LAYER", "payload": { "slot": "B" } },
            { "type": "SWAP" }
        ] }"#;
        let actions = decode_script(script).unwrap();
        assert_eq!(
            actions,
            vec![EditAction::ClearLayer { slot: Slot::B }, EditAction::Swap]
        );
    }

    #[test]
    fn test_decode_script_malformed_json() {
        assert!(matches!(decode_script("[{"), Err(LogError::Json(_))));
    }

    #[test]
    fn test_canonical_hash_deterministic() {
        let a = EditAction::SetOpacity { value: 0.5 };
        let b = EditAction::SetOpacity { value: 0.5 };
        let c = EditAction::SetOpacity { value: 0.6 };
        assert_eq!(a.canonical_hash().unwrap(), b.canonical_hash().unwrap());
        assert_ne!(a.canonical_hash().unwrap(), c.canonical_hash().unwrap());
    }
}
