//! Event hash chain
//!
//! `curr_hash = hex(sha256(prev_hash ‖ canonical(payload) ‖ sequence))`
//!
//! The canonical payload is the JSON encoding after a round trip through
//! `serde_json::Value`, whose object map keeps keys sorted. Decimals are
//! encoded as strings so the bytes are exact.

use super::event::{EventPayload, OrderEvent};
use sha2::{Digest, Sha256};

/// prev_hash of the first event of every order
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Canonical JSON encoding of a payload
pub fn canonical_payload(payload: &EventPayload) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(payload)?;
    serde_json::to_string(&value)
}

/// Compute the hash of one chain link
pub fn compute_event_hash(
    prev_hash: &str,
    payload: &EventPayload,
    sequence: u64,
) -> Result<String, serde_json::Error> {
    let canonical = canonical_payload(payload)?;
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update(canonical.as_bytes());
    hasher.update(sequence.to_string().as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Link `event` after `prev_hash` and fill in `curr_hash`
pub fn seal(event: &mut OrderEvent, prev_hash: &str) -> Result<(), serde_json::Error> {
    event.prev_hash = prev_hash.to_string();
    event.curr_hash = compute_event_hash(prev_hash, &event.payload, event.sequence)?;
    Ok(())
}

/// Recompute and compare; `Ok(false)` on mismatch
pub fn verify_event_hash(event: &OrderEvent) -> Result<bool, serde_json::Error> {
    let expected = compute_event_hash(&event.prev_hash, &event.payload, event.sequence)?;
    Ok(expected == event.curr_hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::event::EventPayload;

    fn note_event(seq: u64, note: &str) -> OrderEvent {
        OrderEvent::new(
            seq,
            "order-1",
            1_704_067_200_000,
            EventPayload::OrderNoteAdded {
                note: note.to_string(),
            },
        )
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = compute_event_hash(GENESIS_HASH, &EventPayload::OrderRestored {}, 1).unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sealed_event_verifies() {
        let mut event = note_event(3, "window seat");
        seal(&mut event, GENESIS_HASH).unwrap();
        assert!(verify_event_hash(&event).unwrap());
    }

    #[test]
    fn test_payload_tampering_changes_hash() {
        let mut event = note_event(3, "window seat");
        seal(&mut event, GENESIS_HASH).unwrap();
        let original = event.curr_hash.clone();

        event.payload = EventPayload::OrderNoteAdded {
            note: "terrace".to_string(),
        };
        assert!(!verify_event_hash(&event).unwrap());
        assert_ne!(
            compute_event_hash(GENESIS_HASH, &event.payload, 3).unwrap(),
            original
        );
    }

    #[test]
    fn test_sequence_and_prev_hash_are_bound() {
        let payload = EventPayload::OrderRestored {};
        let a = compute_event_hash(GENESIS_HASH, &payload, 1).unwrap();
        let b = compute_event_hash(GENESIS_HASH, &payload, 2).unwrap();
        let c = compute_event_hash(&a, &payload, 1).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_canonical_payload_sorts_keys() {
        let payload = EventPayload::RuleSkipToggled {
            rule_id: 1,
            skipped: true,
            instance_id: Some("i-1".into()),
        };
        let canonical = canonical_payload(&payload).unwrap();
        assert_eq!(
            canonical,
            r#"{"instance_id":"i-1","rule_id":1,"skipped":true,"type":"RULE_SKIP_TOGGLED"}"#
        );
    }
}
