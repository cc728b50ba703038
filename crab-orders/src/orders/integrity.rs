//! Hash-chain verification
//!
//! Every event links to the previous event of the same order through
//! `prev_hash`, and its `curr_hash` covers the payload and sequence. A
//! failure here is fatal to the affected order's local view: the caller
//! drops it and performs a full resync.

use shared::order::hash::verify_event_hash;
use shared::order::{EventPayload, GENESIS_HASH, OrderEvent, OrderSnapshot};
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum IntegrityError {
    #[error("hash mismatch for order {order_id} at sequence {sequence}")]
    HashMismatch { order_id: String, sequence: u64 },

    #[error(
        "broken chain for order {order_id} at sequence {sequence}: expected prev {expected}, got {actual}"
    )]
    BrokenChain {
        order_id: String,
        sequence: u64,
        expected: String,
        actual: String,
    },

    #[error("order-creating event for existing order {order_id} at sequence {sequence}")]
    UnexpectedGenesis { order_id: String, sequence: u64 },

    #[error("payload encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl IntegrityError {
    /// Order whose local view is compromised, if the error is tied to one
    pub fn order_id(&self) -> Option<&str> {
        match self {
            IntegrityError::HashMismatch { order_id, .. }
            | IntegrityError::BrokenChain { order_id, .. }
            | IntegrityError::UnexpectedGenesis { order_id, .. } => Some(order_id),
            IntegrityError::Encoding(_) => None,
        }
    }
}

/// Verify `event` against the current local snapshot of its order.
///
/// Events already covered by the snapshot pass untouched. A snapshot without
/// a recorded hash (older baseline) cannot be linked and is accepted.
pub fn verify_link(
    snapshot: Option<&OrderSnapshot>,
    event: &OrderEvent,
) -> Result<(), IntegrityError> {
    let expected_prev = match snapshot {
        Some(s) if event.sequence <= s.last_sequence => return Ok(()),
        Some(_) if event.payload.is_genesis() => {
            error!(
                order_id = %event.order_id,
                sequence = event.sequence,
                "Order-creating event for an existing order"
            );
            return Err(IntegrityError::UnexpectedGenesis {
                order_id: event.order_id.clone(),
                sequence: event.sequence,
            });
        }
        Some(s) if s.last_event_hash.is_empty() => {
            debug!(order_id = %event.order_id, "Baseline has no hash, skipping link check");
            None
        }
        Some(s) => Some(s.last_event_hash.as_str()),
        None if event.payload.is_genesis() => Some(GENESIS_HASH),
        // Unknown order; the reducer ignores the event
        None => None,
    };

    if let Some(expected) = expected_prev.filter(|e| event.prev_hash != *e) {
        error!(
            order_id = %event.order_id,
            sequence = event.sequence,
            expected,
            actual = %event.prev_hash,
            "Event hash chain broken"
        );
        return Err(IntegrityError::BrokenChain {
            order_id: event.order_id.clone(),
            sequence: event.sequence,
            expected: expected.to_string(),
            actual: event.prev_hash.clone(),
        });
    }

    verify_content(event)
}

/// Recompute `curr_hash`; unknown payloads cannot be recomputed and are accepted
pub fn verify_content(event: &OrderEvent) -> Result<(), IntegrityError> {
    if matches!(event.payload, EventPayload::Unknown) {
        warn!(
            order_id = %event.order_id,
            sequence = event.sequence,
            "Unknown payload type, content hash not verifiable"
        );
        return Ok(());
    }
    if !verify_event_hash(event)? {
        error!(
            order_id = %event.order_id,
            sequence = event.sequence,
            "Event hash mismatch"
        );
        return Err(IntegrityError::HashMismatch {
            order_id: event.order_id.clone(),
            sequence: event.sequence,
        });
    }
    Ok(())
}

/// Verify the complete history of ONE order, starting at genesis
pub fn verify_chain(events: &[OrderEvent]) -> Result<(), IntegrityError> {
    let mut prev = GENESIS_HASH;
    for event in events {
        if event.prev_hash != prev {
            return Err(IntegrityError::BrokenChain {
                order_id: event.order_id.clone(),
                sequence: event.sequence,
                expected: prev.to_string(),
                actual: event.prev_hash.clone(),
            });
        }
        verify_content(event)?;
        prev = event.curr_hash.as_str();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::hash::seal;
    use shared::order::TablePlacement;

    fn sealed(seq: u64, payload: EventPayload, prev: &str) -> OrderEvent {
        let mut e = OrderEvent::new(seq, "order-1", 1_000, payload);
        seal(&mut e, prev).unwrap();
        e
    }

    fn history() -> Vec<OrderEvent> {
        let open = sealed(
            1,
            EventPayload::TableOpened {
                placement: TablePlacement::default(),
                receipt_number: None,
            },
            GENESIS_HASH,
        );
        let note = sealed(
            2,
            EventPayload::OrderNoteAdded {
                note: "first".into(),
            },
            &open.curr_hash,
        );
        vec![open, note]
    }

    #[test]
    fn test_valid_chain_passes() {
        assert!(verify_chain(&history()).is_ok());
    }

    #[test]
    fn test_tampered_payload_detected() {
        let mut events = history();
        events[1].payload = EventPayload::OrderNoteAdded {
            note: "edited".into(),
        };
        let err = verify_chain(&events).unwrap_err();
        assert!(matches!(err, IntegrityError::HashMismatch { sequence: 2, .. }));
        assert_eq!(err.order_id(), Some("order-1"));
    }

    #[test]
    fn test_broken_link_detected() {
        let events = history();
        let mut snap = OrderSnapshot::new("order-1", 1_000);
        snap.last_sequence = 1;
        snap.last_event_hash = "a".repeat(64);
        let err = verify_link(Some(&snap), &events[1]).unwrap_err();
        assert!(matches!(err, IntegrityError::BrokenChain { .. }));
    }

    #[test]
    fn test_genesis_must_link_to_zero_hash() {
        let mut events = history();
        events[0].prev_hash = "b".repeat(64);
        assert!(verify_link(None, &events[0]).is_err());
    }

    #[test]
    fn test_genesis_on_existing_order_rejected() {
        let events = history();
        let snap = OrderSnapshot::new("order-1", 1_000);
        let err = verify_link(Some(&snap), &events[0]);
        assert!(matches!(err, Err(IntegrityError::UnexpectedGenesis { .. })));
    }

    #[test]
    fn test_already_applied_event_passes() {
        let mut events = history();
        events[1].curr_hash = "bad".into();
        let mut snap = OrderSnapshot::new("order-1", 1_000);
        snap.last_sequence = 2;
        assert!(verify_link(Some(&snap), &events[1]).is_ok());
    }

    #[test]
    fn test_unknown_payload_only_linked() {
        let events = history();
        let mut unknown = OrderEvent::new(3, "order-1", 2_000, EventPayload::Unknown);
        unknown.prev_hash = events[1].curr_hash.clone();
        unknown.curr_hash = "c".repeat(64);
        let mut snap = OrderSnapshot::new("order-1", 1_000);
        snap.last_sequence = 2;
        snap.last_event_hash = events[1].curr_hash.clone();
        assert!(verify_link(Some(&snap), &unknown).is_ok());
    }
}
