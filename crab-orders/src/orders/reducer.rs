//! Order reducer
//!
//! `apply(prev, event) -> next` folds one event into a snapshot. The reducer
//! reads no clock: every timestamp it writes comes from the event. Content
//! changes are delegated to the appliers via [`EventAction`]; the reducer
//! owns the guards (ordering, genesis, terminal status) and the sequence and
//! hash bookkeeping.

use super::appliers::EventAction;
use super::totals;
use super::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};
use tracing::{debug, warn};

/// Apply one event to an optional previous snapshot.
///
/// Returns `None` only when there was no snapshot and the event cannot create
/// one (a non-genesis event for an unknown order).
pub fn apply(
    prev: Option<&OrderSnapshot>,
    event: &OrderEvent,
    ctx: &PricingContext<'_>,
) -> Option<OrderSnapshot> {
    let Some(prev) = prev else {
        if !event.payload.is_genesis() {
            warn!(
                order_id = %event.order_id,
                sequence = event.sequence,
                event_type = %event.event_type,
                "Event for unknown order ignored"
            );
            return None;
        }
        let mut snapshot = OrderSnapshot::new(event.order_id.clone(), event.timestamp);
        apply_content(&mut snapshot, event, ctx);
        return Some(snapshot);
    };

    if event.sequence <= prev.last_sequence {
        debug!(
            order_id = %event.order_id,
            sequence = event.sequence,
            last_sequence = prev.last_sequence,
            "Event already applied, skipping"
        );
        return Some(prev.clone());
    }

    let mut snapshot = prev.clone();

    if event.payload.is_genesis() {
        warn!(
            order_id = %event.order_id,
            sequence = event.sequence,
            event_type = %event.event_type,
            "Order-creating event for an existing order ignored"
        );
        touch(&mut snapshot, event);
        return Some(snapshot);
    }

    if snapshot.status.is_terminal()
        && !event.payload.is_informational()
        && !matches!(event.payload, EventPayload::OrderRestored {})
    {
        warn!(
            order_id = %event.order_id,
            sequence = event.sequence,
            event_type = %event.event_type,
            status = ?snapshot.status,
            "Event on terminal order ignored"
        );
        touch(&mut snapshot, event);
        return Some(snapshot);
    }

    apply_content(&mut snapshot, event, ctx);
    Some(snapshot)
}

fn apply_content(snapshot: &mut OrderSnapshot, event: &OrderEvent, ctx: &PricingContext<'_>) {
    let action = EventAction::from(event);
    action.apply(snapshot, event, ctx);
    totals::recalculate(snapshot, ctx.rounding);
    touch(snapshot, event);
}

/// Sequence/hash bookkeeping, also done for ignored events so the chain stays linked
fn touch(snapshot: &mut OrderSnapshot, event: &OrderEvent) {
    snapshot.last_sequence = event.sequence;
    snapshot.last_event_hash = event.curr_hash.clone();
    snapshot.updated_at = event.timestamp;
}

/// Fold events of ONE order onto an optional baseline
pub fn fold<'e, I>(
    baseline: Option<OrderSnapshot>,
    events: I,
    ctx: &PricingContext<'_>,
) -> Option<OrderSnapshot>
where
    I: IntoIterator<Item = &'e OrderEvent>,
{
    events
        .into_iter()
        .fold(baseline, |state, event| match apply(state.as_ref(), event, ctx) {
            Some(next) => Some(next),
            None => state,
        })
}

/// Rebuild a snapshot from its complete event history
pub fn replay(events: &[OrderEvent], ctx: &PricingContext<'_>) -> Option<OrderSnapshot> {
    fold(None, events, ctx)
}
