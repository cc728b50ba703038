//! Fallback for payload types added by a newer server

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{OrderEvent, OrderSnapshot};

/// Unknown event applier: logs and leaves the snapshot untouched
pub struct UnknownEventApplier;

impl EventApplier for UnknownEventApplier {
    fn apply(&self, _snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        tracing::warn!(
            order_id = %event.order_id,
            sequence = event.sequence,
            event_id = %event.event_id,
            "unknown event type ignored"
        );
    }
}
