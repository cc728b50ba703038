//! OrderInfoUpdated event applier (informational)

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// OrderInfoUpdated applier
pub struct OrderInfoUpdatedApplier;

impl EventApplier for OrderInfoUpdatedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::OrderInfoUpdated {
            guest_count,
            receipt_number,
        } = &event.payload
        {
            if let Some(count) = guest_count {
                snapshot.guest_count = *count;
            }
            if receipt_number.is_some() {
                snapshot.receipt_number = receipt_number.clone();
            }
        }
    }
}
