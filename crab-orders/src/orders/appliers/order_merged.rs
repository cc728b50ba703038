//! OrderMerged event applier (target side, existing order)

use crate::orders::repricing::merge_lines;
use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// OrderMerged applier
pub struct OrderMergedApplier;

impl EventApplier for OrderMergedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::OrderMerged {
            source_order_id,
            items,
        } = &event.payload
        {
            merge_lines(snapshot, items);
            tracing::debug!(
                order_id = %event.order_id,
                %source_order_id,
                lines = items.len(),
                "merged in"
            );
        }
    }
}
