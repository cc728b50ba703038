//! OrderSplitIn event applier (target side, creates the order)

use crate::orders::repricing::{merge_lines, select_order_rules};
use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// OrderSplitIn applier
pub struct OrderSplitInApplier;

impl EventApplier for OrderSplitInApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, ctx: &PricingContext<'_>) {
        if let EventPayload::OrderSplitIn {
            source_order_id,
            placement,
            items,
        } = &event.payload
        {
            super::place(snapshot, placement);
            snapshot.related_order_id = Some(source_order_id.clone());
            snapshot.created_at = event.timestamp;
            merge_lines(snapshot, items);
            select_order_rules(snapshot, event.timestamp, ctx);
        }
    }
}
