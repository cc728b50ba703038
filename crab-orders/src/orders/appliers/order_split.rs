//! OrderSplit event applier (source side)
//!
//! Moves quantities out of this order. Lines reaching zero are dropped; the
//! same units appear on the target through ORDER_SPLIT_IN, so the combined
//! quantity is conserved.

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// OrderSplit applier
pub struct OrderSplitApplier;

impl EventApplier for OrderSplitApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::OrderSplit {
            target_order_id,
            items,
        } = &event.payload
        {
            for transfer in items {
                let Some(item) = snapshot
                    .items
                    .iter_mut()
                    .find(|i| i.instance_id == transfer.instance_id && !i.is_removed)
                else {
                    tracing::warn!(
                        order_id = %event.order_id,
                        instance_id = %transfer.instance_id,
                        "ORDER_SPLIT references unknown line"
                    );
                    continue;
                };
                if transfer.quantity <= 0 || transfer.quantity > item.quantity {
                    tracing::warn!(
                        order_id = %event.order_id,
                        instance_id = %transfer.instance_id,
                        requested = transfer.quantity,
                        available = item.quantity,
                        "ORDER_SPLIT quantity out of range, clamping"
                    );
                }
                let moved = transfer.quantity.clamp(0, item.quantity);
                item.quantity -= moved;
            }
            snapshot.items.retain(|i| i.quantity > 0 || i.is_removed);
            tracing::debug!(order_id = %event.order_id, %target_order_id, "split out");
        }
    }
}
