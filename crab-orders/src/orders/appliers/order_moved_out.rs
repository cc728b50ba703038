//! OrderMovedOut event applier (source side)

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderMovedOut applier
pub struct OrderMovedOutApplier;

impl EventApplier for OrderMovedOutApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::OrderMovedOut {
            target_order_id, ..
        } = &event.payload
        {
            snapshot.items.clear();
            snapshot.status = OrderStatus::Moved;
            snapshot.related_order_id = Some(target_order_id.clone());
            snapshot.end_time = Some(event.timestamp);
        }
    }
}
