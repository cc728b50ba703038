//! OrderMergedOut event applier (source side)

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderMergedOut applier
pub struct OrderMergedOutApplier;

impl EventApplier for OrderMergedOutApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::OrderMergedOut { target_order_id } = &event.payload {
            snapshot.items.clear();
            snapshot.status = OrderStatus::Merged;
            snapshot.related_order_id = Some(target_order_id.clone());
            snapshot.end_time = Some(event.timestamp);
        }
    }
}
