//! OrderCompleted event applier

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderCompleted applier
pub struct OrderCompletedApplier;

impl EventApplier for OrderCompletedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::OrderCompleted { receipt_number } = &event.payload {
            snapshot.status = OrderStatus::Completed;
            snapshot.end_time = Some(event.timestamp);
            if receipt_number.is_some() {
                snapshot.receipt_number = receipt_number.clone();
            }
        }
    }
}
