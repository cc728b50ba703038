//! OrderRestored event applier
//!
//! The audit-visible path back to ACTIVE from COMPLETED or VOID.

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus};

/// OrderRestored applier
pub struct OrderRestoredApplier;

impl EventApplier for OrderRestoredApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::OrderRestored {} = &event.payload {
            match snapshot.status {
                OrderStatus::Completed | OrderStatus::Void => {
                    snapshot.status = OrderStatus::Active;
                    snapshot.void_info = None;
                    snapshot.end_time = None;
                }
                status => {
                    tracing::warn!(
                        order_id = %event.order_id,
                        sequence = event.sequence,
                        ?status,
                        "ORDER_RESTORED ignored: order is not completed or voided"
                    );
                }
            }
        }
    }
}
