//! ItemRestored event applier

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemRestored applier
pub struct ItemRestoredApplier;

impl EventApplier for ItemRestoredApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::ItemRestored { instance_id, .. } = &event.payload {
            match snapshot.find_item_mut(instance_id) {
                Some(item) => item.is_removed = false,
                None => tracing::warn!(
                    order_id = %event.order_id,
                    %instance_id,
                    "ITEM_RESTORED for unknown line"
                ),
            }
        }
    }
}
