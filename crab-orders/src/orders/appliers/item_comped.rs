//! ItemComped event applier

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemComped applier
pub struct ItemCompedApplier;

impl EventApplier for ItemCompedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::ItemComped { instance_id, .. } = &event.payload {
            match snapshot.find_item_mut(instance_id) {
                Some(item) => item.is_comped = true,
                None => tracing::warn!(
                    order_id = %event.order_id,
                    %instance_id,
                    "ITEM_COMPED for unknown line"
                ),
            }
        }
    }
}
