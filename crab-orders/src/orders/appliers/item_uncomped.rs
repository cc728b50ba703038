//! ItemUncomped event applier

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemUncomped applier
pub struct ItemUncompedApplier;

impl EventApplier for ItemUncompedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::ItemUncomped { instance_id, .. } = &event.payload {
            match snapshot.find_item_mut(instance_id) {
                Some(item) => item.is_comped = false,
                None => tracing::warn!(
                    order_id = %event.order_id,
                    %instance_id,
                    "ITEM_UNCOMPED for unknown line"
                ),
            }
        }
    }
}
