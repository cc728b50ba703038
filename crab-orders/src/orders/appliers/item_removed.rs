//! ItemRemoved event applier
//!
//! Soft delete: the line stays on the order for history and can be restored.

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// ItemRemoved applier
pub struct ItemRemovedApplier;

impl EventApplier for ItemRemovedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::ItemRemoved {
            instance_id,
            reason,
        } = &event.payload
        {
            match snapshot.find_item_mut(instance_id) {
                Some(item) => {
                    item.is_removed = true;
                    tracing::debug!(
                        order_id = %event.order_id,
                        %instance_id,
                        reason = reason.as_deref().unwrap_or("-"),
                        "line removed"
                    );
                }
                None => tracing::warn!(
                    order_id = %event.order_id,
                    %instance_id,
                    "ITEM_REMOVED for unknown line"
                ),
            }
        }
    }
}
