//! ItemsAdded event applier
//!
//! Appends lines and selects price rules for each new line at the event time.
//! A new line whose id matches a removed line takes that line's place.

use crate::orders::repricing::{LineSlot, line_slot, select_item_rules};
use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderLineItem, OrderSnapshot};

/// ItemsAdded applier
pub struct ItemsAddedApplier;

impl EventApplier for ItemsAddedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, ctx: &PricingContext<'_>) {
        if let EventPayload::ItemsAdded { items } = &event.payload {
            for input in items {
                if input.quantity <= 0 {
                    tracing::warn!(
                        order_id = %event.order_id,
                        instance_id = %input.instance_id,
                        quantity = input.quantity,
                        "ignoring line with non-positive quantity"
                    );
                    continue;
                }

                let slot = line_slot(snapshot, &input.instance_id);
                if let LineSlot::Live(index) = slot {
                    let existing = &mut snapshot.items[index];
                    existing.quantity = existing.quantity.saturating_add(input.quantity);
                    continue;
                }

                let mut line = OrderLineItem::from_input(input.clone());
                select_item_rules(snapshot, &mut line, event.timestamp, ctx);
                match slot {
                    LineSlot::Removed(index) => snapshot.items[index] = line,
                    _ => snapshot.items.push(line),
                }
            }
            snapshot.rule_set_version = Some(ctx.rules.version.clone());
        }
    }
}
