//! ItemModified event applier
//!
//! Records previous values for every changed field so the timeline can show
//! deltas, then re-selects the line's rules at the event time.

use crate::orders::repricing::select_item_rules;
use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, ItemChanges, OrderEvent, OrderLineItem, OrderSnapshot};

/// ItemModified applier
pub struct ItemModifiedApplier;

impl EventApplier for ItemModifiedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, ctx: &PricingContext<'_>) {
        let EventPayload::ItemModified {
            instance_id,
            changes,
        } = &event.payload
        else {
            return;
        };
        let Some(index) = snapshot
            .items
            .iter()
            .position(|i| i.instance_id == *instance_id && !i.is_removed)
        else {
            tracing::warn!(
                order_id = %event.order_id,
                %instance_id,
                "ITEM_MODIFIED for unknown or removed line"
            );
            return;
        };

        let mut item = snapshot.items[index].clone();
        let previous = apply_changes(&mut item, changes, event);
        if previous.is_empty() {
            return;
        }
        item.previous_values = Some(previous);
        select_item_rules(snapshot, &mut item, event.timestamp, ctx);
        snapshot.items[index] = item;
    }
}

/// Apply `changes`, returning the old value of every field that changed
fn apply_changes(
    item: &mut OrderLineItem,
    changes: &ItemChanges,
    event: &OrderEvent,
) -> ItemChanges {
    let mut previous = ItemChanges::default();

    if let Some(price) = changes.price.filter(|p| *p != item.unit_price) {
        previous.price = Some(item.unit_price);
        item.unit_price = price;
    }
    if let Some(quantity) = changes.quantity.filter(|q| *q != item.quantity) {
        if quantity > 0 {
            previous.quantity = Some(item.quantity);
            item.quantity = quantity;
        } else {
            tracing::warn!(
                order_id = %event.order_id,
                instance_id = %item.instance_id,
                quantity,
                "ignoring non-positive quantity"
            );
        }
    }
    if changes.manual_discount_percent.is_some()
        && changes.manual_discount_percent != item.manual_discount_percent
    {
        previous.manual_discount_percent = Some(item.manual_discount_percent.unwrap_or_default());
        item.manual_discount_percent = changes.manual_discount_percent;
    }
    if changes.surcharge.is_some() && changes.surcharge != item.surcharge {
        previous.surcharge = Some(item.surcharge.unwrap_or_default());
        item.surcharge = changes.surcharge;
    }
    if changes.note.is_some() && changes.note != item.note {
        previous.note = Some(item.note.clone().unwrap_or_default());
        item.note = changes.note.clone();
    }

    previous
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::models::price_rule::RuleSet;
    use shared::order::{LineItemInput, OrderLineItem};

    fn snapshot_with_line() -> OrderSnapshot {
        let mut snapshot = OrderSnapshot::new("order-1", 0);
        snapshot.items.push(OrderLineItem::from_input(LineItemInput {
            instance_id: "i-1".into(),
            spec_id: "s-1".into(),
            product_id: 1,
            category_id: None,
            tag_ids: vec![],
            name: "Beer".into(),
            unit_price: Decimal::new(400, 2),
            quantity: 2,
            selected_options: vec![],
            manual_discount_percent: None,
            surcharge: None,
            tax_rate: None,
            note: None,
        }));
        snapshot
    }

    #[test]
    fn test_only_changed_fields_recorded() {
        let rules = RuleSet::default();
        let ctx = PricingContext::new(&rules);
        let mut snapshot = snapshot_with_line();
        let event = OrderEvent::new(
            3,
            "order-1",
            10,
            EventPayload::ItemModified {
                instance_id: "i-1".into(),
                changes: ItemChanges {
                    price: Some(Decimal::new(450, 2)),
                    quantity: Some(2),
                    manual_discount_percent: Some(Decimal::new(10, 0)),
                    surcharge: None,
                    note: None,
                },
            },
        );

        ItemModifiedApplier.apply(&mut snapshot, &event, &ctx);

        let item = &snapshot.items[0];
        assert_eq!(item.unit_price, Decimal::new(450, 2));
        assert_eq!(item.manual_discount_percent, Some(Decimal::new(10, 0)));
        let previous = item.previous_values.as_ref().unwrap();
        assert_eq!(previous.price, Some(Decimal::new(400, 2)));
        assert_eq!(previous.quantity, None);
        assert_eq!(previous.manual_discount_percent, Some(Decimal::ZERO));
        assert_eq!(previous.surcharge, None);
    }

    #[test]
    fn test_unknown_line_is_ignored() {
        let rules = RuleSet::default();
        let ctx = PricingContext::new(&rules);
        let mut snapshot = snapshot_with_line();
        let before = snapshot.clone();
        let event = OrderEvent::new(
            3,
            "order-1",
            10,
            EventPayload::ItemModified {
                instance_id: "missing".into(),
                changes: ItemChanges {
                    quantity: Some(5),
                    ..Default::default()
                },
            },
        );
        ItemModifiedApplier.apply(&mut snapshot, &event, &ctx);
        assert_eq!(snapshot, before);
    }

    #[test]
    fn test_removed_line_is_not_modified() {
        let rules = RuleSet::default();
        let ctx = PricingContext::new(&rules);
        let mut snapshot = snapshot_with_line();
        snapshot.items[0].is_removed = true;
        let before = snapshot.clone();
        let event = OrderEvent::new(
            3,
            "order-1",
            10,
            EventPayload::ItemModified {
                instance_id: "i-1".into(),
                changes: ItemChanges {
                    price: Some(Decimal::new(900, 2)),
                    ..Default::default()
                },
            },
        );
        ItemModifiedApplier.apply(&mut snapshot, &event, &ctx);
        assert_eq!(snapshot, before);
    }
}
