//! TableOpened event applier

use crate::orders::repricing::select_order_rules;
use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// TableOpened applier
pub struct TableOpenedApplier;

impl EventApplier for TableOpenedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, ctx: &PricingContext<'_>) {
        if let EventPayload::TableOpened {
            placement,
            receipt_number,
        } = &event.payload
        {
            super::place(snapshot, placement);
            snapshot.receipt_number = receipt_number.clone();
            snapshot.created_at = event.timestamp;
            select_order_rules(snapshot, event.timestamp, ctx);
        }
    }
}
