//! TableReassigned event applier
//!
//! Same order, new table. A zone change re-selects item and order rules for
//! the new zone (skip flags are kept per rule id).

use crate::orders::repricing::reprice_all;
use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// TableReassigned applier
pub struct TableReassignedApplier;

impl EventApplier for TableReassignedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, ctx: &PricingContext<'_>) {
        if let EventPayload::TableReassigned {
            table_id,
            table_name,
            zone_id,
            zone_name,
        } = &event.payload
        {
            let zone_changed = snapshot.zone_id != *zone_id;
            snapshot.table_id = table_id.clone();
            snapshot.table_name = table_name.clone();
            snapshot.zone_id = zone_id.clone();
            snapshot.zone_name = zone_name.clone();

            if zone_changed {
                tracing::debug!(order_id = %event.order_id, "zone changed, repricing");
                reprice_all(snapshot, event.timestamp, ctx);
            }
        }
    }
}
