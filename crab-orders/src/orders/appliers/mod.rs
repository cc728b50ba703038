//! Event applier implementations
//!
//! Each applier implements the `EventApplier` trait and handles
//! one specific event type. Appliers are PURE functions.

use enum_dispatch::enum_dispatch;

// enum_dispatch expands the trait signature here, so the context type must be in scope
#[allow(unused_imports)]
use super::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, TablePlacement};

mod item_comped;
mod item_modified;
mod item_removed;
mod item_restored;
mod item_uncomped;
mod items_added;
mod order_adjustment_applied;
mod order_completed;
mod order_info_updated;
mod order_merged;
mod order_merged_out;
mod order_moved;
mod order_moved_out;
mod order_note_added;
mod order_restored;
mod order_split;
mod order_split_in;
mod order_voided;
mod payment_added;
mod payment_cancelled;
mod rule_skip_toggled;
mod table_opened;
mod table_reassigned;
mod unknown;

pub use item_comped::ItemCompedApplier;
pub use item_modified::ItemModifiedApplier;
pub use item_removed::ItemRemovedApplier;
pub use item_restored::ItemRestoredApplier;
pub use item_uncomped::ItemUncompedApplier;
pub use items_added::ItemsAddedApplier;
pub use order_adjustment_applied::OrderAdjustmentAppliedApplier;
pub use order_completed::OrderCompletedApplier;
pub use order_info_updated::OrderInfoUpdatedApplier;
pub use order_merged::OrderMergedApplier;
pub use order_merged_out::OrderMergedOutApplier;
pub use order_moved::OrderMovedApplier;
pub use order_moved_out::OrderMovedOutApplier;
pub use order_note_added::OrderNoteAddedApplier;
pub use order_restored::OrderRestoredApplier;
pub use order_split::OrderSplitApplier;
pub use order_split_in::OrderSplitInApplier;
pub use order_voided::OrderVoidedApplier;
pub use payment_added::PaymentAddedApplier;
pub use payment_cancelled::PaymentCancelledApplier;
pub use rule_skip_toggled::RuleSkipToggledApplier;
pub use table_opened::TableOpenedApplier;
pub use table_reassigned::TableReassignedApplier;
pub use unknown::UnknownEventApplier;

/// EventAction enum - dispatches to concrete applier implementations
///
/// Uses enum_dispatch for zero-cost static dispatch.
#[enum_dispatch(EventApplier)]
pub enum EventAction {
    TableOpened(TableOpenedApplier),
    OrderCompleted(OrderCompletedApplier),
    OrderVoided(OrderVoidedApplier),
    OrderRestored(OrderRestoredApplier),
    ItemsAdded(ItemsAddedApplier),
    ItemModified(ItemModifiedApplier),
    ItemRemoved(ItemRemovedApplier),
    ItemRestored(ItemRestoredApplier),
    ItemComped(ItemCompedApplier),
    ItemUncomped(ItemUncompedApplier),
    PaymentAdded(PaymentAddedApplier),
    PaymentCancelled(PaymentCancelledApplier),
    OrderSplit(OrderSplitApplier),
    OrderSplitIn(OrderSplitInApplier),
    OrderMoved(OrderMovedApplier),
    OrderMovedOut(OrderMovedOutApplier),
    OrderMerged(OrderMergedApplier),
    OrderMergedOut(OrderMergedOutApplier),
    TableReassigned(TableReassignedApplier),
    OrderInfoUpdated(OrderInfoUpdatedApplier),
    OrderNoteAdded(OrderNoteAddedApplier),
    OrderAdjustmentApplied(OrderAdjustmentAppliedApplier),
    RuleSkipToggled(RuleSkipToggledApplier),
    Unknown(UnknownEventApplier),
}

/// Convert OrderEvent reference to EventAction
///
/// This is the ONLY place with a match on EventPayload; a new variant fails
/// to compile until it is handled here.
impl From<&OrderEvent> for EventAction {
    fn from(event: &OrderEvent) -> Self {
        match &event.payload {
            EventPayload::TableOpened { .. } => EventAction::TableOpened(TableOpenedApplier),
            EventPayload::OrderCompleted { .. } => {
                EventAction::OrderCompleted(OrderCompletedApplier)
            }
            EventPayload::OrderVoided { .. } => EventAction::OrderVoided(OrderVoidedApplier),
            EventPayload::OrderRestored {} => EventAction::OrderRestored(OrderRestoredApplier),
            EventPayload::ItemsAdded { .. } => EventAction::ItemsAdded(ItemsAddedApplier),
            EventPayload::ItemModified { .. } => EventAction::ItemModified(ItemModifiedApplier),
            EventPayload::ItemRemoved { .. } => EventAction::ItemRemoved(ItemRemovedApplier),
            EventPayload::ItemRestored { .. } => EventAction::ItemRestored(ItemRestoredApplier),
            EventPayload::ItemComped { .. } => EventAction::ItemComped(ItemCompedApplier),
            EventPayload::ItemUncomped { .. } => EventAction::ItemUncomped(ItemUncompedApplier),
            EventPayload::PaymentAdded { .. } => EventAction::PaymentAdded(PaymentAddedApplier),
            EventPayload::PaymentCancelled { .. } => {
                EventAction::PaymentCancelled(PaymentCancelledApplier)
            }
            EventPayload::OrderSplit { .. } => EventAction::OrderSplit(OrderSplitApplier),
            EventPayload::OrderSplitIn { .. } => EventAction::OrderSplitIn(OrderSplitInApplier),
            EventPayload::OrderMoved { .. } => EventAction::OrderMoved(OrderMovedApplier),
            EventPayload::OrderMovedOut { .. } => EventAction::OrderMovedOut(OrderMovedOutApplier),
            EventPayload::OrderMerged { .. } => EventAction::OrderMerged(OrderMergedApplier),
            EventPayload::OrderMergedOut { .. } => {
                EventAction::OrderMergedOut(OrderMergedOutApplier)
            }
            EventPayload::TableReassigned { .. } => {
                EventAction::TableReassigned(TableReassignedApplier)
            }
            EventPayload::OrderInfoUpdated { .. } => {
                EventAction::OrderInfoUpdated(OrderInfoUpdatedApplier)
            }
            EventPayload::OrderNoteAdded { .. } => {
                EventAction::OrderNoteAdded(OrderNoteAddedApplier)
            }
            EventPayload::OrderAdjustmentApplied { .. } => {
                EventAction::OrderAdjustmentApplied(OrderAdjustmentAppliedApplier)
            }
            EventPayload::RuleSkipToggled { .. } => {
                EventAction::RuleSkipToggled(RuleSkipToggledApplier)
            }
            EventPayload::Unknown => EventAction::Unknown(UnknownEventApplier),
        }
    }
}

/// Copy placement fields from an order-creating event
fn place(snapshot: &mut OrderSnapshot, placement: &TablePlacement) {
    snapshot.table_id = placement.table_id.clone();
    snapshot.table_name = placement.table_name.clone();
    snapshot.zone_id = placement.zone_id.clone();
    snapshot.zone_name = placement.zone_name.clone();
    snapshot.guest_count = placement.guest_count;
    snapshot.is_retail = placement.is_retail;
}
