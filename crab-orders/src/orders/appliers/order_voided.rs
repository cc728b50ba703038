//! OrderVoided event applier
//!
//! LOSS_SETTLED books the outstanding amount (or the explicit amount on the
//! event) for tax reporting; CANCELLED records no loss.

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot, OrderStatus, VoidInfo, VoidType};

/// OrderVoided applier
pub struct OrderVoidedApplier;

impl EventApplier for OrderVoidedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::OrderVoided {
            void_type,
            loss_reason,
            loss_amount,
            note,
        } = &event.payload
        {
            let (loss_reason, loss_amount) = match void_type {
                VoidType::Cancelled => (None, None),
                VoidType::LossSettled => (
                    *loss_reason,
                    Some(loss_amount.unwrap_or(snapshot.remaining_amount)),
                ),
            };
            snapshot.void_info = Some(VoidInfo {
                void_type: *void_type,
                loss_reason,
                loss_amount,
                note: note.clone(),
                voided_at: event.timestamp,
            });
            snapshot.status = OrderStatus::Void;
            snapshot.end_time = Some(event.timestamp);
        }
    }
}
