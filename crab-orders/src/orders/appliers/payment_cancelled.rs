//! PaymentCancelled event applier

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// PaymentCancelled applier
pub struct PaymentCancelledApplier;

impl EventApplier for PaymentCancelledApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::PaymentCancelled { payment_id, reason } = &event.payload {
            match snapshot
                .payments
                .iter_mut()
                .find(|p| &p.payment_id == payment_id)
            {
                Some(payment) => {
                    payment.cancelled = true;
                    payment.cancel_reason = reason.clone();
                }
                None => tracing::warn!(
                    order_id = %event.order_id,
                    %payment_id,
                    "PAYMENT_CANCELLED for unknown payment"
                ),
            }
        }
    }
}
