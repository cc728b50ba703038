//! PaymentAdded event applier

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// PaymentAdded applier
pub struct PaymentAddedApplier;

impl EventApplier for PaymentAddedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::PaymentAdded { payment } = &event.payload {
            if snapshot
                .payments
                .iter()
                .any(|p| p.payment_id == payment.payment_id)
            {
                tracing::warn!(
                    order_id = %event.order_id,
                    payment_id = %payment.payment_id,
                    "duplicate payment id ignored"
                );
                return;
            }
            snapshot.payments.push(payment.clone());
        }
    }
}
