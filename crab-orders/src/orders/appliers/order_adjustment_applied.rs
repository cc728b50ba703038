//! OrderAdjustmentApplied event applier

use crate::orders::traits::{EventApplier, PricingContext};
use shared::models::price_rule::RuleType;
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// OrderAdjustmentApplied applier
pub struct OrderAdjustmentAppliedApplier;

impl EventApplier for OrderAdjustmentAppliedApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::OrderAdjustmentApplied {
            rule_type,
            adjustment,
        } = &event.payload
        {
            match rule_type {
                RuleType::Discount => snapshot.order_manual_discount = adjustment.clone(),
                RuleType::Surcharge => snapshot.order_manual_surcharge = adjustment.clone(),
            }
        }
    }
}
