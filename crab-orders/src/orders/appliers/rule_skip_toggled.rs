//! RuleSkipToggled event applier
//!
//! Flips `skipped` on the matching adjustments only. With an `instance_id`
//! the toggle is limited to that line; without one it covers the order-level
//! list and every line. Totals are recomputed by the reducer.

use crate::orders::traits::{EventApplier, PricingContext};
use shared::order::{EventPayload, OrderEvent, OrderSnapshot};

/// RuleSkipToggled applier
pub struct RuleSkipToggledApplier;

impl EventApplier for RuleSkipToggledApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, _ctx: &PricingContext<'_>) {
        if let EventPayload::RuleSkipToggled {
            rule_id,
            skipped,
            instance_id,
        } = &event.payload
        {
            let mut touched = 0usize;
            for item in &mut snapshot.items {
                if instance_id.as_ref().is_some_and(|id| *id != item.instance_id) {
                    continue;
                }
                for rule in item.applied_rules.iter_mut().filter(|r| r.rule_id == *rule_id) {
                    rule.skipped = *skipped;
                    touched += 1;
                }
            }
            if instance_id.is_none() {
                for rule in snapshot
                    .order_rule_adjustments
                    .iter_mut()
                    .filter(|r| r.rule_id == *rule_id)
                {
                    rule.skipped = *skipped;
                    touched += 1;
                }
            }
            if touched == 0 {
                tracing::warn!(
                    order_id = %event.order_id,
                    rule_id,
                    "RULE_SKIP_TOGGLED matched no applied rule"
                );
            }
        }
    }
}
