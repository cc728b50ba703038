//! Applier trait and the pricing context threaded through the reducer

use crate::money::RoundingMode;
use enum_dispatch::enum_dispatch;
use shared::models::price_rule::RuleSet;
use shared::order::{OrderEvent, OrderSnapshot};

/// Inputs the reducer needs besides the event itself
#[derive(Debug, Clone, Copy)]
pub struct PricingContext<'a> {
    pub rules: &'a RuleSet,
    /// Store-local offset for rule schedules
    pub utc_offset_minutes: i32,
    pub rounding: RoundingMode,
}

impl<'a> PricingContext<'a> {
    pub fn new(rules: &'a RuleSet) -> Self {
        Self {
            rules,
            utc_offset_minutes: 0,
            rounding: RoundingMode::HalfUp,
        }
    }

    pub fn with_utc_offset(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    pub fn with_rounding(mut self, rounding: RoundingMode) -> Self {
        self.rounding = rounding;
        self
    }
}

/// One implementation per event type.
///
/// Appliers mutate content only; sequence/hash bookkeeping and total
/// recomputation are done once by the reducer.
#[enum_dispatch]
pub trait EventApplier {
    fn apply(&self, snapshot: &mut OrderSnapshot, event: &OrderEvent, ctx: &PricingContext<'_>);
}
