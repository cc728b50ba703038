//! In-memory snapshot store
//!
//! Owns the `order_id -> OrderSnapshot` map and the current rule set. It is
//! mutated only by reducer output: each event produces a complete new
//! snapshot that replaces the old one in a single insert, and a batch is
//! staged aside and committed only when every event in it passed.

use super::integrity::{self, IntegrityError};
use super::reducer;
use super::traits::PricingContext;
use crate::money::RoundingMode;
use shared::models::price_rule::RuleSet;
use shared::order::{OrderEvent, OrderSnapshot};
use std::collections::HashMap;
use tracing::{debug, info};

/// Snapshot store plus the pricing inputs the reducer needs
#[derive(Debug, Clone, Default)]
pub struct OrderStore {
    snapshots: HashMap<String, OrderSnapshot>,
    rules: RuleSet,
    utc_offset_minutes: i32,
    rounding: RoundingMode,
}

impl OrderStore {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    pub fn with_pricing(mut self, utc_offset_minutes: i32, rounding: RoundingMode) -> Self {
        self.utc_offset_minutes = utc_offset_minutes;
        self.rounding = rounding;
        self
    }

    fn context(&self) -> PricingContext<'_> {
        PricingContext::new(&self.rules)
            .with_utc_offset(self.utc_offset_minutes)
            .with_rounding(self.rounding)
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Install a new rule set; returns whether the version changed.
    ///
    /// Existing snapshots keep the adjustments they were priced with; the new
    /// rules apply from the next event onwards.
    pub fn set_rules(&mut self, rules: RuleSet) -> bool {
        if rules.version == self.rules.version && rules == self.rules {
            return false;
        }
        info!(
            old_version = %self.rules.version,
            new_version = %rules.version,
            rule_count = rules.rules.len(),
            "Price rule set updated"
        );
        self.rules = rules;
        true
    }

    pub fn get(&self, order_id: &str) -> Option<&OrderSnapshot> {
        self.snapshots.get(order_id)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &OrderSnapshot> {
        self.snapshots.values()
    }

    /// Active orders, oldest first
    pub fn active_orders(&self) -> Vec<&OrderSnapshot> {
        let mut orders: Vec<_> = self.snapshots.values().filter(|s| s.is_active()).collect();
        orders.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.order_id.cmp(&b.order_id))
        });
        orders
    }

    /// Active orders with no table that are not retail
    pub fn ghost_orders(&self) -> Vec<&OrderSnapshot> {
        self.active_orders()
            .into_iter()
            .filter(|s| s.is_ghost())
            .collect()
    }

    /// Verify and apply one event; returns whether a snapshot changed
    pub fn apply_event(&mut self, event: &OrderEvent) -> Result<bool, IntegrityError> {
        let prev = self.snapshots.get(&event.order_id);
        integrity::verify_link(prev, event)?;
        let next = reducer::apply(prev, event, &self.context());
        Ok(self.commit(&event.order_id, next))
    }

    /// Verify and apply a batch; nothing is committed unless every event passes
    pub fn apply_batch(&mut self, events: &[OrderEvent]) -> Result<usize, IntegrityError> {
        let ctx = self.context();
        let mut staged: HashMap<String, Option<OrderSnapshot>> = HashMap::new();

        for event in events {
            let prev = match staged.get(&event.order_id) {
                Some(s) => s.as_ref(),
                None => self.snapshots.get(&event.order_id),
            };
            integrity::verify_link(prev, event)?;
            let next = reducer::apply(prev, event, &ctx);
            staged.insert(event.order_id.clone(), next);
        }

        let mut changed = 0;
        for (order_id, next) in staged {
            if self.commit(&order_id, next) {
                changed += 1;
            }
        }
        debug!(events = events.len(), changed, "Event batch committed");
        Ok(changed)
    }

    fn commit(&mut self, order_id: &str, next: Option<OrderSnapshot>) -> bool {
        let Some(next) = next else {
            return false;
        };
        if self.snapshots.get(order_id) == Some(&next) {
            return false;
        }
        self.snapshots.insert(order_id.to_string(), next);
        true
    }

    /// Replace every snapshot (full sync)
    pub fn replace_all(&mut self, snapshots: Vec<OrderSnapshot>) {
        self.snapshots = snapshots
            .into_iter()
            .map(|s| (s.order_id.clone(), s))
            .collect();
        info!(count = self.snapshots.len(), "Snapshot store replaced");
    }

    /// Drop one order's local view
    pub fn remove(&mut self, order_id: &str) -> Option<OrderSnapshot> {
        self.snapshots.remove(order_id)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
