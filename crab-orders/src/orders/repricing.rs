//! Rule selection for lines and orders
//!
//! Selection (which rules apply) happens when a line is added and when the
//! order changes zone. Amounts of already selected percentage rules follow
//! the line price on every recomputation (see [`super::totals`]).

use super::traits::PricingContext;
use crate::money;
use crate::pricing::{MatchContext, ProductRef, evaluate};
use rust_decimal::Decimal;
use shared::order::{OrderLineItem, OrderSnapshot, RuleAdjustment};
use std::collections::HashMap;

/// Per-unit price rules are taken from: (unit price + options) less manual discount
pub fn rule_base_price(item: &OrderLineItem) -> Decimal {
    let base = money::add(item.unit_price, item.options_total());
    let manual = item
        .manual_discount_percent
        .map(|pct| money::percent_of(base, pct))
        .unwrap_or_default();
    money::max(money::sub(base, manual), Decimal::ZERO)
}

fn item_context(
    snapshot: &OrderSnapshot,
    item: &OrderLineItem,
    now: i64,
    ctx: &PricingContext<'_>,
) -> MatchContext {
    MatchContext {
        product: Some(ProductRef {
            product_id: item.product_id,
            category_id: item.category_id,
            tag_ids: item.tag_ids.clone(),
        }),
        zone_id: snapshot.zone_id.clone(),
        is_retail: snapshot.is_retail,
        quantity: item.quantity,
        base_price: rule_base_price(item),
        now,
        utc_offset_minutes: ctx.utc_offset_minutes,
        force_time_check: false,
    }
}

/// Re-select item rules, keeping operator skip flags by rule id
pub fn select_item_rules(
    snapshot: &OrderSnapshot,
    item: &mut OrderLineItem,
    now: i64,
    ctx: &PricingContext<'_>,
) {
    let match_ctx = item_context(snapshot, item, now, ctx);
    let selected = evaluate(&ctx.rules.item_rules(), &match_ctx);
    item.applied_rules = carry_skip_flags(&item.applied_rules, selected);
}

/// Re-select order-level rules against the current item total
pub fn select_order_rules(snapshot: &mut OrderSnapshot, now: i64, ctx: &PricingContext<'_>) {
    // Line totals must be current before they serve as the base
    super::totals::recalculate(snapshot, ctx.rounding);
    let base = items_net(snapshot);
    let match_ctx = MatchContext {
        product: None,
        zone_id: snapshot.zone_id.clone(),
        is_retail: snapshot.is_retail,
        quantity: 1,
        base_price: base,
        now,
        utc_offset_minutes: ctx.utc_offset_minutes,
        force_time_check: false,
    };
    let selected = evaluate(&ctx.rules.order_rules(), &match_ctx);
    snapshot.order_rule_adjustments = carry_skip_flags(&snapshot.order_rule_adjustments, selected);
    snapshot.rule_set_version = Some(ctx.rules.version.clone());
}

/// Full re-selection after a zone change
pub fn reprice_all(snapshot: &mut OrderSnapshot, now: i64, ctx: &PricingContext<'_>) {
    let mut items = std::mem::take(&mut snapshot.items);
    for item in items.iter_mut().filter(|i| !i.is_removed) {
        select_item_rules(snapshot, item, now, ctx);
    }
    snapshot.items = items;
    select_order_rules(snapshot, now, ctx);
}

/// Append lines, merging quantities into lines with the same instance id
pub fn merge_lines(snapshot: &mut OrderSnapshot, incoming: &[OrderLineItem]) {
    for line in incoming {
        match line_slot(snapshot, &line.instance_id) {
            LineSlot::Live(index) => {
                let existing = &mut snapshot.items[index];
                existing.quantity = existing.quantity.saturating_add(line.quantity);
            }
            LineSlot::Removed(index) => snapshot.items[index] = line.clone(),
            LineSlot::Vacant => snapshot.items.push(line.clone()),
        }
    }
}

/// Where a line with a given `instance_id` lands in an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineSlot {
    /// A live line with the same id absorbs the quantity
    Live(usize),
    /// A removed line with the same id is replaced in place
    Removed(usize),
    Vacant,
}

/// Instance ids stay unique within an order, removed lines included
pub fn line_slot(snapshot: &OrderSnapshot, instance_id: &str) -> LineSlot {
    match snapshot
        .items
        .iter()
        .position(|i| i.instance_id == instance_id)
    {
        Some(index) if snapshot.items[index].is_removed => LineSlot::Removed(index),
        Some(index) => LineSlot::Live(index),
        None => LineSlot::Vacant,
    }
}

/// Sum of billable line totals (order-level rule base)
pub fn items_net(snapshot: &OrderSnapshot) -> Decimal {
    money::sum(
        snapshot
            .items
            .iter()
            .filter(|i| i.is_billable())
            .map(|i| i.line_total),
    )
}

fn carry_skip_flags(
    previous: &[RuleAdjustment],
    mut selected: Vec<RuleAdjustment>,
) -> Vec<RuleAdjustment> {
    let skipped: HashMap<i64, bool> = previous.iter().map(|r| (r.rule_id, r.skipped)).collect();
    for adj in &mut selected {
        if let Some(flag) = skipped.get(&adj.rule_id) {
            adj.skipped = *flag;
        }
    }
    selected
}
