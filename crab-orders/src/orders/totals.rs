//! Order total recomputation
//!
//! Invoked by the reducer after every applied event. All intermediate terms
//! keep full precision; only `total` is rounded to 2 places.
//!
//! ```text
//! subtotal        = Σ (unit_price + options) × qty          billable lines
//! line_gross      = max(after_manual + rule surcharges + surcharge, 0)
//! line_total      = (line_gross - min(rule discounts, line_gross)) × qty
//! tax             = Σ line_total × tax_rate / 100           (exclusive)
//! total_discount  = item manual + item rules + order rules + order manual
//! total           = round2(subtotal - total_discount + total_surcharge + tax)
//! remaining       = max(total - paid, 0)
//! ```

use super::repricing::rule_base_price;
use crate::money::{self, RoundingMode};
use crate::pricing::signed_amount;
use rust_decimal::Decimal;
use shared::models::price_rule::RuleType;
use shared::order::{OrderAdjustment, OrderSnapshot, RuleAdjustment};

/// Recompute every derived money field of `snapshot`
pub fn recalculate(snapshot: &mut OrderSnapshot, rounding: RoundingMode) {
    let mut subtotal = Decimal::ZERO;
    let mut item_manual_discount = Decimal::ZERO;
    let mut item_manual_surcharge = Decimal::ZERO;
    let mut item_rule_discount = Decimal::ZERO;
    let mut item_rule_surcharge = Decimal::ZERO;
    let mut items_net = Decimal::ZERO;
    let mut tax = Decimal::ZERO;

    for item in &mut snapshot.items {
        let after_manual = rule_base_price(item);
        // Percentage amounts follow the current line price
        for adj in &mut item.applied_rules {
            adj.calculated_amount =
                signed_amount(adj.rule_type, adj.adjustment_type, adj.value, after_manual);
        }

        if !item.is_billable() {
            item.line_total = Decimal::ZERO;
            continue;
        }

        let q = money::qty(item.quantity);
        let base = money::add(item.unit_price, item.options_total());
        let manual_unit = money::sub(base, after_manual);
        let surcharge_unit = item.surcharge.unwrap_or_default();
        let rule_discount_unit = money::abs(item.rule_amount(RuleType::Discount));
        let rule_surcharge_unit = item.rule_amount(RuleType::Surcharge);

        // A line's rule discount never exceeds what is left of that line
        let before_discount = money::max(
            money::sum([after_manual, rule_surcharge_unit, surcharge_unit]),
            Decimal::ZERO,
        );
        let rule_discount_unit = money::min(rule_discount_unit, before_discount);
        let unit_net = money::sub(before_discount, rule_discount_unit);
        item.line_total = money::mul(unit_net, q);

        subtotal = money::add(subtotal, money::mul(base, q));
        item_manual_discount = money::add(item_manual_discount, money::mul(manual_unit, q));
        item_manual_surcharge = money::add(item_manual_surcharge, money::mul(surcharge_unit, q));
        item_rule_discount = money::add(item_rule_discount, money::mul(rule_discount_unit, q));
        item_rule_surcharge = money::add(item_rule_surcharge, money::mul(rule_surcharge_unit, q));
        items_net = money::add(items_net, item.line_total);
        if let Some(rate) = item.tax_rate {
            tax = money::add(tax, money::percent_of(item.line_total, rate));
        }
    }

    // Order-level rules are taken from the item total
    for adj in &mut snapshot.order_rule_adjustments {
        adj.calculated_amount =
            signed_amount(adj.rule_type, adj.adjustment_type, adj.value, items_net);
    }
    let order_rules = &snapshot.order_rule_adjustments;
    let order_rule_discount = money::abs(order_rule_sum(order_rules, RuleType::Discount));
    let order_rule_surcharge = order_rule_sum(order_rules, RuleType::Surcharge);
    let order_manual_discount = manual_amount(snapshot.order_manual_discount.as_ref(), items_net);
    let order_manual_surcharge = manual_amount(snapshot.order_manual_surcharge.as_ref(), items_net);

    let total_discount = money::sum([
        item_manual_discount,
        item_rule_discount,
        order_rule_discount,
        order_manual_discount,
    ]);
    let total_surcharge = money::sum([
        item_manual_surcharge,
        item_rule_surcharge,
        order_rule_surcharge,
        order_manual_surcharge,
    ]);

    let raw_total = money::sum([subtotal, -total_discount, total_surcharge, tax]);
    let total = money::round2_with(money::max(raw_total, Decimal::ZERO), rounding);

    let paid = money::sum(
        snapshot
            .payments
            .iter()
            .filter(|p| !p.cancelled)
            .map(|p| p.amount),
    );

    snapshot.subtotal = subtotal;
    snapshot.item_manual_discount = item_manual_discount;
    snapshot.item_manual_surcharge = item_manual_surcharge;
    snapshot.item_rule_discount = item_rule_discount;
    snapshot.item_rule_surcharge = item_rule_surcharge;
    snapshot.order_rule_discount = order_rule_discount;
    snapshot.order_rule_surcharge = order_rule_surcharge;
    snapshot.order_manual_discount_amount = order_manual_discount;
    snapshot.order_manual_surcharge_amount = order_manual_surcharge;
    snapshot.total_discount = total_discount;
    snapshot.total_surcharge = total_surcharge;
    snapshot.tax = tax;
    snapshot.total = total;
    snapshot.paid_amount = paid;
    snapshot.remaining_amount = money::max(money::sub(total, paid), Decimal::ZERO);
}

fn order_rule_sum(adjustments: &[RuleAdjustment], rule_type: RuleType) -> Decimal {
    money::sum(
        adjustments
            .iter()
            .filter(|a| a.rule_type == rule_type)
            .map(RuleAdjustment::effective_amount),
    )
}

/// Positive magnitude of a manual order adjustment
fn manual_amount(adjustment: Option<&OrderAdjustment>, base: Decimal) -> Decimal {
    match adjustment {
        Some(adj) => money::abs(signed_amount(
            RuleType::Surcharge,
            adj.adjustment_type,
            adj.value,
            base,
        )),
        None => Decimal::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::price_rule::{
        AdjustmentType, PriceRule, ProductScope, RuleLevel, TimeMode,
    };
    use shared::order::{OrderLineItem, Payment};
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn line(id: &str, price: &str, qty: i32) -> OrderLineItem {
        OrderLineItem {
            instance_id: id.to_string(),
            spec_id: format!("spec-{id}"),
            product_id: 1,
            category_id: None,
            tag_ids: vec![],
            name: id.to_string(),
            unit_price: d(price),
            quantity: qty,
            selected_options: vec![],
            manual_discount_percent: None,
            surcharge: None,
            tax_rate: None,
            applied_rules: vec![],
            is_comped: false,
            is_removed: false,
            note: None,
            previous_values: None,
            line_total: Decimal::ZERO,
        }
    }

    fn discount(id: i64, pct: &str) -> RuleAdjustment {
        let rule = PriceRule {
            id,
            name: format!("r{id}"),
            receipt_name: None,
            rule_type: RuleType::Discount,
            product_scope: ProductScope::Global,
            target_id: None,
            zone_scope: "all".into(),
            adjustment_type: AdjustmentType::Percentage,
            adjustment_value: d(pct),
            priority: 0,
            is_stackable: true,
            is_exclusive: false,
            rule_level: RuleLevel::Item,
            time_mode: TimeMode::Always,
            valid_from: None,
            valid_until: None,
            active_days: None,
            active_start_time: None,
            active_end_time: None,
            is_active: true,
            created_at: 0,
        };
        RuleAdjustment::from_rule(&rule, Decimal::ZERO)
    }

    #[test]
    fn test_percentage_discount_scenario() {
        let mut s = OrderSnapshot::new("o", 0);
        let mut item = line("a", "10.00", 2);
        item.applied_rules.push(discount(1, "10"));
        s.items.push(item);

        recalculate(&mut s, RoundingMode::HalfUp);

        assert_eq!(s.subtotal, d("20.00"));
        assert_eq!(s.rule_discount(), d("2.00"));
        assert_eq!(s.total, d("18.00"));
        assert_eq!(s.items[0].line_total, d("18.00"));
        assert_eq!(s.manual_item_discount(), Decimal::ZERO);
    }

    #[test]
    fn test_removed_and_comped_lines_excluded() {
        let mut s = OrderSnapshot::new("o", 0);
        s.items.push(line("a", "5", 1));
        let mut removed = line("b", "7", 1);
        removed.is_removed = true;
        let mut comped = line("c", "9", 1);
        comped.is_comped = true;
        s.items.push(removed);
        s.items.push(comped);

        recalculate(&mut s, RoundingMode::HalfUp);
        assert_eq!(s.subtotal, d("5"));
        assert_eq!(s.total, d("5.00"));
        assert_eq!(s.items[2].line_total, Decimal::ZERO);
    }

    #[test]
    fn test_skipped_rule_not_counted() {
        let mut s = OrderSnapshot::new("o", 0);
        let mut item = line("a", "10", 1);
        let mut adj = discount(1, "10");
        adj.skipped = true;
        item.applied_rules.push(adj);
        s.items.push(item);

        recalculate(&mut s, RoundingMode::HalfUp);
        assert_eq!(s.total_discount, Decimal::ZERO);
        assert_eq!(s.total, d("10.00"));
        // amount is still tracked for display
        assert_eq!(s.items[0].applied_rules[0].calculated_amount, d("-1"));
    }

    #[test]
    fn test_manual_discount_options_and_tax() {
        let mut s = OrderSnapshot::new("o", 0);
        let mut item = line("a", "8", 2);
        item.selected_options.push(shared::order::ItemOption {
            attribute_id: "size".into(),
            attribute_name: "Size".into(),
            option_name: "Large".into(),
            receipt_name: None,
            price_modifier: Some(d("2")),
        });
        item.manual_discount_percent = Some(d("50"));
        item.tax_rate = Some(d("10"));
        s.items.push(item);

        recalculate(&mut s, RoundingMode::HalfUp);
        assert_eq!(s.subtotal, d("20"));
        assert_eq!(s.item_manual_discount, d("10"));
        assert_eq!(s.tax, d("1"));
        assert_eq!(s.total, d("11.00"));
        assert_eq!(s.manual_item_discount(), d("10"));
    }

    #[test]
    fn test_only_total_is_rounded() {
        let mut s = OrderSnapshot::new("o", 0);
        let mut item = line("a", "3.333", 3);
        item.tax_rate = Some(d("21"));
        s.items.push(item);

        recalculate(&mut s, RoundingMode::HalfUp);
        assert_eq!(s.subtotal, d("9.999"));
        assert_eq!(s.tax, d("2.09979"));
        assert_eq!(s.total, d("12.10"));
    }

    #[test]
    fn test_order_manual_adjustments_and_payments() {
        let mut s = OrderSnapshot::new("o", 0);
        s.items.push(line("a", "50", 2));
        s.order_manual_discount = Some(OrderAdjustment {
            adjustment_type: AdjustmentType::Percentage,
            value: d("10"),
            reason: None,
        });
        s.order_manual_surcharge = Some(OrderAdjustment {
            adjustment_type: AdjustmentType::FixedAmount,
            value: d("5"),
            reason: None,
        });
        s.payments.push(Payment {
            payment_id: "p1".into(),
            method: "CASH".into(),
            amount: d("60"),
            tendered: None,
            change: None,
            note: None,
            timestamp: 0,
            cancelled: false,
            cancel_reason: None,
        });

        recalculate(&mut s, RoundingMode::HalfUp);
        assert_eq!(s.order_manual_discount_amount, d("10"));
        assert_eq!(s.total_surcharge, d("5"));
        assert_eq!(s.total, d("95.00"));
        assert_eq!(s.paid_amount, d("60"));
        assert_eq!(s.remaining_amount, d("35.00"));

        s.payments[0].amount = d("200");
        recalculate(&mut s, RoundingMode::HalfUp);
        assert_eq!(s.remaining_amount, Decimal::ZERO);
    }

    #[test]
    fn test_oversized_line_discount_stays_on_its_line() {
        let mut s = OrderSnapshot::new("o", 0);
        let mut a = line("a", "10.00", 1);
        let mut fixed = discount(1, "15");
        fixed.adjustment_type = AdjustmentType::FixedAmount;
        a.applied_rules.push(fixed);
        s.items.push(a);
        s.items.push(line("b", "10.00", 1));

        recalculate(&mut s, RoundingMode::HalfUp);
        let lines = money::sum(s.items.iter().map(|i| i.line_total));
        assert_eq!(s.items[0].line_total, Decimal::ZERO);
        assert_eq!(s.items[1].line_total, d("10.00"));
        assert_eq!(s.item_rule_discount, d("10.00"));
        assert_eq!(s.total, lines);
        assert_eq!(s.total, d("10.00"));
    }

    #[test]
    fn test_order_rule_follows_item_total() {
        let mut s = OrderSnapshot::new("o", 0);
        s.items.push(line("a", "40", 1));
        let mut order_rule = discount(9, "25");
        order_rule.calculated_amount = d("-999");
        s.order_rule_adjustments.push(order_rule);

        recalculate(&mut s, RoundingMode::HalfUp);
        assert_eq!(s.order_rule_adjustments[0].calculated_amount, d("-10"));
        assert_eq!(s.order_rule_discount, d("10"));
        assert_eq!(s.total, d("30.00"));
    }
}
