//! Rule evaluation and stacking
//!
//! Stacking is resolved per rule type (discounts and surcharges are separate
//! tiers):
//! 1. an exclusive match wins alone (best exclusive only)
//! 2. otherwise the best non-stackable rule applies together with every
//!    stackable rule
//!
//! "Best" is the lowest priority value, ties broken by the lower rule id.

use super::MatchContext;
use super::matcher::matches;
use crate::money;
use rust_decimal::Decimal;
use shared::models::price_rule::{AdjustmentType, PriceRule, RuleType};
use shared::order::RuleAdjustment;

/// Evaluate `rules` against `ctx`, returning adjustments ordered by (priority, id)
pub fn evaluate(rules: &[PriceRule], ctx: &MatchContext) -> Vec<RuleAdjustment> {
    let matched: Vec<&PriceRule> = rules
        .iter()
        .filter(|rule| {
            let outcome = matches(rule, ctx);
            tracing::trace!(rule_id = rule.id, ?outcome, "rule match");
            outcome.is_match()
        })
        .collect();

    let mut selected = Vec::new();
    for rule_type in [RuleType::Discount, RuleType::Surcharge] {
        let tier: Vec<&PriceRule> = matched
            .iter()
            .copied()
            .filter(|r| r.rule_type == rule_type)
            .collect();
        selected.extend(select(tier));
    }
    selected.sort_by_key(|r| r.precedence());

    selected
        .into_iter()
        .map(|rule| RuleAdjustment::from_rule(rule, calculated_amount(rule, ctx.base_price)))
        .collect()
}

/// Apply exclusivity and stacking to matched rules of one type
pub fn select(matched: Vec<&PriceRule>) -> Vec<&PriceRule> {
    if let Some(exclusive) = best(matched.iter().copied().filter(|r| r.is_exclusive)) {
        return vec![exclusive];
    }

    let mut out: Vec<&PriceRule> = matched.iter().copied().filter(|r| r.is_stackable).collect();
    if let Some(winner) = best(matched.iter().copied().filter(|r| !r.is_stackable)) {
        out.push(winner);
    }
    out
}

fn best<'a>(rules: impl Iterator<Item = &'a PriceRule>) -> Option<&'a PriceRule> {
    rules.min_by_key(|r| r.precedence())
}

/// Signed per-unit amount: negative for discounts
pub fn calculated_amount(rule: &PriceRule, base_price: Decimal) -> Decimal {
    signed_amount(
        rule.rule_type,
        rule.adjustment_type,
        rule.adjustment_value,
        base_price,
    )
}

/// `PERCENTAGE` -> base * value / 100, `FIXED_AMOUNT` -> value; negated for discounts
pub fn signed_amount(
    rule_type: RuleType,
    adjustment_type: AdjustmentType,
    value: Decimal,
    base: Decimal,
) -> Decimal {
    let magnitude = match adjustment_type {
        AdjustmentType::Percentage => money::percent_of(base, value),
        AdjustmentType::FixedAmount => value,
    };
    match rule_type {
        RuleType::Discount => money::normalize(-magnitude),
        RuleType::Surcharge => magnitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::ProductRef;
    use shared::models::price_rule::{ProductScope, RuleLevel, TimeMode};

    fn rule(id: i64, rule_type: RuleType, priority: i32, stackable: bool) -> PriceRule {
        PriceRule {
            id,
            name: format!("rule-{id}"),
            receipt_name: None,
            rule_type,
            product_scope: ProductScope::Global,
            target_id: None,
            zone_scope: "all".to_string(),
            adjustment_type: AdjustmentType::Percentage,
            adjustment_value: Decimal::new(10, 0),
            priority,
            is_stackable: stackable,
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
        }
    }

    fn ctx() -> MatchContext {
        MatchContext {
            product: Some(ProductRef {
                product_id: 1,
                category_id: None,
                tag_ids: vec![],
            }),
            zone_id: None,
            is_retail: false,
            quantity: 2,
            base_price: Decimal::new(1000, 2),
            now: 1_704_067_200_000,
            utc_offset_minutes: 0,
            force_time_check: false,
        }
    }

    fn ids(adjustments: &[RuleAdjustment]) -> Vec<i64> {
        adjustments.iter().map(|a| a.rule_id).collect()
    }

    #[test]
    fn test_percentage_discount_amount() {
        let out = evaluate(&[rule(1, RuleType::Discount, 0, false)], &ctx());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].calculated_amount, Decimal::new(-1, 0));
    }

    #[test]
    fn test_fixed_surcharge_amount() {
        let mut r = rule(1, RuleType::Surcharge, 0, false);
        r.adjustment_type = AdjustmentType::FixedAmount;
        r.adjustment_value = Decimal::new(250, 2);
        let out = evaluate(&[r], &ctx());
        assert_eq!(out[0].calculated_amount, Decimal::new(250, 2));
    }

    #[test]
    fn test_non_stackable_lowest_priority_wins() {
        let rules = vec![
            rule(1, RuleType::Discount, 5, false),
            rule(2, RuleType::Discount, 3, false),
        ];
        assert_eq!(ids(&evaluate(&rules, &ctx())), vec![2]);
    }

    #[test]
    fn test_non_stackable_tie_breaks_on_rule_id() {
        let rules = vec![
            rule(9, RuleType::Discount, 3, false),
            rule(4, RuleType::Discount, 3, false),
        ];
        assert_eq!(ids(&evaluate(&rules, &ctx())), vec![4]);
    }

    #[test]
    fn test_stackables_sum_with_winner() {
        let rules = vec![
            rule(1, RuleType::Discount, 5, true),
            rule(2, RuleType::Discount, 1, false),
            rule(3, RuleType::Discount, 2, false),
            rule(4, RuleType::Discount, 0, true),
        ];
        let out = evaluate(&rules, &ctx());
        assert_eq!(ids(&out), vec![4, 2, 1]);
        let total: Decimal = out.iter().map(|a| a.calculated_amount).sum();
        assert_eq!(total, Decimal::new(-3, 0));
    }

    #[test]
    fn test_exclusive_suppresses_same_type_only() {
        let mut exclusive = rule(5, RuleType::Discount, 9, false);
        exclusive.is_exclusive = true;
        let rules = vec![
            rule(1, RuleType::Discount, 0, true),
            exclusive,
            rule(2, RuleType::Surcharge, 0, true),
        ];
        assert_eq!(ids(&evaluate(&rules, &ctx())), vec![2, 5]);
    }

    #[test]
    fn test_disabled_rule_is_ignored() {
        let mut r = rule(1, RuleType::Discount, 0, true);
        r.is_active = false;
        assert!(evaluate(&[r], &ctx()).is_empty());
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let rules: Vec<PriceRule> = (1..=6)
            .map(|i| rule(i, RuleType::Discount, (i % 3) as i32, i % 2 == 0))
            .collect();
        let first = evaluate(&rules, &ctx());
        for _ in 0..10 {
            assert_eq!(evaluate(&rules, &ctx()), first);
        }
        let mut reversed = rules.clone();
        reversed.reverse();
        assert_eq!(evaluate(&reversed, &ctx()), first);
    }
}
