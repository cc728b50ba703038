//! Rule Adjustment - tracks which rule produced which amount on an item/order

use crate::models::price_rule::{AdjustmentType, PriceRule, RuleType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Applied rule record
///
/// `calculated_amount` is signed: negative for discounts, positive for
/// surcharges. On items it is per unit; on the order it is absolute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuleAdjustment {
    // === Rule Identity ===
    pub rule_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_name: Option<String>,

    // === Rule Type ===
    pub rule_type: RuleType,
    pub adjustment_type: AdjustmentType,

    // === Calculation Info ===
    /// Original value (10 = 10% or €10)
    pub value: Decimal,
    pub calculated_amount: Decimal,
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub is_stackable: bool,
    #[serde(default)]
    pub is_exclusive: bool,

    // === Control ===
    /// Whether an operator skipped this rule
    #[serde(default)]
    pub skipped: bool,
}

impl RuleAdjustment {
    /// Create from a PriceRule with calculated amount
    pub fn from_rule(rule: &PriceRule, calculated_amount: Decimal) -> Self {
        Self {
            rule_id: rule.id,
            name: rule.name.clone(),
            receipt_name: rule.receipt_name.clone(),
            rule_type: rule.rule_type,
            adjustment_type: rule.adjustment_type,
            value: rule.adjustment_value,
            calculated_amount,
            priority: rule.priority,
            is_stackable: rule.is_stackable,
            is_exclusive: rule.is_exclusive,
            skipped: false,
        }
    }

    /// Amount contributing to totals (zero when skipped)
    pub fn effective_amount(&self) -> Decimal {
        if self.skipped {
            Decimal::ZERO
        } else {
            self.calculated_amount
        }
    }

    pub fn label(&self) -> &str {
        self.receipt_name.as_deref().unwrap_or(&self.name)
    }
}
