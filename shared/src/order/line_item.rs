//! Order line item as materialized on a snapshot

use super::applied_rule::RuleAdjustment;
use super::types::{ItemChanges, ItemOption, LineItemInput};
use crate::models::price_rule::RuleType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Line item inside an [`OrderSnapshot`](super::OrderSnapshot)
///
/// `line_total` is derived by the reducer; any value received over the wire
/// is overwritten on the next recomputation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderLineItem {
    pub instance_id: String,
    pub spec_id: String,
    pub product_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<i64>,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_options: Vec<ItemOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_discount_percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub applied_rules: Vec<RuleAdjustment>,
    #[serde(default)]
    pub is_comped: bool,
    #[serde(default)]
    pub is_removed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Values before the most recent ITEM_MODIFIED
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_values: Option<ItemChanges>,
    #[serde(default)]
    pub line_total: Decimal,
}

impl OrderLineItem {
    pub fn from_input(input: LineItemInput) -> Self {
        Self {
            instance_id: input.instance_id,
            spec_id: input.spec_id,
            product_id: input.product_id,
            category_id: input.category_id,
            tag_ids: input.tag_ids,
            name: input.name,
            unit_price: input.unit_price,
            quantity: input.quantity,
            selected_options: input.selected_options,
            manual_discount_percent: input.manual_discount_percent,
            surcharge: input.surcharge,
            tax_rate: input.tax_rate,
            applied_rules: Vec::new(),
            is_comped: false,
            is_removed: false,
            note: input.note,
            previous_values: None,
            line_total: Decimal::ZERO,
        }
    }

    /// Counts toward subtotal and tax
    pub fn is_billable(&self) -> bool {
        !self.is_removed && !self.is_comped
    }

    /// Sum of option price modifiers (per unit)
    pub fn options_total(&self) -> Decimal {
        self.selected_options
            .iter()
            .filter_map(|o| o.price_modifier)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Per-unit rule amount of one type, skipped rules excluded (signed)
    pub fn rule_amount(&self, rule_type: RuleType) -> Decimal {
        self.applied_rules
            .iter()
            .filter(|r| r.rule_type == rule_type)
            .map(RuleAdjustment::effective_amount)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}
