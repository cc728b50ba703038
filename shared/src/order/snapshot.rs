//! Order snapshot - computed state from the event stream

use super::applied_rule::RuleAdjustment;
use super::line_item::OrderLineItem;
use super::types::{OrderAdjustment, Payment, VoidInfo};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Active,
    Completed,
    Void,
    /// Moved to another table (source side)
    Moved,
    /// Merged into another order (source side)
    Merged,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Active)
    }
}

/// Order snapshot - materialized view of one order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderSnapshot {
    pub order_id: String,
    pub status: OrderStatus,

    // === Placement ===
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    #[serde(default)]
    pub guest_count: i32,
    #[serde(default)]
    pub is_retail: bool,

    // === Content ===
    #[serde(default)]
    pub items: Vec<OrderLineItem>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// Order-level rule adjustments (absolute amounts, signed)
    #[serde(default)]
    pub order_rule_adjustments: Vec<RuleAdjustment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_manual_discount: Option<OrderAdjustment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_manual_surcharge: Option<OrderAdjustment>,

    // === Totals (derived) ===
    #[serde(default)]
    pub subtotal: Decimal,
    #[serde(default)]
    pub item_manual_discount: Decimal,
    #[serde(default)]
    pub item_manual_surcharge: Decimal,
    #[serde(default)]
    pub item_rule_discount: Decimal,
    #[serde(default)]
    pub item_rule_surcharge: Decimal,
    #[serde(default)]
    pub order_rule_discount: Decimal,
    #[serde(default)]
    pub order_rule_surcharge: Decimal,
    #[serde(default)]
    pub order_manual_discount_amount: Decimal,
    #[serde(default)]
    pub order_manual_surcharge_amount: Decimal,
    #[serde(default)]
    pub total_discount: Decimal,
    #[serde(default)]
    pub total_surcharge: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub total: Decimal,
    #[serde(default)]
    pub paid_amount: Decimal,
    #[serde(default)]
    pub remaining_amount: Decimal,

    // === Lifecycle ===
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_info: Option<VoidInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Order this one was moved/merged into, or split/moved from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_order_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,

    // === Event tracking ===
    #[serde(default)]
    pub last_sequence: u64,
    /// curr_hash of the last applied event of this order
    #[serde(default)]
    pub last_event_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_set_version: Option<String>,
}

impl OrderSnapshot {
    /// Empty active order
    pub fn new(order_id: impl Into<String>, created_at: i64) -> Self {
        Self {
            order_id: order_id.into(),
            created_at,
            updated_at: created_at,
            ..Default::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    pub fn find_item(&self, instance_id: &str) -> Option<&OrderLineItem> {
        self.items.iter().find(|i| i.instance_id == instance_id)
    }

    pub fn find_item_mut(&mut self, instance_id: &str) -> Option<&mut OrderLineItem> {
        self.items.iter_mut().find(|i| i.instance_id == instance_id)
    }

    /// Rule-driven discount across item and order level (positive magnitude)
    pub fn rule_discount(&self) -> Decimal {
        self.item_rule_discount
            .saturating_add(self.order_rule_discount)
    }

    /// Rule-driven surcharge across item and order level
    pub fn rule_surcharge(&self) -> Decimal {
        self.item_rule_surcharge
            .saturating_add(self.order_rule_surcharge)
    }

    /// Residual: total_discount - order_manual_discount - rule_discount
    pub fn manual_item_discount(&self) -> Decimal {
        self.total_discount
            .saturating_sub(self.order_manual_discount_amount)
            .saturating_sub(self.rule_discount())
    }

    /// Total quantity of non-removed lines
    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .filter(|i| !i.is_removed)
            .map(|i| i64::from(i.quantity))
            .sum()
    }

    /// Active, no table, not retail
    pub fn is_ghost(&self) -> bool {
        self.is_active() && self.table_id.is_none() && !self.is_retail
    }
}
