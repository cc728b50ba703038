//! Receipt document handed to the printer driver

use super::price_rule::{AdjustmentType, RuleType};
use super::store_info::StoreInfo;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Options for building a receipt
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ReceiptOptions {
    /// Print time (Unix millis)
    pub printed_at: i64,
    /// Store-local offset used for formatted timestamps
    #[serde(default)]
    pub utc_offset_minutes: i32,
    #[serde(default)]
    pub reprint: bool,
    /// Bill printed before payment
    #[serde(default)]
    pub pre_payment: bool,
}

/// Option line under a receipt item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectedOption {
    pub attribute_name: String,
    pub option_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_name: Option<String>,
    pub price_modifier: Decimal,
}

/// One printed line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: i32,
    /// Unit price including options
    pub price: Decimal,
    /// Line total after item adjustments (zero when comped)
    pub total: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<Decimal>,
    #[serde(default)]
    pub is_comped: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_options: Vec<SelectedOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Manual order-level discount or surcharge line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurchargeInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_: AdjustmentType,
    pub value: Decimal,
    pub amount: Decimal,
}

/// Per-rule aggregate across items and order level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiptAdjustment {
    pub rule_id: i64,
    pub name: String,
    pub rule_type: RuleType,
    /// Signed: negative for discounts
    pub amount: Decimal,
}

/// Money summary block
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReceiptTotals {
    pub subtotal: Decimal,
    pub total_discount: Decimal,
    pub total_surcharge: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub paid: Decimal,
    pub remaining: Decimal,
}

/// Payment line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiptPayment {
    pub method: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tendered: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,
}

/// Receipt data
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReceiptData {
    pub store_info: StoreInfo,
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_name: Option<String>,
    pub guest_count: i32,
    pub opened_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<String>,
    pub printed_at: String,
    pub reprint: bool,
    pub pre_payment: bool,
    pub items: Vec<ReceiptItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<SurchargeInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<SurchargeInfo>,
    pub rule_adjustments: Vec<ReceiptAdjustment>,
    pub totals: ReceiptTotals,
    pub payments: Vec<ReceiptPayment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub void_reason: Option<String>,
}
