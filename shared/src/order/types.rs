//! Order value types shared by events, commands and snapshots

use crate::models::price_rule::AdjustmentType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Void
// ============================================================================

/// Void type - distinguishes cancelled orders from settled losses
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VoidType {
    /// Order cancelled before any service, no loss recorded
    #[default]
    Cancelled,
    /// Customer left without paying; the outstanding amount is booked as a loss
    LossSettled,
}

/// Loss reason (only meaningful for LOSS_SETTLED)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LossReason {
    CustomerFled,
    CustomerInsolvent,
    Other,
}

impl std::fmt::Display for LossReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LossReason::CustomerFled => write!(f, "CUSTOMER_FLED"),
            LossReason::CustomerInsolvent => write!(f, "CUSTOMER_INSOLVENT"),
            LossReason::Other => write!(f, "OTHER"),
        }
    }
}

impl std::fmt::Display for VoidType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoidType::Cancelled => write!(f, "CANCELLED"),
            VoidType::LossSettled => write!(f, "LOSS_SETTLED"),
        }
    }
}

/// Void details captured on the snapshot for tax reporting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VoidInfo {
    pub void_type: VoidType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_reason: Option<LossReason>,
    /// Booked loss; always None for CANCELLED
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub voided_at: i64,
}

// ============================================================================
// Items
// ============================================================================

/// Selected option on a line item (e.g. "Size: Large")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemOption {
    pub attribute_id: String,
    pub attribute_name: String,
    pub option_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_name: Option<String>,
    /// Per-unit price delta
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_modifier: Option<Decimal>,
}

/// Line item as carried by ITEMS_ADDED
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LineItemInput {
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
    /// Manual discount (0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_discount_percent: Option<Decimal>,
    /// Per-unit manual surcharge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<Decimal>,
    /// Tax rate in percent (exclusive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Field changes carried by ITEM_MODIFIED; also reused to record previous values
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ItemChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_discount_percent: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surcharge: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.price.is_none()
            && self.quantity.is_none()
            && self.manual_discount_percent.is_none()
            && self.surcharge.is_none()
            && self.note.is_none()
    }
}

/// Quantity of one line moved by ORDER_SPLIT
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferItem {
    pub instance_id: String,
    pub quantity: i32,
}

// ============================================================================
// Payments
// ============================================================================

/// Payment record
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub payment_id: String,
    pub method: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tendered: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub timestamp: i64,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
}

// ============================================================================
// Order-level manual adjustment
// ============================================================================

/// Manual order-level discount or surcharge entered by an operator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderAdjustment {
    pub adjustment_type: AdjustmentType,
    /// Percentage (10 = 10%) or fixed amount
    pub value: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

// ============================================================================
// Command response
// ============================================================================

/// Command response returned by the server after processing a command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub command_id: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, order_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            error: Some(error),
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, thiserror::Error)]
#[error("{code:?}: {message}")]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

/// Command error codes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    OrderNotFound,
    OrderAlreadyCompleted,
    OrderAlreadyVoided,
    ItemNotFound,
    PaymentNotFound,
    InsufficientQuantity,
    InvalidAmount,
    InvalidOperation,
    DuplicateCommand,
    TableOccupied,
    InternalError,
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_is_std_error() {
        let err = CommandError {
            code: CommandErrorCode::ItemNotFound,
            message: "line x".into(),
        };
        assert_eq!(err.to_string(), "ItemNotFound: line x");

        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_unknown_error_code_deserializes() {
        let err: CommandError =
            serde_json::from_str(r#"{"code":"SOMETHING_NEW","message":"m"}"#).unwrap();
        assert_eq!(err.code, CommandErrorCode::Unknown);
    }
}
