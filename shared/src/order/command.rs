//! Order commands - requests submitted to the server, which turns them into events

use super::event::TablePlacement;
use super::types::{
    ItemChanges, LineItemInput, LossReason, OrderAdjustment, Payment, TransferItem, VoidType,
};
use crate::models::price_rule::RuleType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderCommand {
    /// Idempotency key
    pub command_id: String,
    pub operator_id: String,
    pub operator_name: String,
    /// Client timestamp (Unix milliseconds)
    pub timestamp: i64,
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    pub fn new(
        operator_id: impl Into<String>,
        operator_name: impl Into<String>,
        payload: OrderCommandPayload,
    ) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            operator_id: operator_id.into(),
            operator_name: operator_name.into(),
            timestamp: crate::util::now_millis(),
            payload,
        }
    }
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    OpenTable {
        placement: TablePlacement,
    },
    AddItems {
        order_id: String,
        items: Vec<LineItemInput>,
    },
    ModifyItem {
        order_id: String,
        instance_id: String,
        changes: ItemChanges,
    },
    RemoveItem {
        order_id: String,
        instance_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    RestoreItem {
        order_id: String,
        instance_id: String,
    },
    CompItem {
        order_id: String,
        instance_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    UncompItem {
        order_id: String,
        instance_id: String,
    },
    AddPayment {
        order_id: String,
        payment: Payment,
    },
    CancelPayment {
        order_id: String,
        payment_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    CompleteOrder {
        order_id: String,
    },
    VoidOrder {
        order_id: String,
        void_type: VoidType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        loss_reason: Option<LossReason>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        loss_amount: Option<Decimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    RestoreOrder {
        order_id: String,
    },
    SplitOrder {
        order_id: String,
        items: Vec<TransferItem>,
        placement: TablePlacement,
    },
    MoveOrder {
        order_id: String,
        placement: TablePlacement,
    },
    MergeOrders {
        source_order_id: String,
        target_order_id: String,
    },
    ToggleRuleSkip {
        order_id: String,
        rule_id: i64,
        skipped: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instance_id: Option<String>,
    },
    ApplyOrderAdjustment {
        order_id: String,
        rule_type: RuleType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        adjustment: Option<OrderAdjustment>,
    },
    AddOrderNote {
        order_id: String,
        note: String,
    },
}

impl OrderCommandPayload {
    /// Target order, if the command addresses an existing one
    pub fn order_id(&self) -> Option<&str> {
        match self {
            OrderCommandPayload::OpenTable { .. } => None,
            OrderCommandPayload::MergeOrders {
                target_order_id, ..
            } => Some(target_order_id.as_str()),
            OrderCommandPayload::AddItems { order_id, .. }
            | OrderCommandPayload::ModifyItem { order_id, .. }
            | OrderCommandPayload::RemoveItem { order_id, .. }
            | OrderCommandPayload::RestoreItem { order_id, .. }
            | OrderCommandPayload::CompItem { order_id, .. }
            | OrderCommandPayload::UncompItem { order_id, .. }
            | OrderCommandPayload::AddPayment { order_id, .. }
            | OrderCommandPayload::CancelPayment { order_id, .. }
            | OrderCommandPayload::CompleteOrder { order_id }
            | OrderCommandPayload::VoidOrder { order_id, .. }
            | OrderCommandPayload::RestoreOrder { order_id }
            | OrderCommandPayload::SplitOrder { order_id, .. }
            | OrderCommandPayload::MoveOrder { order_id, .. }
            | OrderCommandPayload::ToggleRuleSkip { order_id, .. }
            | OrderCommandPayload::ApplyOrderAdjustment { order_id, .. }
            | OrderCommandPayload::AddOrderNote { order_id, .. } => Some(order_id.as_str()),
        }
    }
}
