//! Order events - immutable facts recorded after command processing

use super::line_item::OrderLineItem;
use super::types::{
    ItemChanges, LineItemInput, LossReason, OrderAdjustment, Payment, TransferItem, VoidType,
};
use crate::models::price_rule::RuleType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderEvent {
    /// Event unique ID
    #[serde(default)]
    pub event_id: String,
    /// Global sequence number (for ordering and replay)
    /// This is the AUTHORITATIVE ordering mechanism for state evolution
    pub sequence: u64,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds) - AUTHORITATIVE for state evolution
    pub timestamp: i64,
    /// Client timestamp (Unix milliseconds) - for audit and debugging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_timestamp: Option<i64>,
    /// Operator who triggered this event
    #[serde(default)]
    pub operator_id: String,
    /// Operator name (snapshot for audit)
    #[serde(default)]
    pub operator_name: String,
    /// Command that triggered this event (for audit tracing)
    #[serde(default)]
    pub command_id: String,
    /// Event type
    pub event_type: OrderEventType,
    /// Event payload
    pub payload: EventPayload,
    /// Hash of the previous event of the same order (genesis: 64 zeroes)
    pub prev_hash: String,
    /// SHA-256 over prev_hash, canonical payload and sequence
    pub curr_hash: String,
}

impl OrderEvent {
    /// Build an event with a fresh id, deriving `event_type` from the payload.
    /// Hash fields are left empty; see [`super::hash::seal`].
    pub fn new(
        sequence: u64,
        order_id: impl Into<String>,
        timestamp: i64,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            order_id: order_id.into(),
            timestamp,
            client_timestamp: None,
            operator_id: String::new(),
            operator_name: String::new(),
            command_id: String::new(),
            event_type: payload.event_type(),
            payload,
            prev_hash: String::new(),
            curr_hash: String::new(),
        }
    }

    pub fn with_operator(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.operator_id = id.into();
        self.operator_name = name.into();
        self
    }
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    // Lifecycle
    TableOpened,
    OrderCompleted,
    OrderVoided,
    OrderRestored,

    // Items
    ItemsAdded,
    ItemModified,
    ItemRemoved,
    ItemRestored,
    ItemComped,
    ItemUncomped,

    // Payments
    PaymentAdded,
    PaymentCancelled,

    // Split
    OrderSplit,
    OrderSplitIn,

    // Table operations
    OrderMoved,
    OrderMovedOut,
    OrderMerged,
    OrderMergedOut,
    TableReassigned,

    // Other
    OrderInfoUpdated,
    OrderNoteAdded,
    OrderAdjustmentApplied,

    // Price Rules
    RuleSkipToggled,

    /// Added by a newer server
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderEventType::TableOpened => "TABLE_OPENED",
            OrderEventType::OrderCompleted => "ORDER_COMPLETED",
            OrderEventType::OrderVoided => "ORDER_VOIDED",
            OrderEventType::OrderRestored => "ORDER_RESTORED",
            OrderEventType::ItemsAdded => "ITEMS_ADDED",
            OrderEventType::ItemModified => "ITEM_MODIFIED",
            OrderEventType::ItemRemoved => "ITEM_REMOVED",
            OrderEventType::ItemRestored => "ITEM_RESTORED",
            OrderEventType::ItemComped => "ITEM_COMPED",
            OrderEventType::ItemUncomped => "ITEM_UNCOMPED",
            OrderEventType::PaymentAdded => "PAYMENT_ADDED",
            OrderEventType::PaymentCancelled => "PAYMENT_CANCELLED",
            OrderEventType::OrderSplit => "ORDER_SPLIT",
            OrderEventType::OrderSplitIn => "ORDER_SPLIT_IN",
            OrderEventType::OrderMoved => "ORDER_MOVED",
            OrderEventType::OrderMovedOut => "ORDER_MOVED_OUT",
            OrderEventType::OrderMerged => "ORDER_MERGED",
            OrderEventType::OrderMergedOut => "ORDER_MERGED_OUT",
            OrderEventType::TableReassigned => "TABLE_REASSIGNED",
            OrderEventType::OrderInfoUpdated => "ORDER_INFO_UPDATED",
            OrderEventType::OrderNoteAdded => "ORDER_NOTE_ADDED",
            OrderEventType::OrderAdjustmentApplied => "ORDER_ADJUSTMENT_APPLIED",
            OrderEventType::RuleSkipToggled => "RULE_SKIP_TOGGLED",
            OrderEventType::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Table/zone placement carried by order-creating events
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TablePlacement {
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
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Lifecycle ==========
    TableOpened {
        placement: TablePlacement,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receipt_number: Option<String>,
    },

    OrderCompleted {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receipt_number: Option<String>,
    },

    OrderVoided {
        void_type: VoidType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        loss_reason: Option<LossReason>,
        /// Defaults to the remaining amount when LOSS_SETTLED
        #[serde(default, skip_serializing_if = "Option::is_none")]
        loss_amount: Option<Decimal>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    OrderRestored {},

    // ========== Items ==========
    ItemsAdded {
        items: Vec<LineItemInput>,
    },

    ItemModified {
        instance_id: String,
        changes: ItemChanges,
    },

    ItemRemoved {
        instance_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    ItemRestored {
        instance_id: String,
    },

    ItemComped {
        instance_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    ItemUncomped {
        instance_id: String,
    },

    // ========== Payments ==========
    PaymentAdded {
        payment: Payment,
    },

    PaymentCancelled {
        payment_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    // ========== Split ==========
    /// Source side: quantities leave this order
    OrderSplit {
        target_order_id: String,
        items: Vec<TransferItem>,
    },

    /// Target side: a new order created from split lines
    OrderSplitIn {
        source_order_id: String,
        placement: TablePlacement,
        items: Vec<OrderLineItem>,
    },

    // ========== Table operations ==========
    /// Target side: a new order at another table receives all lines
    OrderMoved {
        source_order_id: String,
        placement: TablePlacement,
        items: Vec<OrderLineItem>,
    },

    /// Source side: the order was moved away
    OrderMovedOut {
        target_order_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Target side: lines merged into an existing order
    OrderMerged {
        source_order_id: String,
        items: Vec<OrderLineItem>,
    },

    /// Source side: the order was merged away
    OrderMergedOut {
        target_order_id: String,
    },

    /// Same order, different table (and possibly zone)
    TableReassigned {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        table_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zone_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        zone_name: Option<String>,
    },

    // ========== Other ==========
    OrderInfoUpdated {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        guest_count: Option<i32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        receipt_number: Option<String>,
    },

    OrderNoteAdded {
        note: String,
    },

    /// Manual order-level discount or surcharge; `None` clears it
    OrderAdjustmentApplied {
        rule_type: RuleType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        adjustment: Option<OrderAdjustment>,
    },

    // ========== Price Rules ==========
    /// Without `instance_id` the toggle applies order-wide
    RuleSkipToggled {
        rule_id: i64,
        skipped: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        instance_id: Option<String>,
    },

    /// Payload type not known to this build
    #[serde(other)]
    Unknown,
}

impl EventPayload {
    pub fn event_type(&self) -> OrderEventType {
        match self {
            EventPayload::TableOpened { .. } => OrderEventType::TableOpened,
            EventPayload::OrderCompleted { .. } => OrderEventType::OrderCompleted,
            EventPayload::OrderVoided { .. } => OrderEventType::OrderVoided,
            EventPayload::OrderRestored {} => OrderEventType::OrderRestored,
            EventPayload::ItemsAdded { .. } => OrderEventType::ItemsAdded,
            EventPayload::ItemModified { .. } => OrderEventType::ItemModified,
            EventPayload::ItemRemoved { .. } => OrderEventType::ItemRemoved,
            EventPayload::ItemRestored { .. } => OrderEventType::ItemRestored,
            EventPayload::ItemComped { .. } => OrderEventType::ItemComped,
            EventPayload::ItemUncomped { .. } => OrderEventType::ItemUncomped,
            EventPayload::PaymentAdded { .. } => OrderEventType::PaymentAdded,
            EventPayload::PaymentCancelled { .. } => OrderEventType::PaymentCancelled,
            EventPayload::OrderSplit { .. } => OrderEventType::OrderSplit,
            EventPayload::OrderSplitIn { .. } => OrderEventType::OrderSplitIn,
            EventPayload::OrderMoved { .. } => OrderEventType::OrderMoved,
            EventPayload::OrderMovedOut { .. } => OrderEventType::OrderMovedOut,
            EventPayload::OrderMerged { .. } => OrderEventType::OrderMerged,
            EventPayload::OrderMergedOut { .. } => OrderEventType::OrderMergedOut,
            EventPayload::TableReassigned { .. } => OrderEventType::TableReassigned,
            EventPayload::OrderInfoUpdated { .. } => OrderEventType::OrderInfoUpdated,
            EventPayload::OrderNoteAdded { .. } => OrderEventType::OrderNoteAdded,
            EventPayload::OrderAdjustmentApplied { .. } => OrderEventType::OrderAdjustmentApplied,
            EventPayload::RuleSkipToggled { .. } => OrderEventType::RuleSkipToggled,
            EventPayload::Unknown => OrderEventType::Unknown,
        }
    }

    /// Events that bring a new order aggregate into existence
    pub fn is_genesis(&self) -> bool {
        matches!(
            self,
            EventPayload::TableOpened { .. }
                | EventPayload::OrderSplitIn { .. }
                | EventPayload::OrderMoved { .. }
        )
    }

    /// Events still accepted once an order reached a terminal status
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            EventPayload::OrderNoteAdded { .. } | EventPayload::OrderInfoUpdated { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_tag_and_event_type_agree() {
        let payload = EventPayload::RuleSkipToggled {
            rule_id: 4,
            skipped: true,
            instance_id: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "RULE_SKIP_TOGGLED");
        assert_eq!(payload.event_type().to_string(), "RULE_SKIP_TOGGLED");
    }

    #[test]
    fn test_unknown_payload_and_type_deserialize() {
        let json = r#"{
            "sequence": 9,
            "order_id": "o-1",
            "timestamp": 1704067200000,
            "event_type": "ORDER_TIPPED",
            "payload": {"type": "ORDER_TIPPED", "amount": "1.00"},
            "prev_hash": "a",
            "curr_hash": "b"
        }"#;
        let event: OrderEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, OrderEventType::Unknown);
        assert_eq!(event.payload, EventPayload::Unknown);
    }

    #[test]
    fn test_placement_roundtrip() {
        let payload = EventPayload::TableOpened {
            placement: TablePlacement {
                table_id: Some("t-1".into()),
                table_name: Some("T1".into()),
                zone_id: Some("z-1".into()),
                zone_name: None,
                guest_count: 2,
                is_retail: false,
            },
            receipt_number: Some("R-0001".into()),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["placement"]["table_id"], "t-1");
        assert_eq!(json["placement"]["guest_count"], 2);
        let back: EventPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
    }

    #[test]
    fn test_genesis_and_informational_sets() {
        assert!(
            EventPayload::TableOpened {
                placement: TablePlacement::default(),
                receipt_number: None
            }
            .is_genesis()
        );
        assert!(!EventPayload::OrderRestored {}.is_genesis());
        assert!(
            EventPayload::OrderNoteAdded {
                note: "x".into()
            }
            .is_informational()
        );
        assert!(!EventPayload::OrderRestored {}.is_informational());
    }
}
