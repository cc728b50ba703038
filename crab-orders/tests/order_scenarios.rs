//! End-to-end reducer scenarios through the snapshot store
//!
//! Events are built the way the server emits them: one global sequence,
//! hash-chained per order.

use crab_orders::orders::integrity::IntegrityError;
use crab_orders::{OrderStore, build_receipt};
use rust_decimal::Decimal;
use shared::models::price_rule::{AdjustmentType, PriceRule, RuleSet, RuleType};
use shared::models::receipt::ReceiptOptions;
use shared::models::store_info::StoreInfo;
use shared::order::hash::seal;
use shared::order::{
    EventPayload, GENESIS_HASH, LineItemInput, OrderEvent, OrderStatus, TablePlacement,
    TransferItem, VoidType,
};
use std::collections::HashMap;
use std::str::FromStr;

fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Server-side event log stand-in
#[derive(Default)]
struct Log {
    sequence: u64,
    heads: HashMap<String, String>,
}

impl Log {
    fn emit(&mut self, order_id: &str, payload: EventPayload) -> OrderEvent {
        self.sequence += 1;
        let prev = self
            .heads
            .get(order_id)
            .cloned()
            .unwrap_or_else(|| GENESIS_HASH.to_string());
        let mut event = OrderEvent::new(
            self.sequence,
            order_id,
            1_704_067_200_000 + self.sequence as i64 * 1_000,
            payload,
        )
        .with_operator("emp-1", "Ana");
        seal(&mut event, &prev).unwrap();
        self.heads
            .insert(order_id.to_string(), event.curr_hash.clone());
        event
    }
}

fn placement(table: &str) -> TablePlacement {
    TablePlacement {
        table_id: Some(table.to_string()),
        table_name: Some(table.to_uppercase()),
        zone_id: Some("hall".into()),
        zone_name: Some("Hall".into()),
        guest_count: 2,
        is_retail: false,
    }
}

fn item(id: &str, price: &str, qty: i32) -> LineItemInput {
    LineItemInput {
        instance_id: id.into(),
        spec_id: format!("spec-{id}"),
        product_id: 1,
        name: format!("Dish {id}"),
        unit_price: d(price),
        quantity: qty,
        ..Default::default()
    }
}

fn ten_percent_off() -> RuleSet {
    RuleSet::new(
        "2024-01",
        vec![PriceRule::new(
            1,
            "10% off",
            RuleType::Discount,
            AdjustmentType::Percentage,
            d("10"),
        )],
    )
}

#[test]
fn test_percentage_discount_scenario() {
    let mut log = Log::default();
    let mut store = OrderStore::new(ten_percent_off());
    let events = vec![
        log.emit(
            "o-1",
            EventPayload::TableOpened {
                placement: placement("t1"),
                receipt_number: None,
            },
        ),
        log.emit(
            "o-1",
            EventPayload::ItemsAdded {
                items: vec![item("a", "10.00", 2)],
            },
        ),
    ];
    store.apply_batch(&events).unwrap();

    let snap = store.get("o-1").unwrap();
    assert_eq!(snap.subtotal, d("20.00"));
    assert_eq!(snap.rule_discount(), d("2.00"));
    assert_eq!(snap.total, d("18.00"));
    assert_eq!(snap.rule_set_version.as_deref(), Some("2024-01"));
}

#[test]
fn test_split_conserves_total_quantity() {
    let mut log = Log::default();
    let mut store = OrderStore::new(RuleSet::default());
    store
        .apply_batch(&[
            log.emit(
                "src",
                EventPayload::TableOpened {
                    placement: placement("t1"),
                    receipt_number: None,
                },
            ),
            log.emit(
                "src",
                EventPayload::ItemsAdded {
                    items: vec![item("a", "4.00", 6), item("b", "2.50", 4)],
                },
            ),
        ])
        .unwrap();
    assert_eq!(store.get("src").unwrap().total_quantity(), 10);

    let moved: Vec<_> = store
        .get("src")
        .unwrap()
        .items
        .iter()
        .map(|line| {
            let mut line = line.clone();
            line.quantity = if line.instance_id == "a" { 2 } else { 4 };
            line
        })
        .collect();
    store
        .apply_batch(&[
            log.emit(
                "src",
                EventPayload::OrderSplit {
                    target_order_id: "dst".into(),
                    items: vec![
                        TransferItem {
                            instance_id: "a".into(),
                            quantity: 2,
                        },
                        TransferItem {
                            instance_id: "b".into(),
                            quantity: 4,
                        },
                    ],
                },
            ),
            log.emit(
                "dst",
                EventPayload::OrderSplitIn {
                    source_order_id: "src".into(),
                    placement: placement("t2"),
                    items: moved,
                },
            ),
        ])
        .unwrap();

    let src = store.get("src").unwrap();
    let dst = store.get("dst").unwrap();
    assert_eq!(src.total_quantity() + dst.total_quantity(), 10);
    assert_eq!(src.items.len(), 1);
    assert_eq!(dst.total_quantity(), 6);
    assert_eq!(src.total + dst.total, d("34.00"));
    assert_eq!(dst.related_order_id.as_deref(), Some("src"));
}

#[test]
fn test_move_and_merge_transfer_all_lines() {
    let mut log = Log::default();
    let mut store = OrderStore::new(RuleSet::default());
    let open = |log: &mut Log, id: &str, table: &str| {
        log.emit(
            id,
            EventPayload::TableOpened {
                placement: placement(table),
                receipt_number: None,
            },
        )
    };
    let batch = vec![
        open(&mut log, "a", "t1"),
        log.emit(
            "a",
            EventPayload::ItemsAdded {
                items: vec![item("x", "3.00", 3)],
            },
        ),
        open(&mut log, "b", "t2"),
        log.emit(
            "b",
            EventPayload::ItemsAdded {
                items: vec![item("x", "3.00", 1)],
            },
        ),
    ];
    store.apply_batch(&batch).unwrap();

    let lines = store.get("a").unwrap().items.clone();
    store
        .apply_batch(&[
            log.emit(
                "b",
                EventPayload::OrderMerged {
                    source_order_id: "a".into(),
                    items: lines,
                },
            ),
            log.emit(
                "a",
                EventPayload::OrderMergedOut {
                    target_order_id: "b".into(),
                },
            ),
        ])
        .unwrap();

    let a = store.get("a").unwrap();
    let b = store.get("b").unwrap();
    assert_eq!(a.status, OrderStatus::Merged);
    assert_eq!(a.total_quantity(), 0);
    assert_eq!(b.total_quantity(), 4);
    assert_eq!(b.items.len(), 1);
    assert_eq!(b.total, d("12.00"));

    let lines = b.items.clone();
    store
        .apply_batch(&[
            log.emit(
                "c",
                EventPayload::OrderMoved {
                    source_order_id: "b".into(),
                    placement: placement("t9"),
                    items: lines,
                },
            ),
            log.emit(
                "b",
                EventPayload::OrderMovedOut {
                    target_order_id: "c".into(),
                    reason: None,
                },
            ),
        ])
        .unwrap();
    assert_eq!(store.get("b").unwrap().status, OrderStatus::Moved);
    assert_eq!(store.get("c").unwrap().table_id.as_deref(), Some("t9"));
    assert_eq!(store.get("c").unwrap().total_quantity(), 4);
    assert_eq!(store.active_orders().len(), 1);
}

#[test]
fn test_tampered_payload_is_rejected() {
    let mut log = Log::default();
    let mut store = OrderStore::new(RuleSet::default());
    let open = log.emit(
        "o-1",
        EventPayload::TableOpened {
            placement: placement("t1"),
            receipt_number: None,
        },
    );
    store.apply_event(&open).unwrap();

    let mut add = log.emit(
        "o-1",
        EventPayload::ItemsAdded {
            items: vec![item("a", "10.00", 1)],
        },
    );
    add.payload = EventPayload::ItemsAdded {
        items: vec![item("a", "0.01", 1)],
    };

    let err = store.apply_event(&add).unwrap_err();
    assert!(matches!(err, IntegrityError::HashMismatch { sequence: 2, .. }));
    assert!(store.get("o-1").unwrap().items.is_empty());
}

#[test]
fn test_skip_toggle_and_void_flow_into_receipt() {
    let mut log = Log::default();
    let mut store = OrderStore::new(ten_percent_off());
    let events = vec![
        log.emit(
            "o-1",
            EventPayload::TableOpened {
                placement: placement("t1"),
                receipt_number: Some("R-0001".into()),
            },
        ),
        log.emit(
            "o-1",
            EventPayload::ItemsAdded {
                items: vec![item("a", "10.00", 2)],
            },
        ),
        log.emit(
            "o-1",
            EventPayload::RuleSkipToggled {
                rule_id: 1,
                skipped: true,
                instance_id: None,
            },
        ),
    ];
    store.apply_batch(&events).unwrap();
    assert_eq!(store.get("o-1").unwrap().total, d("20.00"));

    store
        .apply_event(&log.emit(
            "o-1",
            EventPayload::OrderVoided {
                void_type: VoidType::LossSettled,
                loss_reason: None,
                loss_amount: None,
                note: Some("left without paying".into()),
            },
        ))
        .unwrap();

    let snap = store.get("o-1").unwrap();
    assert_eq!(snap.status, OrderStatus::Void);
    let info = snap.void_info.as_ref().unwrap();
    assert_eq!(info.loss_amount, Some(d("20.00")));

    let receipt = build_receipt(snap, &StoreInfo::default(), &ReceiptOptions::default());
    assert_eq!(receipt.void_reason.as_deref(), Some("left without paying"));
    assert!(receipt.rule_adjustments.is_empty());
    assert_eq!(receipt.receipt_number.as_deref(), Some("R-0001"));
}
