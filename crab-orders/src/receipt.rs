//! Receipt aggregation
//!
//! Pure transform from an order snapshot to the flat document consumed by
//! the printer driver. Reads the snapshot, never mutates it.

use crate::money;
use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use shared::models::price_rule::RuleType;
use shared::models::receipt::{
    ReceiptAdjustment, ReceiptData, ReceiptItem, ReceiptOptions, ReceiptPayment, ReceiptTotals,
    SelectedOption, SurchargeInfo,
};
use shared::models::store_info::StoreInfo;
use shared::order::{OrderAdjustment, OrderLineItem, OrderSnapshot, VoidInfo};
use std::collections::BTreeMap;

const TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Build the receipt document for `snapshot`
pub fn build_receipt(
    snapshot: &OrderSnapshot,
    store_info: &StoreInfo,
    options: &ReceiptOptions,
) -> ReceiptData {
    let offset = options.utc_offset_minutes;
    ReceiptData {
        store_info: store_info.clone(),
        order_id: snapshot.order_id.clone(),
        receipt_number: snapshot.receipt_number.clone(),
        table_name: snapshot.table_name.clone(),
        zone_name: snapshot.zone_name.clone(),
        guest_count: snapshot.guest_count,
        opened_at: format_time(snapshot.created_at, offset),
        closed_at: snapshot.end_time.map(|t| format_time(t, offset)),
        printed_at: format_time(options.printed_at, offset),
        reprint: options.reprint,
        pre_payment: options.pre_payment,
        items: snapshot
            .items
            .iter()
            .filter(|i| !i.is_removed)
            .map(receipt_item)
            .collect(),
        surcharge: manual_line(
            "Surcharge",
            snapshot.order_manual_surcharge.as_ref(),
            snapshot.order_manual_surcharge_amount,
        ),
        discount: manual_line(
            "Discount",
            snapshot.order_manual_discount.as_ref(),
            snapshot.order_manual_discount_amount,
        ),
        rule_adjustments: aggregate_rules(snapshot),
        totals: ReceiptTotals {
            subtotal: money::round2(snapshot.subtotal),
            total_discount: money::round2(snapshot.total_discount),
            total_surcharge: money::round2(snapshot.total_surcharge),
            tax: money::round2(snapshot.tax),
            total: money::round2(snapshot.total),
            paid: money::round2(snapshot.paid_amount),
            remaining: money::round2(snapshot.remaining_amount),
        },
        payments: snapshot
            .payments
            .iter()
            .filter(|p| !p.cancelled)
            .map(|p| ReceiptPayment {
                method: p.method.clone(),
                amount: money::round2(p.amount),
                tendered: p.tendered.map(money::round2),
                change: p.change.map(money::round2),
            })
            .collect(),
        void_reason: snapshot.void_info.as_ref().map(void_reason),
    }
}

fn receipt_item(item: &OrderLineItem) -> ReceiptItem {
    ReceiptItem {
        name: item.name.clone(),
        quantity: item.quantity,
        price: money::round2(money::add(item.unit_price, item.options_total())),
        total: if item.is_comped {
            Decimal::ZERO
        } else {
            money::round2(item.line_total)
        },
        tax_rate: item.tax_rate,
        discount_percent: item.manual_discount_percent.filter(|p| !p.is_zero()),
        is_comped: item.is_comped,
        selected_options: item
            .selected_options
            .iter()
            .map(|o| SelectedOption {
                attribute_name: o.attribute_name.clone(),
                option_name: o.option_name.clone(),
                receipt_name: o.receipt_name.clone(),
                price_modifier: o.price_modifier.unwrap_or_default(),
            })
            .collect(),
        note: item.note.clone(),
    }
}

fn manual_line(
    label: &str,
    adjustment: Option<&OrderAdjustment>,
    amount: Decimal,
) -> Option<SurchargeInfo> {
    let adjustment = adjustment?;
    Some(SurchargeInfo {
        name: adjustment
            .reason
            .clone()
            .unwrap_or_else(|| label.to_string()),
        type_: adjustment.adjustment_type,
        value: adjustment.value,
        amount: money::round2(amount),
    })
}

/// Sum each rule's effect across billable lines (per unit x quantity) and the
/// order level, keyed and sorted by rule id; near-zero aggregates are dropped
fn aggregate_rules(snapshot: &OrderSnapshot) -> Vec<ReceiptAdjustment> {
    let mut by_rule: BTreeMap<i64, (String, RuleType, Decimal)> = BTreeMap::new();

    let item_rules = snapshot
        .items
        .iter()
        .filter(|i| i.is_billable())
        .flat_map(|i| {
            let q = money::qty(i.quantity);
            i.applied_rules
                .iter()
                .filter(|r| !r.skipped)
                .map(move |r| (r, money::mul(r.calculated_amount, q)))
        });
    let order_rules = snapshot
        .order_rule_adjustments
        .iter()
        .filter(|r| !r.skipped)
        .map(|r| (r, r.calculated_amount));

    for (rule, amount) in item_rules.chain(order_rules) {
        let entry = by_rule
            .entry(rule.rule_id)
            .or_insert_with(|| (rule.label().to_string(), rule.rule_type, Decimal::ZERO));
        entry.2 = money::add(entry.2, amount);
    }

    by_rule
        .into_iter()
        .filter(|(_, (_, _, amount))| !money::is_near_zero(*amount))
        .map(|(rule_id, (name, rule_type, amount))| ReceiptAdjustment {
            rule_id,
            name,
            rule_type,
            amount: money::round2(amount),
        })
        .collect()
}

fn void_reason(info: &VoidInfo) -> String {
    if let Some(note) = info.note.as_deref().filter(|n| !n.trim().is_empty()) {
        return note.to_string();
    }
    match info.loss_reason {
        Some(reason) => reason.to_string(),
        None => info.void_type.to_string(),
    }
}

fn format_time(millis: i64, utc_offset_minutes: i32) -> String {
    let utc = DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default();
    match FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)) {
        Some(offset) => utc.with_timezone(&offset).format(TIME_FORMAT).to_string(),
        None => utc.format(TIME_FORMAT).to_string(),
    }
}
