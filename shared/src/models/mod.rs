//! Configuration and document models consumed by the order core

pub mod price_rule;
pub mod receipt;
pub mod store_info;

pub use price_rule::{
    AdjustmentType, PriceRule, ProductScope, RuleLevel, RuleSet, RuleType, TimeMode,
    ZONE_SCOPE_ALL, ZONE_SCOPE_RETAIL,
};
pub use receipt::{
    ReceiptAdjustment, ReceiptData, ReceiptItem, ReceiptOptions, ReceiptPayment, ReceiptTotals,
    SelectedOption, SurchargeInfo,
};
pub use store_info::StoreInfo;
