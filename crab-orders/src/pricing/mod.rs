//! Price rule evaluation
//!
//! Pure functions: given a rule set and a match context, decide which rules
//! apply and what each one contributes. No clock reads; `now` comes from the
//! caller (the reducer passes the event timestamp).

pub mod engine;
pub mod matcher;

pub use engine::{calculated_amount, evaluate, select, signed_amount};
pub use matcher::{MatchOutcome, matches};

use rust_decimal::Decimal;

/// Product half of the match context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRef {
    pub product_id: i64,
    pub category_id: Option<i64>,
    pub tag_ids: Vec<i64>,
}

/// Everything a rule may be matched against
#[derive(Debug, Clone, PartialEq)]
pub struct MatchContext {
    /// `None` for order-level evaluation
    pub product: Option<ProductRef>,
    pub zone_id: Option<String>,
    pub is_retail: bool,
    /// Units on the line (amounts are computed per unit)
    pub quantity: i32,
    /// Price the percentage is taken from
    pub base_price: Decimal,
    /// Unix millis
    pub now: i64,
    /// Store-local offset for day/time windows
    pub utc_offset_minutes: i32,
    /// Apply date bounds even to ALWAYS rules
    pub force_time_check: bool,
}
