//! Money calculation utilities using rust_decimal for precision
//!
//! Every monetary value in the order core goes through this module. Values
//! keep full precision through intermediate steps; only presentation values
//! (order total, receipt amounts) are rounded to 2 places.

use rust_decimal::RoundingStrategy;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Fractional digits for presentation values
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Aggregates with an absolute value below this (0.005) are noise
pub const NEAR_ZERO: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Rounding mode for 2-place rounding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Midpoint away from zero (server default)
    #[default]
    HalfUp,
    /// Banker's rounding
    HalfEven,
    /// Toward zero
    Down,
    /// Away from zero
    Up,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::Down => RoundingStrategy::ToZero,
            RoundingMode::Up => RoundingStrategy::AwayFromZero,
        }
    }
}

impl FromStr for RoundingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "half_up" | "halfup" => Ok(RoundingMode::HalfUp),
            "half_even" | "halfeven" | "bankers" => Ok(RoundingMode::HalfEven),
            "down" | "truncate" => Ok(RoundingMode::Down),
            "up" => Ok(RoundingMode::Up),
            other => Err(format!("unknown rounding mode: {other}")),
        }
    }
}

// ==================== Arithmetic ====================

#[inline]
pub fn add(a: Decimal, b: Decimal) -> Decimal {
    a.saturating_add(b)
}

#[inline]
pub fn sub(a: Decimal, b: Decimal) -> Decimal {
    a.saturating_sub(b)
}

#[inline]
pub fn mul(a: Decimal, b: Decimal) -> Decimal {
    a.saturating_mul(b)
}

/// Division; a zero divisor yields zero (logged)
pub fn div(a: Decimal, b: Decimal) -> Decimal {
    match a.checked_div(b) {
        Some(v) => v,
        None => {
            tracing::error!(dividend = %a, divisor = %b, "money division failed, using zero");
            Decimal::ZERO
        }
    }
}

/// Quantity as a decimal factor
#[inline]
pub fn qty(quantity: i32) -> Decimal {
    Decimal::from(quantity)
}

/// `base * pct / 100`, full precision
pub fn percent_of(base: Decimal, pct: Decimal) -> Decimal {
    div(mul(base, pct), HUNDRED)
}

pub fn sum<I: IntoIterator<Item = Decimal>>(values: I) -> Decimal {
    values.into_iter().fold(Decimal::ZERO, add)
}

// ==================== Rounding ====================

/// Round to 2 places, half-up
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    round2_with(value, RoundingMode::HalfUp)
}

/// Round to 2 places with an explicit mode
pub fn round2_with(value: Decimal, mode: RoundingMode) -> Decimal {
    normalize(value.round_dp_with_strategy(DECIMAL_PLACES, mode.strategy()))
}

/// Negative zero becomes zero; scale is kept
pub fn normalize(value: Decimal) -> Decimal {
    let mut v = value;
    if v.is_zero() {
        v.set_sign_positive(true);
    }
    v
}

/// Two-place display string ("-0.00" never appears)
pub fn format_money(value: Decimal) -> String {
    let mut v = round2(value);
    v.rescale(DECIMAL_PLACES);
    normalize(v).to_string()
}

// ==================== Comparison ====================

#[inline]
pub fn compare(a: Decimal, b: Decimal) -> Ordering {
    a.cmp(&b)
}

#[inline]
pub fn abs(value: Decimal) -> Decimal {
    value.abs()
}

#[inline]
pub fn min(a: Decimal, b: Decimal) -> Decimal {
    a.min(b)
}

#[inline]
pub fn max(a: Decimal, b: Decimal) -> Decimal {
    a.max(b)
}

/// Equal within [`MONEY_TOLERANCE`]
pub fn money_eq(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < MONEY_TOLERANCE
}

/// Below the receipt noise threshold
pub fn is_near_zero(value: Decimal) -> bool {
    value.abs() < NEAR_ZERO
}

// ==================== Conversion Helpers ====================

/// Legacy float boundary; non-finite input becomes zero
pub fn from_f64(value: f64) -> Decimal {
    if !value.is_finite() {
        tracing::error!(value, "non-finite money value, using zero");
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or_default()
}
