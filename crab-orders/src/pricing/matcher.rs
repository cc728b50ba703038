//! Price Rule Matcher
//!
//! Logic for matching rules to products and checking time validity.
//! Malformed configuration never raises; it simply does not match.

use super::MatchContext;
use chrono::{DateTime, Datelike, FixedOffset, NaiveTime, Timelike};
use shared::models::price_rule::{
    PriceRule, ProductScope, TimeMode, ZONE_SCOPE_ALL, ZONE_SCOPE_RETAIL,
};

/// Outcome of matching one rule, naming the first failed check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Matched,
    Disabled,
    ZoneMismatch,
    ScopeMismatch,
    OutsideTimeWindow,
}

impl MatchOutcome {
    pub fn is_match(self) -> bool {
        self == MatchOutcome::Matched
    }
}

/// Run all checks in order, short-circuiting on the first failure
pub fn matches(rule: &PriceRule, ctx: &MatchContext) -> MatchOutcome {
    if !rule.is_active {
        return MatchOutcome::Disabled;
    }
    if !matches_zone_scope(rule, ctx.zone_id.as_deref(), ctx.is_retail) {
        return MatchOutcome::ZoneMismatch;
    }
    if !matches_product_scope(rule, ctx) {
        return MatchOutcome::ScopeMismatch;
    }
    let check_time = rule.time_mode != TimeMode::Always || ctx.force_time_check;
    if check_time && !is_time_valid(rule, ctx.now, ctx.utc_offset_minutes) {
        return MatchOutcome::OutsideTimeWindow;
    }
    MatchOutcome::Matched
}

/// Check if a rule matches a product based on scope
pub fn matches_product_scope(rule: &PriceRule, ctx: &MatchContext) -> bool {
    let Some(product) = ctx.product.as_ref() else {
        // Order-level evaluation: only global rules apply
        return rule.product_scope == ProductScope::Global;
    };
    match rule.product_scope {
        ProductScope::Global => true,
        ProductScope::Product => rule.target_id == Some(product.product_id),
        ProductScope::Category => match (rule.target_id, product.category_id) {
            (Some(target), Some(category)) => target == category,
            _ => false,
        },
        ProductScope::Tag => match rule.target_id {
            Some(target) => product.tag_ids.contains(&target),
            None => false,
        },
    }
}

/// Check if a rule matches the zone scope
/// zone_scope: "all" = every zone, "retail" = retail orders only, otherwise a zone id
pub fn matches_zone_scope(rule: &PriceRule, zone_id: Option<&str>, is_retail: bool) -> bool {
    match rule.zone_scope.as_str() {
        ZONE_SCOPE_ALL => true,
        ZONE_SCOPE_RETAIL => is_retail,
        scope => zone_id == Some(scope),
    }
}

/// Check if a rule is active at `now` (Unix millis) in the store's local time
pub fn is_time_valid(rule: &PriceRule, now: i64, utc_offset_minutes: i32) -> bool {
    match rule.time_mode {
        TimeMode::Always | TimeMode::Schedule => {
            check_date_bounds(rule, now) && check_schedule(rule, now, utc_offset_minutes)
        }
        TimeMode::Onetime => check_onetime(rule, now),
    }
}

/// Inclusive valid_from / valid_until bounds (each optional)
fn check_date_bounds(rule: &PriceRule, now: i64) -> bool {
    if let Some(from) = rule.valid_from
        && now < from
    {
        return false;
    }
    if let Some(until) = rule.valid_until
        && now > until
    {
        return false;
    }
    true
}

/// One-time range: both bounds required
fn check_onetime(rule: &PriceRule, now: i64) -> bool {
    match (rule.valid_from, rule.valid_until) {
        (Some(from), Some(until)) => from <= now && now <= until,
        _ => false,
    }
}

/// Weekly schedule: active days, then the HH:MM window
fn check_schedule(rule: &PriceRule, now: i64, utc_offset_minutes: i32) -> bool {
    let Some(local) = local_time(now, utc_offset_minutes) else {
        return false;
    };

    if let Some(days) = &rule.active_days
        && !day_allowed(days, local.weekday().num_days_from_sunday() as u8)
    {
        return false;
    }

    match (&rule.active_start_time, &rule.active_end_time) {
        (None, None) => true,
        (Some(start), Some(end)) => {
            let (Some(start), Some(end)) = (parse_hhmm(start), parse_hhmm(end)) else {
                return false;
            };
            let Some(test) = NaiveTime::from_hms_opt(local.hour(), local.minute(), 0) else {
                return false;
            };
            time_in_window(test, start, end)
        }
        // Half-specified window
        _ => false,
    }
}

/// `days` uses 0=Sunday..6=Saturday. Empty never matches; all seven is unrestricted.
fn day_allowed(days: &[u8], today: u8) -> bool {
    let valid: Vec<u8> = days.iter().copied().filter(|d| *d <= 6).collect();
    if valid.is_empty() {
        return false;
    }
    let mut distinct = valid.clone();
    distinct.sort_unstable();
    distinct.dedup();
    distinct.len() == 7 || valid.contains(&today)
}

/// Window check; `start == end` is degenerate and never matches.
/// Cross-midnight (end < start): `test >= start || test < end`.
pub fn time_in_window(test: NaiveTime, start: NaiveTime, end: NaiveTime) -> bool {
    if start == end {
        return false;
    }
    if start < end {
        start <= test && test < end
    } else {
        test >= start || test < end
    }
}

fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").ok()
}

fn local_time(now: i64, utc_offset_minutes: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(utc_offset_minutes.checked_mul(60)?)?;
    DateTime::from_timestamp_millis(now).map(|utc| utc.with_timezone(&offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::ProductRef;
    use rust_decimal::Decimal;
    use shared::models::price_rule::{AdjustmentType, RuleLevel, RuleType};

    /// 2024-01-03 (Wednesday) 00:00 UTC
    const WED_MIDNIGHT: i64 = 1_704_240_000_000;
    const HOUR: i64 = 3_600_000;

    fn make_rule(product_scope: ProductScope, target_id: Option<i64>) -> PriceRule {
        PriceRule {
            id: 1,
            name: "test".to_string(),
            receipt_name: None,
            rule_type: RuleType::Discount,
            product_scope,
            target_id,
            zone_scope: ZONE_SCOPE_ALL.to_string(),
            adjustment_type: AdjustmentType::Percentage,
            adjustment_value: Decimal::new(10, 0),
            priority: 0,
            is_stackable: true,
            is_exclusive: false,
            rule_level: RuleLevel::Item,
            time_mode: TimeMode::Always,
            valid_from: None,
            valid_until: None,
            active_days: None,
            active_start_time: None,
            active_end_time: None,
            is_active: true,
            created_at: 0,
        }
    }

    fn ctx(now: i64) -> MatchContext {
        MatchContext {
            product: Some(ProductRef {
                product_id: 123,
                category_id: Some(10),
                tag_ids: vec![7, 8],
            }),
            zone_id: Some("1".to_string()),
            is_retail: false,
            quantity: 1,
            base_price: Decimal::new(1000, 2),
            now,
            utc_offset_minutes: 0,
            force_time_check: false,
        }
    }

    fn window(start: &str, end: &str) -> PriceRule {
        let mut rule = make_rule(ProductScope::Global, None);
        rule.time_mode = TimeMode::Schedule;
        rule.active_start_time = Some(start.to_string());
        rule.active_end_time = Some(end.to_string());
        rule
    }

    #[test]
    fn test_global_scope_matches_all() {
        let rule = make_rule(ProductScope::Global, None);
        assert!(matches_product_scope(&rule, &ctx(0)));
    }

    #[test]
    fn test_product_scope_matches_specific() {
        assert!(matches_product_scope(&make_rule(ProductScope::Product, Some(123)), &ctx(0)));
        assert!(!matches_product_scope(&make_rule(ProductScope::Product, Some(456)), &ctx(0)));
        assert!(!matches_product_scope(&make_rule(ProductScope::Product, None), &ctx(0)));
    }

    #[test]
    fn test_category_and_tag_scope() {
        assert!(matches_product_scope(&make_rule(ProductScope::Category, Some(10)), &ctx(0)));
        assert!(!matches_product_scope(&make_rule(ProductScope::Category, Some(11)), &ctx(0)));
        assert!(matches_product_scope(&make_rule(ProductScope::Tag, Some(8)), &ctx(0)));
        assert!(!matches_product_scope(&make_rule(ProductScope::Tag, Some(9)), &ctx(0)));
    }

    #[test]
    fn test_order_level_context_only_matches_global() {
        let mut c = ctx(0);
        c.product = None;
        assert!(matches_product_scope(&make_rule(ProductScope::Global, None), &c));
        assert!(!matches_product_scope(&make_rule(ProductScope::Category, Some(10)), &c));
    }

    #[test]
    fn test_zone_scope() {
        let mut rule = make_rule(ProductScope::Global, None);
        assert!(matches_zone_scope(&rule, Some("1"), false));
        rule.zone_scope = ZONE_SCOPE_RETAIL.to_string();
        assert!(matches_zone_scope(&rule, None, true));
        assert!(!matches_zone_scope(&rule, Some("1"), false));
        rule.zone_scope = "2".to_string();
        assert!(matches_zone_scope(&rule, Some("2"), false));
        assert!(!matches_zone_scope(&rule, Some("1"), false));
        assert!(!matches_zone_scope(&rule, None, false));
    }

    #[test]
    fn test_checks_short_circuit_in_order() {
        let mut rule = make_rule(ProductScope::Product, Some(999));
        rule.zone_scope = "2".to_string();
        rule.is_active = false;
        assert_eq!(matches(&rule, &ctx(0)), MatchOutcome::Disabled);
        rule.is_active = true;
        assert_eq!(matches(&rule, &ctx(0)), MatchOutcome::ZoneMismatch);
        rule.zone_scope = ZONE_SCOPE_ALL.to_string();
        assert_eq!(matches(&rule, &ctx(0)), MatchOutcome::ScopeMismatch);
        rule.target_id = Some(123);
        assert_eq!(matches(&rule, &ctx(0)), MatchOutcome::Matched);
    }

    #[test]
    fn test_cross_midnight_window() {
        let rule = window("21:00", "04:00");
        assert!(is_time_valid(&rule, WED_MIDNIGHT + 23 * HOUR, 0));
        assert!(is_time_valid(&rule, WED_MIDNIGHT + 2 * HOUR, 0));
        assert!(!is_time_valid(&rule, WED_MIDNIGHT + 12 * HOUR, 0));
        // end is exclusive
        assert!(!is_time_valid(&rule, WED_MIDNIGHT + 4 * HOUR, 0));
        assert!(is_time_valid(&rule, WED_MIDNIGHT + 21 * HOUR, 0));
    }

    #[test]
    fn test_normal_window_bounds() {
        let rule = window("11:00", "15:00");
        assert!(is_time_valid(&rule, WED_MIDNIGHT + 11 * HOUR, 0));
        assert!(!is_time_valid(&rule, WED_MIDNIGHT + 15 * HOUR, 0));
        assert!(!is_time_valid(&rule, WED_MIDNIGHT + 10 * HOUR, 0));
    }

    #[test]
    fn test_degenerate_windows_never_match() {
        let now = WED_MIDNIGHT + 12 * HOUR;
        assert!(!is_time_valid(&window("12:00", "12:00"), now, 0));
        assert!(!is_time_valid(&window("noon", "15:00"), now, 0));

        let mut half = window("11:00", "15:00");
        half.active_end_time = None;
        assert!(!is_time_valid(&half, now, 0));
    }

    #[test]
    fn test_active_days() {
        let mut rule = make_rule(ProductScope::Global, None);
        rule.time_mode = TimeMode::Schedule;
        let wednesday = WED_MIDNIGHT + 12 * HOUR;

        rule.active_days = Some(vec![3]);
        assert!(is_time_valid(&rule, wednesday, 0));
        rule.active_days = Some(vec![1, 2]);
        assert!(!is_time_valid(&rule, wednesday, 0));
        rule.active_days = Some(vec![]);
        assert!(!is_time_valid(&rule, wednesday, 0));
        rule.active_days = Some(vec![0, 1, 2, 3, 4, 5, 6]);
        assert!(is_time_valid(&rule, wednesday, 0));
        rule.active_days = Some(vec![9]);
        assert!(!is_time_valid(&rule, wednesday, 0));
    }

    #[test]
    fn test_utc_offset_shifts_local_day_and_time() {
        let rule = window("21:00", "23:00");
        // 20:30 UTC is 22:30 at UTC+2
        let now = WED_MIDNIGHT + 20 * HOUR + HOUR / 2;
        assert!(!is_time_valid(&rule, now, 0));
        assert!(is_time_valid(&rule, now, 120));

        let mut tuesday_only = make_rule(ProductScope::Global, None);
        tuesday_only.time_mode = TimeMode::Schedule;
        tuesday_only.active_days = Some(vec![2]);
        // 01:00 UTC Wednesday is still Tuesday at UTC-3
        assert!(is_time_valid(&tuesday_only, WED_MIDNIGHT + HOUR, -180));
        assert!(!is_time_valid(&tuesday_only, WED_MIDNIGHT + HOUR, 0));
    }

    #[test]
    fn test_onetime_requires_both_bounds() {
        let mut rule = make_rule(ProductScope::Global, None);
        rule.time_mode = TimeMode::Onetime;
        rule.valid_from = Some(WED_MIDNIGHT);
        assert!(!is_time_valid(&rule, WED_MIDNIGHT + HOUR, 0));
        rule.valid_until = Some(WED_MIDNIGHT + 2 * HOUR);
        assert!(is_time_valid(&rule, WED_MIDNIGHT + HOUR, 0));
        assert!(is_time_valid(&rule, WED_MIDNIGHT + 2 * HOUR, 0));
        assert!(!is_time_valid(&rule, WED_MIDNIGHT + 3 * HOUR, 0));
    }

    #[test]
    fn test_schedule_date_bounds() {
        let mut rule = make_rule(ProductScope::Global, None);
        rule.time_mode = TimeMode::Schedule;
        rule.valid_until = Some(WED_MIDNIGHT);
        assert!(!is_time_valid(&rule, WED_MIDNIGHT + 1, 0));
        assert!(is_time_valid(&rule, WED_MIDNIGHT, 0));
    }

    #[test]
    fn test_always_rule_skips_time_unless_forced() {
        let mut rule = make_rule(ProductScope::Global, None);
        rule.valid_until = Some(WED_MIDNIGHT);
        let late = ctx(WED_MIDNIGHT + HOUR);
        assert_eq!(matches(&rule, &late), MatchOutcome::Matched);

        let mut forced = late.clone();
        forced.force_time_check = true;
        assert_eq!(matches(&rule, &forced), MatchOutcome::OutsideTimeWindow);
    }
}
