//! Price Rule Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rule type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleType {
    Discount,
    Surcharge,
}

/// Product scope enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductScope {
    Global,
    Category,
    Tag,
    Product,
}

/// Adjustment type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjustmentType {
    Percentage,
    FixedAmount,
}

/// How the validity window of a rule is interpreted
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeMode {
    /// No time restriction
    #[default]
    Always,
    /// Recurring weekly window (days + HH:MM range), optionally bounded by dates
    Schedule,
    /// Single date range; both bounds required
    Onetime,
}

/// Whether a rule prices individual lines or the whole order
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleLevel {
    #[default]
    Item,
    Order,
}

/// Zone scope constants
pub const ZONE_SCOPE_ALL: &str = "all";
pub const ZONE_SCOPE_RETAIL: &str = "retail";

fn default_zone_scope() -> String {
    ZONE_SCOPE_ALL.to_string()
}

fn default_true() -> bool {
    true
}

/// Price rule entity
///
/// Externally managed configuration; read-only inside the order core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRule {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_name: Option<String>,
    pub rule_type: RuleType,
    pub product_scope: ProductScope,
    /// Target record ID based on scope (category/tag/product ID)
    #[serde(default)]
    pub target_id: Option<i64>,
    /// Zone scope: "all", "retail", or specific zone ID
    #[serde(default = "default_zone_scope")]
    pub zone_scope: String,
    pub adjustment_type: AdjustmentType,
    /// Adjustment value (percentage: 30=30%, fixed: 5.00=€5)
    pub adjustment_value: Decimal,
    /// Lower value wins
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub is_stackable: bool,
    /// An exclusive match suppresses every other rule of the same type
    #[serde(default)]
    pub is_exclusive: bool,
    #[serde(default)]
    pub rule_level: RuleLevel,
    #[serde(default)]
    pub time_mode: TimeMode,
    /// Valid from datetime (Unix millis, inclusive)
    #[serde(default)]
    pub valid_from: Option<i64>,
    /// Valid until datetime (Unix millis, inclusive)
    #[serde(default)]
    pub valid_until: Option<i64>,
    /// Active days of week (0=Sunday..6=Saturday); empty means never
    #[serde(default)]
    pub active_days: Option<Vec<u8>>,
    /// Active start time (HH:MM format)
    #[serde(default)]
    pub active_start_time: Option<String>,
    /// Active end time (HH:MM format)
    #[serde(default)]
    pub active_end_time: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: i64,
}

impl PriceRule {
    /// Always-on, global, all-zone, item-level rule; adjust the rest with field updates
    pub fn new(
        id: i64,
        name: impl Into<String>,
        rule_type: RuleType,
        adjustment_type: AdjustmentType,
        adjustment_value: Decimal,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            receipt_name: None,
            rule_type,
            product_scope: ProductScope::Global,
            target_id: None,
            zone_scope: default_zone_scope(),
            adjustment_type,
            adjustment_value,
            priority: 0,
            is_stackable: false,
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

    /// Label printed on receipts
    pub fn display_label(&self) -> &str {
        self.receipt_name.as_deref().unwrap_or(&self.name)
    }

    /// Deterministic precedence key: lower priority first, then lower id
    pub fn precedence(&self) -> (i32, i64) {
        (self.priority, self.id)
    }
}

/// Versioned rule collection as served by the configuration source
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RuleSet {
    /// Opaque version tag; a change invalidates every cached evaluation
    pub version: String,
    pub rules: Vec<PriceRule>,
}

impl RuleSet {
    pub fn new(version: impl Into<String>, rules: Vec<PriceRule>) -> Self {
        Self {
            version: version.into(),
            rules,
        }
    }

    pub fn item_rules(&self) -> Vec<PriceRule> {
        self.rules
            .iter()
            .filter(|r| r.rule_level == RuleLevel::Item)
            .cloned()
            .collect()
    }

    pub fn order_rules(&self) -> Vec<PriceRule> {
        self.rules
            .iter()
            .filter(|r| r.rule_level == RuleLevel::Order)
            .cloned()
            .collect()
    }

    pub fn get(&self, rule_id: i64) -> Option<&PriceRule> {
        self.rules.iter().find(|r| r.id == rule_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_defaults_from_minimal_json() {
        let json = r#"{
            "id": 7,
            "name": "Happy hour",
            "rule_type": "DISCOUNT",
            "product_scope": "GLOBAL",
            "adjustment_type": "PERCENTAGE",
            "adjustment_value": "15"
        }"#;
        let rule: PriceRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.zone_scope, ZONE_SCOPE_ALL);
        assert_eq!(rule.time_mode, TimeMode::Always);
        assert_eq!(rule.rule_level, RuleLevel::Item);
        assert!(rule.is_active);
        assert!(!rule.is_stackable);
        assert_eq!(rule.adjustment_value, Decimal::new(15, 0));
        assert_eq!(rule.display_label(), "Happy hour");
    }

    #[test]
    fn test_rule_set_split_by_level() {
        let json = r#"[
            {"id": 1, "name": "a", "rule_type": "DISCOUNT", "product_scope": "GLOBAL",
             "adjustment_type": "PERCENTAGE", "adjustment_value": "10"},
            {"id": 2, "name": "b", "rule_type": "SURCHARGE", "product_scope": "GLOBAL",
             "adjustment_type": "FIXED_AMOUNT", "adjustment_value": "2.5", "rule_level": "ORDER"}
        ]"#;
        let rules: Vec<PriceRule> = serde_json::from_str(json).unwrap();
        let set = RuleSet::new("v1", rules);
        assert_eq!(set.item_rules().len(), 1);
        assert_eq!(set.order_rules()[0].id, 2);
        assert!(set.get(2).is_some());
        assert!(set.get(3).is_none());
    }
}
