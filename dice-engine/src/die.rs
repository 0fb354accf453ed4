//! Die configuration value objects.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of die a configuration rolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DieType {
    D2,
    D3,
    D4,
    #[default]
    D6,
    D8,
    D10,
    D12,
    D20,
    /// User supplied number of sides.
    Custom,
}

impl DieType {
    /// Every standard die type, smallest first.
    pub const STANDARD: [Self; 8] = [
        Self::D2,
        Self::D3,
        Self::D4,
        Self::D6,
        Self::D8,
        Self::D10,
        Self::D12,
        Self::D20,
    ];

    /// Sides used when a custom die is added without an explicit size.
    pub const DEFAULT_CUSTOM_SIDES: u32 = 6;

    /// Face count fixed by the type, `None` for custom dice.
    #[must_use]
    pub const fn fixed_sides(self) -> Option<u32> {
        match self {
            Self::D2 => Some(2),
            Self::D3 => Some(3),
            Self::D4 => Some(4),
            Self::D6 => Some(6),
            Self::D8 => Some(8),
            Self::D10 => Some(10),
            Self::D12 => Some(12),
            Self::D20 => Some(20),
            Self::Custom => None,
        }
    }

    /// Face count a freshly added die of this type starts with.
    #[must_use]
    pub const fn default_sides(self) -> u32 {
        match self.fixed_sides() {
            Some(sides) => sides,
            None => Self::DEFAULT_CUSTOM_SIDES,
        }
    }

    /// Standard type with exactly `sides` faces, or `Custom` for anything else.
    #[must_use]
    pub fn for_sides(sides: u32) -> Self {
        Self::STANDARD
            .into_iter()
            .find(|kind| kind.fixed_sides() == Some(sides))
            .unwrap_or(Self::Custom)
    }
}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fixed_sides() {
            Some(sides) => write!(f, "d{sides}"),
            None => write!(f, "custom"),
        }
    }
}

/// Advantage flag controlling whether the numeric modifier is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Advantage {
    #[default]
    None,
    Adv,
    Dis,
}

impl Advantage {
    /// Signed adjustment this flag applies for a given modifier.
    #[must_use]
    pub const fn delta(self, modifier: i32) -> i32 {
        match self {
            Self::None => 0,
            Self::Adv => modifier,
            Self::Dis => modifier.saturating_neg(),
        }
    }
}

/// Comparison used by a reroll rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RerollOperator {
    #[default]
    #[serde(rename = "<")]
    Below,
    #[serde(rename = ">")]
    Above,
    #[serde(rename = "=")]
    Equal,
}

impl RerollOperator {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Below => "<",
            Self::Above => ">",
            Self::Equal => "=",
        }
    }

    /// Parse `<`, `>` or `=`.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "<" => Some(Self::Below),
            ">" => Some(Self::Above),
            "=" => Some(Self::Equal),
            _ => None,
        }
    }
}

/// Condition under which a die face is redrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RerollRule {
    pub enabled: bool,
    pub operator: RerollOperator,
    pub value: i32,
}

impl RerollRule {
    /// Enabled rule for `operator` and `value`.
    #[must_use]
    pub const fn new(operator: RerollOperator, value: i32) -> Self {
        Self {
            enabled: true,
            operator,
            value,
        }
    }

    /// Whether `face` satisfies the reroll condition (ignores `enabled`).
    #[must_use]
    pub const fn matches(&self, face: i32) -> bool {
        match self.operator {
            RerollOperator::Below => face < self.value,
            RerollOperator::Above => face > self.value,
            RerollOperator::Equal => face == self.value,
        }
    }
}

/// Opaque identifier of a configuration inside a tray.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigId(String);

impl ConfigId {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One group of identical dice plus its local modifier rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DieConfig {
    pub id: ConfigId,
    pub die_type: DieType,
    pub sides: u32,
    pub count: u32,
    pub numeric_modifier: i32,
    pub advantage: Advantage,
    pub reroll: RerollRule,
}

impl DieConfig {
    /// Single die of `die_type` with no modifiers.
    #[must_use]
    pub fn new(id: ConfigId, die_type: DieType) -> Self {
        Self {
            id,
            die_type,
            sides: die_type.default_sides(),
            count: 1,
            numeric_modifier: 0,
            advantage: Advantage::None,
            reroll: RerollRule::default(),
        }
    }

    /// Adjustment the advantage rule adds to every die of this group.
    #[must_use]
    pub const fn advantage_delta(&self) -> i32 {
        self.advantage.delta(self.numeric_modifier)
    }

    /// Short label such as `2d6` or `1d7`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}d{}", self.count, self.sides)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_types_fix_their_sides() {
        assert_eq!(DieType::D20.fixed_sides(), Some(20));
        assert_eq!(DieType::Custom.fixed_sides(), None);
        assert_eq!(DieType::Custom.default_sides(), 6);
        assert_eq!(DieType::for_sides(12), DieType::D12);
        assert_eq!(DieType::for_sides(7), DieType::Custom);
    }

    #[test]
    fn advantage_delta_signs() {
        assert_eq!(Advantage::Adv.delta(2), 2);
        assert_eq!(Advantage::Dis.delta(2), -2);
        assert_eq!(Advantage::Dis.delta(-3), 3);
        assert_eq!(Advantage::None.delta(5), 0);
    }

    #[test]
    fn reroll_conditions() {
        assert!(RerollRule::new(RerollOperator::Below, 3).matches(2));
        assert!(!RerollRule::new(RerollOperator::Below, 3).matches(3));
        assert!(RerollRule::new(RerollOperator::Above, 5).matches(6));
        assert!(RerollRule::new(RerollOperator::Equal, 1).matches(1));
        assert!(!RerollRule::new(RerollOperator::Equal, 1).matches(4));
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&RerollRule::new(RerollOperator::Above, 4)).unwrap();
        assert_eq!(json, r#"{"enabled":true,"operator":">","value":4}"#);
        let kind: DieType = serde_json::from_str(r#""d10""#).unwrap();
        assert_eq!(kind, DieType::D10);
        let adv: Advantage = serde_json::from_str(r#""dis""#).unwrap();
        assert_eq!(adv, Advantage::Dis);
    }

    #[test]
    fn new_config_defaults() {
        let cfg = DieConfig::new(ConfigId::new("a"), DieType::Custom);
        assert_eq!(cfg.sides, 6);
        assert_eq!(cfg.count, 1);
        assert!(!cfg.reroll.enabled);
        assert_eq!(cfg.reroll.operator, RerollOperator::Below);
        assert_eq!(cfg.label(), "1d6");
    }
}
