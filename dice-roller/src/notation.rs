use anyhow::{Context, Result, bail};
use dice_engine::{Advantage, DiceTray, DieConfig, DieType, RerollOperator, RerollRule};
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;

/// One dice group as written on the command line or in a preset file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiceSpec {
    #[serde(rename = "die", default)]
    pub die_type: DieType,
    #[serde(default)]
    pub sides: Option<u32>,
    #[serde(default = "DiceSpec::default_count")]
    pub count: u32,
    #[serde(default, alias = "modifier")]
    pub numeric_modifier: i32,
    #[serde(default)]
    pub advantage: Advantage,
    #[serde(default)]
    pub reroll: RerollRule,
}

impl DiceSpec {
    const fn default_count() -> u32 {
        1
    }

    /// Copy this group's settings onto a tray entry.
    pub fn apply(&self, cfg: &mut DieConfig) {
        cfg.die_type = self.die_type;
        cfg.sides = self
            .sides
            .unwrap_or_else(|| self.die_type.default_sides());
        cfg.count = self.count;
        cfg.numeric_modifier = self.numeric_modifier;
        cfg.advantage = self.advantage;
        cfg.reroll = self.reroll;
    }
}

fn dice_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d*)[dD](\d+)$").expect("valid dice regex"))
}

fn advantage_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(adv|dis)=(-?\d+)$").expect("valid advantage regex"))
}

fn reroll_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^reroll([<>=])(-?\d+)$").expect("valid reroll regex"))
}

/// Parse one group such as `2d6`, `d20:adv=2` or `3d7:dis=1:reroll<2`.
///
/// Standard face counts map to their die type; anything else is a custom die.
pub fn parse_spec(token: &str) -> Result<DiceSpec> {
    let mut parts = token.trim().split(':');
    let head = parts.next().unwrap_or_default();
    let caps = dice_regex()
        .captures(head)
        .with_context(|| format!("not dice notation: {head:?}"))?;

    let count = match &caps[1] {
        "" => 1,
        digits => digits
            .parse::<u32>()
            .with_context(|| format!("bad dice count in {head:?}"))?,
    };
    let sides: u32 = caps[2]
        .parse()
        .with_context(|| format!("bad side count in {head:?}"))?;
    if count == 0 {
        bail!("{head}: roll at least one die");
    }
    if sides < 2 {
        bail!("{head}: a die needs at least 2 sides");
    }

    let die_type = DieType::for_sides(sides);
    let mut spec = DiceSpec {
        die_type,
        sides: die_type.fixed_sides().is_none().then_some(sides),
        count,
        numeric_modifier: 0,
        advantage: Advantage::None,
        reroll: RerollRule::default(),
    };

    for option in parts {
        let option = option.trim().to_ascii_lowercase();
        if let Some(caps) = advantage_regex().captures(&option) {
            spec.advantage = if &caps[1] == "adv" {
                Advantage::Adv
            } else {
                Advantage::Dis
            };
            spec.numeric_modifier = caps[2]
                .parse()
                .with_context(|| format!("bad modifier in {option:?}"))?;
        } else if let Some(caps) = reroll_regex().captures(&option) {
            let operator = RerollOperator::from_symbol(&caps[1])
                .with_context(|| format!("bad reroll operator in {option:?}"))?;
            let value = caps[2]
                .parse()
                .with_context(|| format!("bad reroll value in {option:?}"))?;
            spec.reroll = RerollRule::new(operator, value);
        } else {
            bail!("unknown dice option {option:?} in {token:?}");
        }
    }

    Ok(spec)
}

/// Parse a comma-separated list of dice groups.
pub fn parse_specs(list: &str) -> Result<Vec<DiceSpec>> {
    let specs = list
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(parse_spec)
        .collect::<Result<Vec<_>>>()?;
    if specs.is_empty() {
        bail!("no dice given");
    }
    Ok(specs)
}

/// Build a tray holding one configuration per spec, in order.
pub fn build_tray(specs: &[DiceSpec]) -> Result<DiceTray> {
    let Some((first, rest)) = specs.split_first() else {
        bail!("no dice given");
    };
    let mut tray = DiceTray::with_first(first.die_type);
    let first_id = tray.configs()[0].id.clone();
    tray.update(&first_id, |cfg| first.apply(cfg))
        .context("invalid first dice group")?;
    for spec in rest {
        let id = tray.add(spec.die_type);
        tray.update(&id, |cfg| spec.apply(cfg))
            .with_context(|| {
                let sides = spec.sides.unwrap_or_else(|| spec.die_type.default_sides());
                format!("invalid dice group {}d{sides}", spec.count)
            })?;
    }
    Ok(tray)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_custom_dice() {
        let spec = parse_spec("3d6").unwrap();
        assert_eq!(spec.die_type, DieType::D6);
        assert_eq!(spec.sides, None);
        assert_eq!(spec.count, 3);

        let spec = parse_spec("d7").unwrap();
        assert_eq!(spec.die_type, DieType::Custom);
        assert_eq!(spec.sides, Some(7));
        assert_eq!(spec.count, 1);
    }

    #[test]
    fn parses_options() {
        let spec = parse_spec("2d20:ADV=3:reroll<2").unwrap();
        assert_eq!(spec.advantage, Advantage::Adv);
        assert_eq!(spec.numeric_modifier, 3);
        assert_eq!(spec.reroll, RerollRule::new(RerollOperator::Below, 2));

        let spec = parse_spec("d8:dis=-1:reroll=8").unwrap();
        assert_eq!(spec.advantage, Advantage::Dis);
        assert_eq!(spec.numeric_modifier, -1);
        assert_eq!(spec.reroll.operator, RerollOperator::Equal);
    }

    #[test]
    fn rejects_bad_notation() {
        assert!(parse_spec("6").is_err());
        assert!(parse_spec("0d6").is_err());
        assert!(parse_spec("2d1").is_err());
        assert!(parse_spec("d6:lucky").is_err());
        assert!(parse_specs(" , ").is_err());
    }

    #[test]
    fn builds_tray_in_order() {
        let specs = parse_specs("1d4, 2d20:adv=1, d9").unwrap();
        let tray = build_tray(&specs).unwrap();
        let labels: Vec<String> = tray.configs().iter().map(DieConfig::label).collect();
        assert_eq!(labels, vec!["1d4", "2d20", "1d9"]);
        assert_eq!(tray.configs()[1].advantage, Advantage::Adv);
        assert_eq!(tray.configs()[2].die_type, DieType::Custom);
    }

    #[test]
    fn preset_entries_deserialize_with_defaults() {
        let spec: DiceSpec = serde_json::from_str(
            r#"{"die":"d12","modifier":2,"advantage":"adv","reroll":{"enabled":true,"operator":"<","value":3}}"#,
        )
        .unwrap();
        assert_eq!(spec.count, 1);
        assert_eq!(spec.numeric_modifier, 2);
        assert!(spec.reroll.enabled);
    }
}
