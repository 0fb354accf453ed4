use anyhow::{Context, Result, bail};
use dice_engine::ServiceLimits;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::notation::DiceSpec;

/// Saved tray plus optional service limits, read from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Preset {
    pub dice: Vec<DiceSpec>,
    #[serde(default)]
    pub limits: ServiceLimits,
}

impl Preset {
    pub fn from_json(raw: &str) -> Result<Self> {
        let preset: Self = serde_json::from_str(raw).context("parsing dice preset")?;
        if preset.dice.is_empty() {
            bail!("preset lists no dice");
        }
        Ok(preset)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid preset {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dice_engine::{Advantage, DieType};

    #[test]
    fn parses_preset_with_default_limits() {
        let preset = Preset::from_json(
            r#"{"dice":[{"die":"d20","advantage":"adv","modifier":5},{"die":"custom","sides":30,"count":2}]}"#,
        )
        .unwrap();
        assert_eq!(preset.dice.len(), 2);
        assert_eq!(preset.dice[0].advantage, Advantage::Adv);
        assert_eq!(preset.dice[1].die_type, DieType::Custom);
        assert_eq!(preset.limits, ServiceLimits::default());
    }

    #[test]
    fn rejects_empty_preset() {
        assert!(Preset::from_json(r#"{"dice":[]}"#).is_err());
        assert!(Preset::from_json("not json").is_err());
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Preset::load(Path::new("/definitely/missing/preset.json")).unwrap_err();
        assert!(format!("{err:#}").contains("failed to read"));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let path = std::env::temp_dir().join("dice-roller-preset.json");
        fs::write(&path, r#"{"dice":[{"die":"d4","count":3}],"limits":{"max_dice":5}}"#)
            .unwrap();
        let preset = Preset::load(&path).unwrap();
        assert_eq!(preset.dice[0].count, 3);
        assert_eq!(preset.limits.max_dice, 5);
    }
}
