//! The editable list of dice configurations for one roll session.
use serde::Serialize;
use std::sync::Arc;

use crate::die::{ConfigId, DieConfig, DieType};
use crate::error::ConfigError;

/// Immutable view of the tray taken when a roll action starts.
pub type TraySnapshot = Arc<[DieConfig]>;

/// Ordered list of dice configurations; never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiceTray {
    configs: Vec<DieConfig>,
    #[serde(skip)]
    next_id: u64,
}

impl Default for DiceTray {
    fn default() -> Self {
        Self::with_first(DieType::D6)
    }
}

impl DiceTray {
    /// Tray holding a single die of `die_type`.
    #[must_use]
    pub fn with_first(die_type: DieType) -> Self {
        let mut tray = Self {
            configs: Vec::new(),
            next_id: 1,
        };
        tray.add(die_type);
        tray
    }

    fn fresh_id(&mut self) -> ConfigId {
        let id = ConfigId::new(format!("cfg-{}", self.next_id));
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Append a default configuration of `die_type` and return its id.
    pub fn add(&mut self, die_type: DieType) -> ConfigId {
        let id = self.fresh_id();
        self.configs.push(DieConfig::new(id.clone(), die_type));
        id
    }

    /// Remove a configuration. The last remaining configuration and unknown
    /// ids are left alone; returns whether anything was removed.
    pub fn remove(&mut self, id: &ConfigId) -> bool {
        if self.configs.len() <= 1 {
            return false;
        }
        let before = self.configs.len();
        self.configs.retain(|config| &config.id != id);
        before != self.configs.len()
    }

    /// Edit one configuration in place.
    ///
    /// The edit runs on a copy; standard die types get their face count back
    /// and the result is validated before it replaces the stored entry. The
    /// id cannot be changed.
    ///
    /// # Errors
    ///
    /// Returns an error if `id` is unknown or the edited configuration has
    /// fewer than 2 sides or a zero count.
    pub fn update<F>(&mut self, id: &ConfigId, edit: F) -> Result<&DieConfig, ConfigError>
    where
        F: FnOnce(&mut DieConfig),
    {
        let slot = self
            .configs
            .iter_mut()
            .find(|config| &config.id == id)
            .ok_or_else(|| ConfigError::UnknownId(id.clone()))?;

        let mut edited = slot.clone();
        edit(&mut edited);
        edited.id = slot.id.clone();
        if let Some(sides) = edited.die_type.fixed_sides() {
            edited.sides = sides;
        }
        if edited.sides < 2 {
            return Err(ConfigError::TooFewSides {
                sides: edited.sides,
            });
        }
        if edited.count == 0 {
            return Err(ConfigError::ZeroCount);
        }

        *slot = edited;
        Ok(slot)
    }

    #[must_use]
    pub fn get(&self, id: &ConfigId) -> Option<&DieConfig> {
        self.configs.iter().find(|config| &config.id == id)
    }

    #[must_use]
    pub fn configs(&self) -> &[DieConfig] {
        &self.configs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Always false; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Total number of dice across all configurations.
    #[must_use]
    pub fn dice_count(&self) -> u64 {
        self.configs.iter().map(|config| u64::from(config.count)).sum()
    }

    #[must_use]
    pub fn snapshot(&self) -> TraySnapshot {
        Arc::from(self.configs.as_slice())
    }
}
