//! Engine settings (spec §6 `settings`), loaded from an optional TOML file
//! pointed to by `SALSA_CONFIG`, falling back to the documented defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rounding mode applied when prorating contract quotas for employees whose
/// admission or dismissal falls inside the horizon (spec §4.2, §4.5 rule 10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rounding {
    Floor,
    Ceil,
}

impl Default for Rounding {
    fn default() -> Self {
        Rounding::Floor
    }
}

fn default_max_continuous_working_days() -> u32 {
    6
}

fn default_solver_time_limit_seconds() -> u64 {
    600
}

fn default_solver_workers() -> usize {
    8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub admissao_proporcional: Rounding,
    /// Whether the quality-weekend coupling accepts Sunday = L or
    /// Sunday ∈ {L, F}. Only the `false` branch is fully wired into
    /// LQ-eligibility (spec §9 Open Questions) — kept as a documented
    /// asymmetry rather than guessed-at semantics.
    #[serde(rename = "f_special_day")]
    pub f_special_day: bool,
    pub max_continuous_working_days: u32,
    pub solver_time_limit_seconds: u64,
    pub solver_workers: usize,
    /// Declared but not consulted anywhere in the constraint model — the
    /// source leaves its semantics unspecified (spec §9 Open Questions).
    /// Kept as a no-op flag until clarified.
    #[serde(default)]
    pub free_sundays_plus_c2d: bool,
    /// Off by default (spec §7): if the optimizer proves infeasible, retry
    /// once after dropping the lowest-weight constraint classes.
    #[serde(default)]
    pub relax_on_infeasible: bool,
    /// Use a fixed random seed for reproducible runs (spec §4.7).
    #[serde(default)]
    pub reproducible_seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            admissao_proporcional: Rounding::default(),
            f_special_day: false,
            max_continuous_working_days: default_max_continuous_working_days(),
            solver_time_limit_seconds: default_solver_time_limit_seconds(),
            solver_workers: default_solver_workers(),
            free_sundays_plus_c2d: false,
            relax_on_infeasible: false,
            reproducible_seed: None,
        }
    }
}

impl EngineSettings {
    /// Loads settings from the TOML file at `path`, falling back to
    /// defaults for any field the file omits.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|source| ConfigError::Read { source })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse { source })
    }

    /// Loads from `SALSA_CONFIG` if set, otherwise returns the defaults.
    pub fn from_env() -> Self {
        match std::env::var_os("SALSA_CONFIG") {
            Some(path) => match Self::from_toml_file(&path) {
                Ok(settings) => settings,
                Err(err) => {
                    tracing::warn!(error = %err, "falling back to default engine settings");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file: {source}")]
    Read { source: std::io::Error },
    #[error("could not parse config file: {source}")]
    Parse { source: toml::de::Error },
}
