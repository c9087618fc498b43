use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::temporal::DayWindow;

/// How many candidates a phase-derived demand unit asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseQuantityPolicy {
    /// Ask for however many eligible candidates the pool can supply.
    #[default]
    MatchedSupply,
    /// Ask for the typical crew size for the project's contract value, when the
    /// taxonomy lists one for the role.
    TypicalCrew,
}

impl PhaseQuantityPolicy {
    pub const fn label(self) -> &'static str {
        match self {
            Self::MatchedSupply => "matched_supply",
            Self::TypicalCrew => "typical_crew",
        }
    }
}

impl fmt::Display for PhaseQuantityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("phase quantity policy must be `matched_supply` or `typical_crew`, found '{0}'")]
pub struct PhaseQuantityParseError(pub String);

impl FromStr for PhaseQuantityPolicy {
    type Err = PhaseQuantityParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "matched_supply" => Ok(Self::MatchedSupply),
            "typical_crew" => Ok(Self::TypicalCrew),
            _ => Err(PhaseQuantityParseError(value.to_string())),
        }
    }
}

/// Tunable horizons for a matching pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Candidates finishing within this many days (inclusive) count as supply.
    pub supply_lookahead_days: i64,
    pub direct_window: DayWindow,
    pub phase_window: DayWindow,
    pub phase_quantity: PhaseQuantityPolicy,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            supply_lookahead_days: 21,
            direct_window: DayWindow::new(-7, 60),
            phase_window: DayWindow::new(7, 45),
            phase_quantity: PhaseQuantityPolicy::MatchedSupply,
        }
    }
}

impl MatchingConfig {
    pub fn supply_window(&self) -> DayWindow {
        DayWindow::new(0, self.supply_lookahead_days)
    }
}
