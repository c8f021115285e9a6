//! Solver configuration.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Hard upper bound on component size. Enumeration visits `2^n`
/// assignments, so a pass over a component this size stays around a billion
/// mask checks.
pub const ENUMERATION_LIMIT: usize = 30;

/// Default tractability bound for tier-3 enumeration.
pub const DEFAULT_MAX_COMPONENT_SIZE: usize = 20;

fn default_max_component_size() -> usize {
    DEFAULT_MAX_COMPONENT_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Frontier components with more cells than this are skipped by tier 3.
    #[serde(default = "default_max_component_size")]
    pub max_component_size: usize,
    /// Upper bound on escalation passes for [`solve_to_fixpoint`](crate::solver::solve_to_fixpoint).
    /// `None` means `rows * cols * 2`.
    pub max_passes: Option<usize>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_component_size: DEFAULT_MAX_COMPONENT_SIZE,
            max_passes: None,
        }
    }
}

impl SolverConfig {
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.max_component_size == 0 {
            return Err(ConfigError::ZeroComponentBound);
        }
        if self.max_component_size > ENUMERATION_LIMIT {
            return Err(ConfigError::ComponentBoundTooLarge(self.max_component_size));
        }
        if self.max_passes == Some(0) {
            return Err(ConfigError::ZeroPassBound);
        }
        Ok(self)
    }

    /// Pass bound for a board of the given extents.
    pub fn pass_limit(&self, rows: usize, cols: usize) -> usize {
        self.max_passes.unwrap_or_else(|| (rows * cols * 2).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = SolverConfig::default();
        assert_eq!(config.validate(), Ok(config));
        assert_eq!(config.pass_limit(16, 16), 512);
    }

    #[test]
    fn test_rejects_bad_bounds() {
        let zero = SolverConfig { max_component_size: 0, ..Default::default() };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroComponentBound));

        let at_limit = SolverConfig { max_component_size: ENUMERATION_LIMIT, ..Default::default() };
        assert_eq!(at_limit.validate(), Ok(at_limit));

        let over = SolverConfig { max_component_size: ENUMERATION_LIMIT + 1, ..Default::default() };
        assert_eq!(over.validate(), Err(ConfigError::ComponentBoundTooLarge(ENUMERATION_LIMIT + 1)));

        let huge = SolverConfig { max_component_size: 63, ..Default::default() };
        assert_eq!(huge.validate(), Err(ConfigError::ComponentBoundTooLarge(63)));

        let no_passes = SolverConfig { max_passes: Some(0), ..Default::default() };
        assert_eq!(no_passes.validate(), Err(ConfigError::ZeroPassBound));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: SolverConfig = serde_json::from_str(r#"{ "max_passes": 40 }"#).unwrap();
        assert_eq!(config.max_component_size, DEFAULT_MAX_COMPONENT_SIZE);
        assert_eq!(config.pass_limit(100, 100), 40);

        let config: SolverConfig = serde_json::from_str(r#"{ "max_component_size": 12 }"#).unwrap();
        assert_eq!(config.max_component_size, 12);
        assert_eq!(config.max_passes, None);
    }
}
