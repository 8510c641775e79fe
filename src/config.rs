//! Search configuration.

use thiserror::Error;

/// Rejected configuration values.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("compute budget must be at least 1")]
    ZeroComputeBudget,

    #[error("exploration weight must be positive and finite, got {0}")]
    InvalidExplorationWeight(f64),

    #[error("rollout limit must be at least 1")]
    ZeroRolloutLimit,

    #[error("decay level must be at least 1")]
    ZeroDecayLevel,
}

/// Parameters shared by the rollout and the evaluator-guided searches.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// The `c` in `Q + c * P * sqrt(N_parent) / (1 + N)`.
    /// Higher values lean on the prior and on unvisited moves.
    pub exploration_weight: f64,

    /// Number of playouts run per search call.
    pub compute_budget: u32,

    /// A leaf is only expanded once it has been visited this many times.
    /// Capped at `compute_budget`.
    pub expand_bound: u32,

    /// Maximum number of moves in a single random rollout. Exceeding it is not an error;
    /// the rollout is scored as a draw.
    pub rollout_limit: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            exploration_weight: 5.0,
            compute_budget: 10_000,
            expand_bound: 1,
            rollout_limit: 1_000,
        }
    }
}

impl SearchConfig {
    /// Settings for rollout search: expand a leaf on its second visit.
    pub fn for_pure() -> Self {
        Self::default()
    }

    /// Settings for evaluator-guided search: expand a leaf after ten visits.
    pub fn for_guided() -> Self {
        Self {
            expand_bound: 10,
            ..Self::default()
        }
    }

    pub fn with_exploration_weight(mut self, c: f64) -> Self {
        self.exploration_weight = c;
        self
    }

    pub fn with_compute_budget(mut self, budget: u32) -> Self {
        self.compute_budget = budget;
        self
    }

    pub fn with_expand_bound(mut self, bound: u32) -> Self {
        self.expand_bound = bound;
        self
    }

    pub fn with_rollout_limit(mut self, limit: u32) -> Self {
        self.rollout_limit = limit;
        self
    }

    /// The expansion threshold actually applied during search.
    pub fn effective_expand_bound(&self) -> u32 {
        self.expand_bound.min(self.compute_budget)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compute_budget == 0 {
            return Err(ConfigError::ZeroComputeBudget);
        }
        if !(self.exploration_weight.is_finite() && self.exploration_weight > 0.0) {
            return Err(ConfigError::InvalidExplorationWeight(
                self.exploration_weight,
            ));
        }
        if self.rollout_limit == 0 {
            return Err(ConfigError::ZeroRolloutLimit);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.compute_budget, 10_000);
        assert_eq!(config.expand_bound, 1);
        assert_eq!(config.rollout_limit, 1_000);
        assert!((config.exploration_weight - 5.0).abs() < 1e-12);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn guided_preset_delays_expansion() {
        assert_eq!(SearchConfig::for_guided().expand_bound, 10);
        assert_eq!(SearchConfig::for_pure(), SearchConfig::default());
    }

    #[test]
    fn builder_pattern() {
        let config = SearchConfig::for_guided()
            .with_compute_budget(4)
            .with_exploration_weight(1.5)
            .with_rollout_limit(20);
        assert_eq!(config.compute_budget, 4);
        assert_eq!(config.effective_expand_bound(), 4);
        assert_eq!(config.rollout_limit, 20);
        assert!((config.exploration_weight - 1.5).abs() < 1e-12);
    }

    #[test]
    fn rejects_bad_values() {
        assert_eq!(
            SearchConfig::default().with_compute_budget(0).validate(),
            Err(ConfigError::ZeroComputeBudget)
        );
        assert_eq!(
            SearchConfig::default()
                .with_exploration_weight(-1.0)
                .validate(),
            Err(ConfigError::InvalidExplorationWeight(-1.0))
        );
        assert!(
            SearchConfig::default()
                .with_exploration_weight(f64::NAN)
                .validate()
                .is_err()
        );
        assert_eq!(
            SearchConfig::default().with_rollout_limit(0).validate(),
            Err(ConfigError::ZeroRolloutLimit)
        );
    }
}
