//! Solver configuration.
use serde::Deserialize;

/// Restart strategy selection.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    /// Restart intervals follow the Luby sequence scaled by `luby_base` conflicts.
    Luby,
    /// Restart when the fast moving average of learned clause glue exceeds the slow one.
    GlucoseEma,
    /// Never restart.
    None,
}

/// Configurable parameters used during solving.
///
/// The restart, activity and reduction parameters can be changed between `solve` calls; resource
/// limits are read at the start of each call.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Restart policy. (Default: Luby)
    pub restart_policy: RestartPolicy,

    /// Scaling factor for Luby sequence based restarts, in conflicts. (Default: 128)
    pub luby_base: u64,

    /// Decay coefficient for the fast glue moving average. (Default: 1/32)
    pub glucose_fast_alpha: f64,

    /// Decay coefficient for the slow glue moving average. (Default: 1/4096)
    pub glucose_slow_alpha: f64,

    /// Restart when the fast glue average exceeds the slow one by this factor. (Default: 1.25)
    pub glucose_restart_margin: f64,

    /// Minimum trail length for restart postponement, 0 disables postponement. (Default: 0)
    pub glucose_postpone_trail_size: usize,

    /// Multiplicative decay for the VSIDS decision heuristic. (Default: 0.95)
    pub var_activity_decay: f64,

    /// Rescale all variable activities when one exceeds this value. (Default: 1e100)
    pub var_activity_rescale_threshold: f64,

    /// Multiplicative decay for clause activities. (Default: 0.999)
    pub clause_activity_decay: f32,

    /// Probability of picking a random polarity on a decision. (Default: 0.02)
    pub random_phase_probability: f64,

    /// Seed for the branching random number generator. (Default: 91648253)
    pub random_seed: f64,

    /// Reuse the last assigned polarity when branching on a variable. (Default: true)
    pub phase_saving: bool,

    /// Learned clause count that triggers the first database reduction. (Default: 2000)
    pub reduce_initial_limit: u64,

    /// Percentage applied to the reduction limit after each reduction. (Default: 150)
    pub reduce_growth: u64,

    /// Learned clauses with glue at or below this value are never deleted. (Default: 2)
    pub glue_lbd_threshold: usize,

    /// Stop with an unknown verdict after this many conflicts. (Default: off)
    pub max_conflicts: Option<u64>,

    /// Stop with an unknown verdict after this many decisions. (Default: off)
    pub max_decisions: Option<u64>,

    /// Stop with an unknown verdict after this much wall clock time. (Default: off)
    pub max_time_seconds: Option<f64>,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            restart_policy: RestartPolicy::Luby,
            luby_base: 128,
            glucose_fast_alpha: 1.0 / 32.0,
            glucose_slow_alpha: 1.0 / 4096.0,
            glucose_restart_margin: 1.25,
            glucose_postpone_trail_size: 0,
            var_activity_decay: 0.95,
            var_activity_rescale_threshold: 1e100,
            clause_activity_decay: 0.999,
            random_phase_probability: 0.02,
            random_seed: 91648253.0,
            phase_saving: true,
            reduce_initial_limit: 2000,
            reduce_growth: 150,
            glue_lbd_threshold: 2,
            max_conflicts: None,
            max_decisions: None,
            max_time_seconds: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = SolverConfig::default();
        assert!(config.var_activity_decay > 0.0 && config.var_activity_decay < 1.0);
        assert!(config.clause_activity_decay > 0.0 && config.clause_activity_decay < 1.0);
        assert!(config.glucose_fast_alpha > config.glucose_slow_alpha);
        assert!(config.random_phase_probability >= 0.0 && config.random_phase_probability <= 1.0);
        assert!(config.reduce_growth > 100);
    }

    #[test]
    fn partial_toml_merges_over_defaults() {
        let config: SolverConfig =
            toml::from_str("restart_policy = \"glucose_ema\"\nmax_conflicts = 100\n").unwrap();
        assert_eq!(config.restart_policy, RestartPolicy::GlucoseEma);
        assert_eq!(config.max_conflicts, Some(100));
        assert_eq!(config.luby_base, SolverConfig::default().luby_base);
    }
}
