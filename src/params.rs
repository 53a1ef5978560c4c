//! Typed configuration surface.
//!
//! `Parameters` is built through [`ParametersBuilder`] (generated by
//! `derive_builder`), the same owned-pattern-plus-validation shape the
//! teacher uses for its algorithm builders. Parsing these values out of an
//! on-disk file is out of scope here; callers construct the struct
//! directly or through the builder.

use crate::error::ConfigError;

/// Selection scheme used by the evolutionary algorithm to pick EA parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EaSelectType {
    Tournament,
    RouletteWheel,
}

/// All tunable knobs of the engine, grouped the way spec §4.1 lists them.
#[derive(Debug, Clone, derive_builder::Builder, PartialEq)]
#[builder(pattern = "owned", build_fn(validate = "Self::validate", error = "ConfigError"))]
pub struct Parameters {
    /// Number of input (condition/prediction) dimensions.
    pub x_dim: usize,
    /// Number of output (prediction) dimensions.
    pub y_dim: usize,
    /// Number of discrete actions (RL) or unused (SL, where it is 1).
    pub n_actions: usize,

    /// Maximum classifier population size (macro-classifier numerosity sum).
    #[builder(default = "2000")]
    pub pop_size: usize,
    /// Total number of trials to run.
    #[builder(default = "100_000")]
    pub max_trials: usize,
    /// Window size over which performance is averaged/logged.
    #[builder(default = "1000")]
    pub perf_trials: usize,

    /// EA invocation threshold: average time since a set's classifiers last
    /// underwent EA before the EA runs again.
    #[builder(default = "25.0")]
    pub theta_ea: f64,
    /// Crossover probability.
    #[builder(default = "0.8")]
    pub p_crossover: f64,
    /// Expected number of EA offspring per invocation (usually 2).
    #[builder(default = "2")]
    pub lambda: usize,
    /// EA parent-selection scheme.
    #[builder(default = "EaSelectType::RouletteWheel")]
    pub ea_select_type: EaSelectType,
    /// Tournament size as a fraction of the set (only used when
    /// `ea_select_type` is `Tournament`).
    #[builder(default = "0.4")]
    pub ea_select_size: f64,

    /// Moyson-style accuracy falloff exponent.
    #[builder(default = "0.1")]
    pub alpha: f64,
    /// Accuracy falloff rate exponent.
    #[builder(default = "5.0")]
    pub nu: f64,
    /// Learning rate for error/fitness/set-size moving averages.
    #[builder(default = "0.2")]
    pub beta: f64,
    /// Error threshold below which a classifier is considered accurate.
    #[builder(default = "0.01")]
    pub eps_0: f64,

    /// Subsumption error threshold.
    #[builder(default = "0.01")]
    pub theta_sub: f64,
    /// Enables GA (EA-offspring) subsumption.
    #[builder(default = "true")]
    pub do_ga_subsumption: bool,
    /// Enables action-set subsumption.
    #[builder(default = "true")]
    pub do_set_subsumption: bool,

    /// Minimum classifier experience before it becomes eligible for
    /// deletion-vote weighting by fitness rather than flat numerosity.
    #[builder(default = "20.0")]
    pub theta_del: f64,
    /// Fraction below mean fitness beyond which a classifier's deletion
    /// vote is inflated.
    #[builder(default = "0.1")]
    pub delta: f64,

    /// Initial values assigned to a newly-covered classifier.
    #[builder(default = "10.0")]
    pub init_error: f64,
    #[builder(default = "0.01")]
    pub init_fitness: f64,

    /// Probability of taking a random (explore) action vs. the greedy one.
    #[builder(default = "true")]
    pub explore: bool,
    /// Discount factor applied to the next state's best prediction when
    /// bootstrapping a multi-step RL payoff (`P = r + gamma * max PA(s')`).
    #[builder(default = "0.71")]
    pub gamma: f64,

    /// Half-width ("s0") used when covering creates a fresh
    /// hyperrectangle/ellipsoid condition around an uncovered input.
    #[builder(default = "1.0")]
    pub cond_spread: f64,
    /// Per-gene mutation probability ("mu") shared by condition, action
    /// and prediction mutation operators.
    #[builder(default = "0.1")]
    pub mutation_rate: f64,
}

impl Parameters {
    fn validate(b: &ParametersBuilder) -> Result<(), ConfigError> {
        let x_dim = b.x_dim.unwrap_or(0);
        let y_dim = b.y_dim.unwrap_or(0);
        let n_actions = b.n_actions.unwrap_or(0);
        if x_dim == 0 || y_dim == 0 || n_actions == 0 {
            return Err(ConfigError::ZeroDimension {
                x_dim,
                y_dim,
                n_actions,
            });
        }
        if let Some(pop_size) = b.pop_size {
            if pop_size == 0 {
                return Err(ConfigError::NotPositive {
                    field: "pop_size",
                    value: 0.0,
                });
            }
        }
        for (field, value) in [
            ("p_crossover", b.p_crossover),
            ("ea_select_size", b.ea_select_size),
            ("mutation_rate", b.mutation_rate),
            ("gamma", b.gamma),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(ConfigError::NotAProbability { field, value: v });
                }
            }
        }
        for (field, value) in [
            ("theta_ea", b.theta_ea),
            ("alpha", b.alpha),
            ("nu", b.nu),
            ("beta", b.beta),
            ("eps_0", b.eps_0),
            ("theta_sub", b.theta_sub),
            ("theta_del", b.theta_del),
            ("init_error", b.init_error),
            ("cond_spread", b.cond_spread),
        ] {
            if let Some(v) = value {
                if v < 0.0 {
                    return Err(ConfigError::NotPositive { field, value: v });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_builder() -> ParametersBuilder {
        ParametersBuilder::default().x_dim(2).y_dim(1).n_actions(1)
    }

    #[test]
    fn builds_with_defaults() {
        let p = base_builder().build().unwrap();
        assert_eq!(p.pop_size, 2000);
        assert_eq!(p.ea_select_type, EaSelectType::RouletteWheel);
    }

    #[test]
    fn rejects_zero_dimension() {
        let err = ParametersBuilder::default()
            .x_dim(0)
            .y_dim(1)
            .n_actions(1)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ZeroDimension { .. }));
    }

    #[test]
    fn rejects_bad_probability() {
        let err = base_builder().p_crossover(1.5).build().unwrap_err();
        assert!(matches!(err, ConfigError::NotAProbability { .. }));
    }

    #[test]
    fn rejects_negative_rate() {
        let err = base_builder().beta(-0.1).build().unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { .. }));
    }
}
