//! Prediction array (PA): a fitness-weighted average, per discrete action,
//! of every matching classifier's predicted payoff. Used by the
//! reinforcement-learning trial orchestrator to pick the greedy action.
//!
//! RL payoff is a scalar; classifiers whose `y_dim > 1` (the supervised
//! case) are never routed through the PA, so only `prediction[0]` is
//! consulted here.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use ndarray::Array1;

use crate::error::DimensionError;
use crate::population::Population;
use crate::set::Set;

#[derive(Debug, Clone)]
pub struct PredictionArray {
    /// Fitness-weighted payoff estimate per action; `NaN` where no
    /// classifier in the match set advocates that action.
    pub values: Vec<f64>,
}

impl PredictionArray {
    /// Build the PA for match set `m` over `n_actions` discrete actions.
    pub fn build(population: &Population, m: &Set, x: &Array1<f64>, n_actions: usize) -> Self {
        #[cfg(feature = "parallel")]
        let per_action: Vec<(f64, f64)> = (0..n_actions)
            .into_par_iter()
            .map(|a| accumulate_action(population, m, x, a))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let per_action: Vec<(f64, f64)> = (0..n_actions)
            .map(|a| accumulate_action(population, m, x, a))
            .collect();

        let values = per_action
            .into_iter()
            .map(|(weighted_sum, weight_total)| {
                if weight_total > 0.0 {
                    weighted_sum / weight_total
                } else {
                    f64::NAN
                }
            })
            .collect();
        Self { values }
    }

    /// Greedy action: the index of the highest value, ignoring NaN
    /// (unrepresented) entries.
    pub fn best_action(&self) -> Result<usize, DimensionError> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_nan())
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(i, _)| i)
            .ok_or(DimensionError::EmptyPredictionArray)
    }

    pub fn value(&self, action: usize) -> Option<f64> {
        self.values.get(action).copied().filter(|v| !v.is_nan())
    }

    /// Highest payoff estimate across represented actions, used to
    /// bootstrap a non-terminal RL step's target; 0 if nothing matches.
    pub fn max_value(&self) -> f64 {
        self.values
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None::<f64>, |acc, v| Some(acc.map_or(v, |a| a.max(v))))
            .unwrap_or(0.0)
    }
}

fn accumulate_action(population: &Population, m: &Set, x: &Array1<f64>, action: usize) -> (f64, f64) {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for &i in &m.indices {
        let cl = &population.classifiers[i];
        if cl.action.action() != action {
            continue;
        }
        let weight = cl.fitness * cl.numerosity as f64;
        weighted_sum += cl.predict(x)[0] * weight;
        weight_total += weight;
    }
    (weighted_sum, weight_total)
}
