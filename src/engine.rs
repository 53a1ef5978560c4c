//! Public engine handle. Owns the population, parameters and RNG, and
//! implements the library surface: `new`, `fit`, `predict`, `score`,
//! `step`, `update`, `save`, `load`, `print`. The `fit`/`predict`/`score`
//! trio is the supervised-learning trial orchestrator; `step`/`update` is
//! the reinforcement-learning one, run one environment interaction at a
//! time by the caller's own environment loop (out of scope here, per
//! `SPEC_FULL.md` §1/§6).

use std::io::{Read, Write};
use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use rand::RngCore;
use tracing::{debug, info, trace};

use crate::action::ActionKind;
use crate::classifier::Classifier;
use crate::condition::hyperrectangle::HyperrectangleCondition;
use crate::condition::ConditionKind;
use crate::error::{DimensionError, PersistenceError, XcsfResult};
use crate::params::Parameters;
use crate::population::Population;
use crate::prediction::constant::ConstantPrediction;
use crate::prediction::nlms::NlmsPrediction;
use crate::prediction::PredictionKind;
use crate::prediction_array::PredictionArray;
use crate::random::XcsfRng;
use crate::serialize;
use crate::set::Set;

/// The accuracy-based evolutionary learning classifier system.
pub struct Xcsf {
    pub params: Parameters,
    pub population: Population,
    pub(crate) rng: XcsfRng,
    pub(crate) current_time: u64,
    template: Classifier,
}

impl Xcsf {
    /// Construct a fresh, empty engine. `template` fixes which
    /// condition/action/prediction *variant* covering will instantiate;
    /// defaults to a hyperrectangle condition, integer action, NLMS
    /// prediction, the combination spec §8's regression fixtures exercise.
    pub fn new(params: Parameters, seed: u64) -> Self {
        let template = Classifier {
            condition: ConditionKind::Hyperrectangle(HyperrectangleCondition {
                lower: Array1::zeros(params.x_dim),
                upper: Array1::zeros(params.x_dim),
            }),
            action: ActionKind::Integer(crate::action::integer::IntegerAction { action: 0 }),
            prediction: PredictionKind::Nlms(NlmsPrediction::new(&params)),
            error: params.init_error,
            fitness: params.init_fitness,
            numerosity: 1,
            experience: 0,
            set_size: 1.0,
            time_stamp: 0,
            age: 0,
        };
        Self {
            rng: XcsfRng::new_from_seed(seed),
            current_time: 0,
            population: Population::new(),
            template,
            params,
        }
    }

    /// Swap in a different covering template, e.g. to use the constant or
    /// ternary/GP-tree condition variant instead of the hyperrectangle
    /// default.
    pub fn with_template(mut self, template: Classifier) -> Self {
        self.template = template;
        self
    }

    /// One supervised-learning trial: cover if necessary, form the match
    /// set over every action (SL ignores the action dimension), update
    /// from `(x, target)`, run the EA, enforce the population cap.
    fn sl_trial(&mut self, x: &Array1<f64>, target: &Array1<f64>) {
        self.cover_if_needed(x, Some(0));
        let m = Set::build_match(&self.population, x);
        trace!(match_size = m.len(), time = self.current_time, "sl trial");
        m.update(&mut self.population, x, target, &self.params);
        if crate::ea::should_run(&self.population, &m, self.current_time, &self.params) {
            debug!(time = self.current_time, "running EA");
            crate::ea::run(
                &mut self.population,
                &m,
                self.current_time,
                &self.params,
                self.rng.rng_as_core(),
            );
        }
        self.population.enforce_cap(&self.params, self.rng.rng_as_core());
        self.population.kill_sweep();
        self.current_time += 1;
    }

    /// Insert a fresh covering classifier when no existing member matches
    /// `x` (or none advocate `forced_action`, when given).
    fn cover_if_needed(&mut self, x: &Array1<f64>, forced_action: Option<usize>) {
        let m = Set::build_match(&self.population, x);
        let covered = match forced_action {
            Some(a) => m.classifiers(&self.population).iter().any(|c| c.action.action() == a),
            None => !m.is_empty(),
        };
        if !covered {
            let cl = Classifier::cover(
                &self.template,
                x,
                forced_action,
                self.current_time,
                &self.params,
                self.rng.rng_as_core(),
            );
            self.population.insert(cl);
        }
    }

    /// Train for `params.max_trials` trials over a dataset, cycling
    /// through rows, logging a progress line every `perf_trials`.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array2<f64>) -> XcsfResult<()> {
        if x.ncols() != self.params.x_dim {
            return Err(DimensionError::InputShape {
                expected: self.params.x_dim,
                actual: x.ncols(),
            }
            .into());
        }
        if y.ncols() != self.params.y_dim {
            return Err(DimensionError::TargetShape {
                expected: self.params.y_dim,
                actual: y.ncols(),
            }
            .into());
        }
        let n_rows = x.nrows();
        for trial in 0..self.params.max_trials {
            let row = trial % n_rows.max(1);
            let xi = x.row(row).to_owned();
            let yi = y.row(row).to_owned();
            self.sl_trial(&xi, &yi);
            if trial % self.params.perf_trials == 0 {
                info!(trial, pop_size = self.population.len(), "fit progress");
            }
        }
        Ok(())
    }

    /// Predict `y` for every row of `x`, using each row's match set's
    /// fitness-weighted prediction average (no covering: an uncovered row
    /// predicts zero).
    pub fn predict(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = Array2::zeros((x.nrows(), self.params.y_dim));
        for (row_idx, row) in x.axis_iter(Axis(0)).enumerate() {
            let xi = row.to_owned();
            let m = Set::build_match(&self.population, &xi);
            let members = m.classifiers(&self.population);
            if members.is_empty() {
                continue;
            }
            let mut weighted = Array1::zeros(self.params.y_dim);
            let mut weight_total = 0.0;
            for cl in members {
                let w = cl.fitness * cl.numerosity as f64;
                weighted = weighted + cl.predict(&xi) * w;
                weight_total += w;
            }
            if weight_total > 0.0 {
                out.row_mut(row_idx).assign(&(weighted / weight_total));
            }
        }
        out
    }

    /// Mean absolute error between `predict(x)` and `y`.
    pub fn score(&self, x: &Array2<f64>, y: &Array2<f64>) -> f64 {
        let pred = self.predict(x);
        let diff = &pred - y;
        diff.mapv(f64::abs).mean().unwrap_or(0.0)
    }

    /// One reinforcement-learning decision step: cover for every action
    /// absent from the match set, build the prediction array, and return
    /// the chosen action (explore/exploit per `params.explore`).
    pub fn step(&mut self, x: &Array1<f64>) -> XcsfResult<usize> {
        for a in 0..self.params.n_actions {
            self.cover_if_needed(x, Some(a));
        }
        let m = Set::build_match(&self.population, x);
        let pa = PredictionArray::build(&self.population, &m, x, self.params.n_actions);
        if self.params.explore && self.rng.rng_as_core().next_u64() % 2 == 0 {
            Ok((self.rng.rng_as_core().next_u64() as usize) % self.params.n_actions.max(1))
        } else {
            Ok(pa.best_action()?)
        }
    }

    /// Apply the observed reward for the action taken in the most recent
    /// `step`, updating that action set and running the EA on it. For a
    /// non-terminal step, `x_next` bootstraps the payoff with the next
    /// state's best prediction discounted by `gamma`:
    /// `P = r + gamma * max PA(s')`. `done` steps (or a missing `x_next`)
    /// use the raw reward as the payoff.
    pub fn update(&mut self, x: &Array1<f64>, action: usize, reward: f64, x_next: Option<&Array1<f64>>, done: bool) {
        let payoff = if done {
            reward
        } else if let Some(x_next) = x_next {
            for a in 0..self.params.n_actions {
                self.cover_if_needed(x_next, Some(a));
            }
            let m_next = Set::build_match(&self.population, x_next);
            let pa_next = PredictionArray::build(&self.population, &m_next, x_next, self.params.n_actions);
            reward + self.params.gamma * pa_next.max_value()
        } else {
            reward
        };

        let m = Set::build_match(&self.population, x);
        let a = m.build_action(&self.population, action);
        let target = Array1::from_elem(1, payoff);
        a.update(&mut self.population, x, &target, &self.params);
        if crate::ea::should_run(&self.population, &a, self.current_time, &self.params) {
            crate::ea::run(
                &mut self.population,
                &a,
                self.current_time,
                &self.params,
                self.rng.rng_as_core(),
            );
        }
        self.population.enforce_cap(&self.params, self.rng.rng_as_core());
        self.population.kill_sweep();
        self.current_time += 1;
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let mut f = std::fs::File::create(path)?;
        let bytes = serialize::encode(&self.population)?;
        f.write_all(&bytes)?;
        Ok(())
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), PersistenceError> {
        let mut f = std::fs::File::open(path)?;
        let mut bytes = Vec::new();
        f.read_to_end(&mut bytes)?;
        self.population = serialize::decode_with_dims(
            &bytes,
            self.params.x_dim,
            self.params.y_dim,
            self.params.n_actions,
        )?;
        Ok(())
    }

    /// Human-readable population dump.
    pub fn print(&self, verbose: bool) -> String {
        let mut out = format!(
            "population: {} macro-classifiers, {} micro-classifiers\n",
            self.population.len(),
            self.population.num_sum()
        );
        if verbose {
            for (i, cl) in self.population.classifiers.iter().enumerate() {
                out.push_str(&format!(
                    "  [{i}] action={} num={} fit={:.4} err={:.4}\n",
                    cl.action.action(),
                    cl.numerosity,
                    cl.fitness,
                    cl.error
                ));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParametersBuilder;

    fn params() -> Parameters {
        ParametersBuilder::default()
            .x_dim(1)
            .y_dim(1)
            .n_actions(1)
            .max_trials(50)
            .perf_trials(10)
            .pop_size(50)
            .build()
            .unwrap()
    }

    #[test]
    fn fit_then_predict_reduces_error_on_constant_target() {
        let mut engine = Xcsf::new(params(), 1);
        let x = Array2::from_shape_fn((10, 1), |(i, _)| i as f64 / 10.0);
        let y = Array2::from_elem((10, 1), 2.0);
        engine.fit(&x, &y).unwrap();
        let score = engine.score(&x, &y);
        assert!(score < 2.0);
    }

    #[test]
    fn rl_step_returns_valid_action() {
        let p = ParametersBuilder::default()
            .x_dim(1)
            .y_dim(1)
            .n_actions(3)
            .explore(false)
            .build()
            .unwrap();
        let mut engine = Xcsf::new(p, 2);
        let x = Array1::from(vec![0.1]);
        let action = engine.step(&x).unwrap();
        assert!(action < 3);
        engine.update(&x, action, 1.0, None, true);
    }

    #[test]
    fn non_terminal_update_bootstraps_from_next_state() {
        let p = ParametersBuilder::default()
            .x_dim(1)
            .y_dim(1)
            .n_actions(1)
            .explore(false)
            .gamma(0.5)
            .build()
            .unwrap();
        let mut engine = Xcsf::new(p, 9);
        let x = Array1::from(vec![0.0]);
        let x_next = Array1::from(vec![1.0]);

        // Give the next state a known, large prediction so the bootstrap
        // term dominates a zero immediate reward.
        let action = engine.step(&x_next).unwrap();
        engine.update(&x_next, action, 10.0, None, true);

        let action = engine.step(&x).unwrap();
        engine.update(&x, action, 0.0, Some(&x_next), false);

        let m = Set::build_match(&engine.population, &x);
        let a = m.build_action(&engine.population, action);
        let has_nonzero_prediction = a
            .classifiers(&engine.population)
            .iter()
            .any(|c| c.predict(&x)[0] > 0.0);
        assert!(has_nonzero_prediction);
    }
}
