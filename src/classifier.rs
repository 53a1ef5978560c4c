//! A single classifier (`Cl`): one rule of the form "if `condition` then
//! action `action`, payoff predicted by `prediction`", plus the running
//! statistics (error, fitness, numerosity, experience, set-size estimate,
//! time stamp) the EA and deletion scheme need.

use ndarray::Array1;
use rand::RngCore;

use crate::action::ActionKind;
use crate::condition::ConditionKind;
use crate::params::Parameters;
use crate::prediction::PredictionKind;

#[derive(Debug, Clone)]
pub struct Classifier {
    pub condition: ConditionKind,
    pub action: ActionKind,
    pub prediction: PredictionKind,

    /// Moving-average absolute prediction error.
    pub error: f64,
    /// Relative-accuracy-derived fitness.
    pub fitness: f64,
    /// Macro-classifier numerosity: how many identical micro-classifiers
    /// this struct stands in for.
    pub numerosity: u64,
    /// Number of times this classifier has been updated.
    pub experience: u64,
    /// Moving average of the action set size it has belonged to.
    pub set_size: f64,
    /// Logical-time stamp of the last EA invocation that touched it.
    pub time_stamp: u64,
    /// Logical-time stamp at which this classifier was created (by
    /// covering or as EA offspring); never updated afterward.
    pub age: u64,
}

impl Classifier {
    /// Build a fresh, covering classifier guaranteed to match `x`, seeded
    /// from a `template` only to pick which condition/action/prediction
    /// variant to instantiate (their actual numeric content is generated
    /// fresh around `x`, not copied from the template).
    pub fn cover(
        template: &Classifier,
        x: &Array1<f64>,
        forced_action: Option<usize>,
        current_time: u64,
        params: &Parameters,
        rng: &mut dyn RngCore,
    ) -> Self {
        let condition = template.condition.cover_like(x, params, rng);
        let action = match forced_action {
            Some(a) => ActionKind::Integer(crate::action::integer::IntegerAction { action: a }),
            None => template.action.cover_like(params, rng),
        };
        let prediction = template.prediction.cover_like(params, rng);
        Self {
            condition,
            action,
            prediction,
            error: params.init_error,
            fitness: params.init_fitness,
            numerosity: 1,
            experience: 0,
            set_size: 1.0,
            time_stamp: current_time,
            age: current_time,
        }
    }

    pub fn matches(&self, x: &Array1<f64>) -> bool {
        self.condition.matches(x)
    }

    pub fn predict(&self, x: &Array1<f64>) -> Array1<f64> {
        self.prediction.predict(x)
    }

    /// Update error, prediction, and set-size moving averages from one
    /// trial's observed `(x, target)` pair and the matching action set's
    /// size. Fitness is updated separately, once accuracies across the
    /// whole action set are known (see [`crate::set::Set::update`]).
    pub fn update(
        &mut self,
        x: &Array1<f64>,
        target: &Array1<f64>,
        action_set_size: usize,
        params: &Parameters,
    ) {
        self.experience += 1;
        let pred = self.prediction.predict(x);
        let abs_err: f64 = pred
            .iter()
            .zip(target.iter())
            .map(|(&p, &t)| (p - t).abs())
            .sum::<f64>()
            / pred.len().max(1) as f64;

        if self.experience < (1.0 / params.beta) as u64 + 1 {
            self.error += (abs_err - self.error) / self.experience as f64;
            self.set_size += (action_set_size as f64 - self.set_size) / self.experience as f64;
        } else {
            self.error += params.beta * (abs_err - self.error);
            self.set_size += params.beta * (action_set_size as f64 - self.set_size);
        }

        self.prediction.update(x, target, params);
    }

    /// Raw (un-normalized) accuracy per spec §4.5: 1 if error is below
    /// `eps_0`, else a power-law falloff in error.
    pub fn accuracy(&self, params: &Parameters) -> f64 {
        if self.error < params.eps_0 {
            1.0
        } else {
            params.alpha * (self.error / params.eps_0).powf(-params.nu)
        }
    }

    /// Does `self` subsume `other`: experienced enough, accurate enough,
    /// and general enough to absorb `other`'s condition.
    pub fn could_subsume(&self, params: &Parameters) -> bool {
        self.experience as f64 > params.theta_sub && self.error < params.eps_0
    }

    pub fn subsumes(&self, other: &Classifier, params: &Parameters) -> bool {
        self.action.action() == other.action.action()
            && self.could_subsume(params)
            && condition_subsumes(&self.condition, &other.condition)
    }
}

fn condition_subsumes(a: &ConditionKind, b: &ConditionKind) -> bool {
    match (a, b) {
        (ConditionKind::Hyperrectangle(a), ConditionKind::Hyperrectangle(b)) => a.subsumes(b),
        // other substrates have no cheap subset test; treat as non-subsuming.
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::dummy::DummyCondition;
    use crate::condition::ConditionKind;
    use crate::params::ParametersBuilder;
    use crate::prediction::constant::ConstantPrediction;
    use crate::prediction::PredictionKind;
    use rand::{rngs::StdRng, SeedableRng};

    fn params() -> Parameters {
        ParametersBuilder::default()
            .x_dim(2)
            .y_dim(1)
            .n_actions(2)
            .build()
            .unwrap()
    }

    fn template(p: &Parameters) -> Classifier {
        Classifier {
            condition: ConditionKind::Dummy(DummyCondition),
            action: ActionKind::Integer(crate::action::integer::IntegerAction { action: 0 }),
            prediction: PredictionKind::Constant(ConstantPrediction::new(p)),
            error: p.init_error,
            fitness: p.init_fitness,
            numerosity: 1,
            experience: 0,
            set_size: 1.0,
            time_stamp: 0,
            age: 0,
        }
    }

    #[test]
    fn covering_matches_its_seed_point() {
        let p = params();
        let mut rng = StdRng::seed_from_u64(1);
        let x = Array1::from(vec![0.1, 0.2]);
        let cl = Classifier::cover(&template(&p), &x, None, 0, &p, &mut rng);
        assert!(cl.matches(&x));
    }

    #[test]
    fn covering_stamps_age_at_current_time() {
        let p = params();
        let mut rng = StdRng::seed_from_u64(2);
        let x = Array1::from(vec![0.1, 0.2]);
        let current_time = 42;
        let cl = Classifier::cover(&template(&p), &x, None, current_time, &p, &mut rng);
        assert_eq!(cl.age, current_time);
        assert!(cl.age <= current_time);
    }

    #[test]
    fn accuracy_is_one_below_threshold() {
        let p = params();
        let mut cl = template(&p);
        cl.error = 0.0;
        assert_eq!(cl.accuracy(&p), 1.0);
    }

    #[rstest::rstest(
        error, expect_maximal,
        case(0.0, true),     // well below eps_0
        case(0.009, true),   // just below eps_0
        case(0.01, false),   // at eps_0 (not below, per <)
        case(1.0, false),    // well above eps_0
        case(100.0, false),  // far above eps_0
    )]
    fn accuracy_falls_off_past_threshold(error: f64, expect_maximal: bool) {
        let p = params();
        let mut cl = template(&p);
        cl.error = error;
        let acc = cl.accuracy(&p);
        assert_eq!(acc >= 1.0, expect_maximal);
    }

    #[test]
    fn update_reduces_error_toward_target() {
        let p = params();
        let mut cl = template(&p);
        let x = Array1::from(vec![0.0, 0.0]);
        let target = Array1::from(vec![5.0]);
        for _ in 0..300 {
            cl.update(&x, &target, 1, &p);
        }
        let pred = cl.predict(&x);
        assert!((pred[0] - 5.0).abs() < 0.1);
    }
}
