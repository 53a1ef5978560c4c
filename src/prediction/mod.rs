//! Prediction capability: maps a matched input to a predicted payoff
//! vector, and learns online from `(input, target)` pairs. Closed enum
//! dispatch, mirroring [`crate::condition::ConditionKind`].

pub mod constant;
pub mod neural;
pub mod nlms;
pub mod rls;

use ndarray::Array1;
use rand::RngCore;

use crate::params::Parameters;
use constant::ConstantPrediction;
use neural::NeuralPrediction;
use nlms::NlmsPrediction;
use rls::RlsPrediction;

#[derive(Debug, Clone)]
pub enum PredictionKind {
    Constant(ConstantPrediction),
    Nlms(NlmsPrediction),
    Rls(RlsPrediction),
    Neural(NeuralPrediction),
}

impl PredictionKind {
    pub fn predict(&self, x: &Array1<f64>) -> Array1<f64> {
        match self {
            PredictionKind::Constant(p) => p.predict(x),
            PredictionKind::Nlms(p) => p.predict(x),
            PredictionKind::Rls(p) => p.predict(x),
            PredictionKind::Neural(p) => p.predict(x),
        }
    }

    pub fn update(&mut self, x: &Array1<f64>, target: &Array1<f64>, params: &Parameters) {
        match self {
            PredictionKind::Constant(p) => p.update(target, params),
            PredictionKind::Nlms(p) => p.update(x, target, params),
            PredictionKind::Rls(p) => p.update(x, target, params),
            PredictionKind::Neural(p) => p.update(x, target, params),
        }
    }

    pub fn cover_like(&self, params: &Parameters, rng: &mut dyn RngCore) -> Self {
        match self {
            PredictionKind::Constant(_) => {
                PredictionKind::Constant(ConstantPrediction::new(params))
            }
            PredictionKind::Nlms(_) => PredictionKind::Nlms(NlmsPrediction::new(params)),
            PredictionKind::Rls(_) => PredictionKind::Rls(RlsPrediction::new(params)),
            PredictionKind::Neural(_) => {
                PredictionKind::Neural(NeuralPrediction::new(params, rng))
            }
        }
    }

    /// Mutate in place. Returns whether any coefficient actually changed.
    pub fn mutate(&mut self, params: &Parameters, rng: &mut dyn RngCore) -> bool {
        match self {
            PredictionKind::Constant(p) => p.mutate(params, rng),
            PredictionKind::Nlms(p) => p.mutate(params, rng),
            PredictionKind::Rls(p) => p.mutate(params, rng),
            PredictionKind::Neural(p) => p.mutate(params, rng),
        }
    }

    /// Uniform crossover between two same-variant predictions. No-op
    /// across mismatched variants (should not occur: the EA only crosses
    /// classifiers sharing the same prediction variant by construction).
    pub fn crossover(&mut self, other: &mut Self, rng: &mut dyn RngCore) -> bool {
        match (self, other) {
            (PredictionKind::Constant(a), PredictionKind::Constant(b)) => a.crossover(b, rng),
            (PredictionKind::Nlms(a), PredictionKind::Nlms(b)) => a.crossover(b, rng),
            (PredictionKind::Rls(a), PredictionKind::Rls(b)) => a.crossover(b, rng),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParametersBuilder;

    fn params() -> Parameters {
        ParametersBuilder::default()
            .x_dim(2)
            .y_dim(1)
            .n_actions(1)
            .build()
            .unwrap()
    }

    #[test]
    fn constant_prediction_learns_target() {
        let p = params();
        let mut pred = PredictionKind::Constant(ConstantPrediction::new(&p));
        let x = Array1::from(vec![0.0, 0.0]);
        let target = Array1::from(vec![1.0]);
        for _ in 0..200 {
            pred.update(&x, &target, &p);
        }
        let out = pred.predict(&x);
        assert!((out[0] - 1.0).abs() < 0.05);
    }
}
