//! Constant prediction: the classifier predicts a fixed payoff vector,
//! updated toward observed targets by a Widrow-Hoff delta rule with
//! learning rate `beta`.

use ndarray::Array1;
use rand::{Rng, RngCore};

use crate::params::Parameters;

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPrediction {
    pub weights: Array1<f64>,
}

impl ConstantPrediction {
    pub fn new(params: &Parameters) -> Self {
        Self {
            weights: Array1::from_elem(params.y_dim, params.init_fitness),
        }
    }

    pub fn predict(&self, _x: &Array1<f64>) -> Array1<f64> {
        self.weights.clone()
    }

    pub fn update(&mut self, target: &Array1<f64>, params: &Parameters) {
        for (w, &t) in self.weights.iter_mut().zip(target.iter()) {
            *w += params.beta * (t - *w);
        }
    }

    pub fn mutate(&mut self, params: &Parameters, rng: &mut dyn RngCore) -> bool {
        let mut changed = false;
        for w in self.weights.iter_mut() {
            if rng.random_bool(params.mutation_rate) {
                *w += rng.random_range(-1.0..1.0) * params.cond_spread * 0.1;
                changed = true;
            }
        }
        changed
    }

    pub fn crossover(&mut self, other: &mut Self, rng: &mut dyn RngCore) -> bool {
        let mut changed = false;
        for i in 0..self.weights.len() {
            if rng.random_bool(0.5) {
                std::mem::swap(&mut self.weights[i], &mut other.weights[i]);
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParametersBuilder;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn mutate_can_change_weights() {
        let p = ParametersBuilder::default()
            .x_dim(1)
            .y_dim(2)
            .n_actions(1)
            .mutation_rate(1.0)
            .build()
            .unwrap();
        let mut pred = ConstantPrediction::new(&p);
        let before = pred.weights.clone();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(pred.mutate(&p, &mut rng));
        assert_ne!(before, pred.weights);
    }

    #[test]
    fn converges_to_constant_target() {
        let p = ParametersBuilder::default()
            .x_dim(1)
            .y_dim(2)
            .n_actions(1)
            .build()
            .unwrap();
        let mut pred = ConstantPrediction::new(&p);
        let target = Array1::from(vec![3.0, -1.0]);
        for _ in 0..500 {
            pred.update(&target, &p);
        }
        for (w, t) in pred.weights.iter().zip(target.iter()) {
            assert!((w - t).abs() < 0.01);
        }
    }
}
