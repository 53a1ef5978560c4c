//! Normalized least-mean-squares linear prediction: one weight row per
//! output dimension over `[1, x]` (bias-augmented input), updated by the
//! NLMS rule `w += (eta / (||x_aug||^2 + eps)) * e * x_aug`.

use ndarray::{Array1, Array2};
use rand::{Rng, RngCore};

use crate::params::Parameters;

#[derive(Debug, Clone, PartialEq)]
pub struct NlmsPrediction {
    /// `weights[[o, k]]`: weight of output `o` on augmented feature `k`
    /// (`k == 0` is the bias term).
    pub weights: Array2<f64>,
}

fn augment(x: &Array1<f64>) -> Array1<f64> {
    let mut aug = Array1::ones(x.len() + 1);
    aug.slice_mut(ndarray::s![1..]).assign(x);
    aug
}

impl NlmsPrediction {
    pub fn new(params: &Parameters) -> Self {
        let mut weights = Array2::zeros((params.y_dim, params.x_dim + 1));
        for o in 0..params.y_dim {
            weights[[o, 0]] = params.init_fitness;
        }
        Self { weights }
    }

    pub fn predict(&self, x: &Array1<f64>) -> Array1<f64> {
        let aug = augment(x);
        self.weights.dot(&aug)
    }

    pub fn update(&mut self, x: &Array1<f64>, target: &Array1<f64>, params: &Parameters) {
        let aug = augment(x);
        let norm_sq: f64 = aug.iter().map(|v| v * v).sum();
        let denom = (norm_sq + 1e-6).max(1e-6);
        let pred = self.weights.dot(&aug);
        for o in 0..self.weights.nrows() {
            let err = target[o] - pred[o];
            let gain = params.beta * err / denom;
            for k in 0..self.weights.ncols() {
                self.weights[[o, k]] += gain * aug[k];
            }
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
        for i in 0..self.weights.nrows() {
            for j in 0..self.weights.ncols() {
                if rng.random_bool(0.5) {
                    let tmp = self.weights[[i, j]];
                    self.weights[[i, j]] = other.weights[[i, j]];
                    other.weights[[i, j]] = tmp;
                    changed = true;
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParametersBuilder;

    #[test]
    fn learns_a_linear_function() {
        let p = ParametersBuilder::default()
            .x_dim(1)
            .y_dim(1)
            .n_actions(1)
            .beta(0.5)
            .build()
            .unwrap();
        let mut pred = NlmsPrediction::new(&p);
        for i in 0..500 {
            let xv = ((i % 10) as f64) / 10.0;
            let x = Array1::from(vec![xv]);
            let target = Array1::from(vec![2.0 * xv + 1.0]);
            pred.update(&x, &target, &p);
        }
        let x = Array1::from(vec![0.5]);
        let out = pred.predict(&x)[0];
        assert!((out - 2.0).abs() < 0.3);
    }
}
