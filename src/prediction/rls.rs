//! Recursive least squares linear prediction: maintains an inverse
//! covariance matrix `P` over the bias-augmented input and updates weights
//! via the Sherman-Morrison rank-one formula, avoiding any explicit matrix
//! inversion per step.

use ndarray::{Array1, Array2};
use rand::{Rng, RngCore};

use crate::params::Parameters;

const RLS_LAMBDA: f64 = 1.0;
const RLS_INIT_SCALE: f64 = 1000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RlsPrediction {
    pub weights: Array2<f64>,
    pub p: Array2<f64>,
}

fn augment(x: &Array1<f64>) -> Array1<f64> {
    let mut aug = Array1::ones(x.len() + 1);
    aug.slice_mut(ndarray::s![1..]).assign(x);
    aug
}

impl RlsPrediction {
    pub fn new(params: &Parameters) -> Self {
        let dim = params.x_dim + 1;
        let weights = Array2::zeros((params.y_dim, dim));
        let p = Array2::eye(dim) * RLS_INIT_SCALE;
        Self { weights, p }
    }

    pub fn predict(&self, x: &Array1<f64>) -> Array1<f64> {
        self.weights.dot(&augment(x))
    }

    pub fn update(&mut self, x: &Array1<f64>, target: &Array1<f64>, _params: &Parameters) {
        let aug = augment(x);
        let p_x = self.p.dot(&aug);
        let denom = RLS_LAMBDA + aug.dot(&p_x);
        let gain = &p_x / denom.max(1e-9);

        let pred = self.weights.dot(&aug);
        for o in 0..self.weights.nrows() {
            let err = target[o] - pred[o];
            for k in 0..self.weights.ncols() {
                self.weights[[o, k]] += err * gain[k];
            }
        }

        let dim = aug.len();
        let mut new_p = Array2::zeros((dim, dim));
        for i in 0..dim {
            for j in 0..dim {
                new_p[[i, j]] = (self.p[[i, j]] - gain[i] * p_x[j]) / RLS_LAMBDA;
            }
        }
        self.p = new_p;
    }

    /// Mutates the regression weights; the inverse-covariance matrix `p`
    /// is learning-algorithm state, not a classifier coefficient, and is
    /// left untouched.
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
