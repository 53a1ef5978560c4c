//! Axis-aligned ellipsoid condition: matches iff the input lies within a
//! unit Mahalanobis distance of the center, scaled per-axis by `radii`.

use ndarray::Array1;
use rand::{Rng, RngCore};

use crate::params::Parameters;

#[derive(Debug, Clone, PartialEq)]
pub struct EllipsoidCondition {
    pub center: Array1<f64>,
    pub radii: Array1<f64>,
}

impl EllipsoidCondition {
    pub fn matches(&self, x: &Array1<f64>) -> bool {
        let sum: f64 = x
            .iter()
            .zip(self.center.iter())
            .zip(self.radii.iter())
            .map(|((&xi, &ci), &ri)| {
                let r = ri.max(1e-12);
                ((xi - ci) / r).powi(2)
            })
            .sum();
        sum <= 1.0
    }

    pub fn cover(x: &Array1<f64>, params: &Parameters, rng: &mut dyn RngCore) -> Self {
        let s0 = params.cond_spread;
        let radii = Array1::from_iter((0..x.len()).map(|_| rng.random_range(s0 * 0.5..s0)));
        Self {
            center: x.clone(),
            radii,
        }
    }

    pub fn mutate(&mut self, params: &Parameters, rng: &mut dyn RngCore) -> bool {
        let mut changed = false;
        for i in 0..self.center.len() {
            if rng.random_bool(params.mutation_rate) {
                self.center[i] += rng.random_range(-1.0..1.0) * params.cond_spread * 0.5;
                changed = true;
            }
            if rng.random_bool(params.mutation_rate) {
                self.radii[i] =
                    (self.radii[i] + rng.random_range(-1.0..1.0) * params.cond_spread * 0.5)
                        .max(1e-6);
                changed = true;
            }
        }
        changed
    }

    pub fn crossover(&mut self, other: &mut Self, rng: &mut dyn RngCore) -> bool {
        let mut changed = false;
        for i in 0..self.center.len() {
            if rng.random_bool(0.5) {
                std::mem::swap(&mut self.center[i], &mut other.center[i]);
                std::mem::swap(&mut self.radii[i], &mut other.radii[i]);
                changed = true;
            }
        }
        changed
    }

    /// Geometric-mean radius, a scale-free stand-in for volume.
    pub fn generality(&self) -> f64 {
        if self.radii.is_empty() {
            return 0.0;
        }
        let log_sum: f64 = self.radii.iter().map(|r| r.max(1e-12).ln()).sum();
        (log_sum / self.radii.len() as f64).exp()
    }
}
