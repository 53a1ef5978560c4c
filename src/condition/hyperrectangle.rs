//! Axis-aligned hyperrectangle condition: matches iff every input
//! component falls within a per-dimension `[lower, upper]` band.

use ndarray::Array1;
use rand::{Rng, RngCore};

use crate::params::Parameters;

#[derive(Debug, Clone, PartialEq)]
pub struct HyperrectangleCondition {
    pub lower: Array1<f64>,
    pub upper: Array1<f64>,
}

impl HyperrectangleCondition {
    pub fn matches(&self, x: &Array1<f64>) -> bool {
        x.iter()
            .zip(self.lower.iter())
            .zip(self.upper.iter())
            .all(|((&xi, &lo), &hi)| xi >= lo && xi <= hi)
    }

    pub fn cover(x: &Array1<f64>, params: &Parameters, rng: &mut dyn RngCore) -> Self {
        let s0 = params.cond_spread;
        let mut lower = Array1::zeros(x.len());
        let mut upper = Array1::zeros(x.len());
        for i in 0..x.len() {
            let spread = rng.random_range(0.0..s0);
            lower[i] = x[i] - spread;
            upper[i] = x[i] + spread;
        }
        Self { lower, upper }
    }

    pub fn mutate(&mut self, params: &Parameters, rng: &mut dyn RngCore) -> bool {
        let mut changed = false;
        for i in 0..self.lower.len() {
            if rng.random_bool(params.mutation_rate) {
                let delta = rng.random_range(-1.0..1.0) * params.cond_spread;
                self.lower[i] += delta;
                changed = true;
            }
            if rng.random_bool(params.mutation_rate) {
                let delta = rng.random_range(-1.0..1.0) * params.cond_spread;
                self.upper[i] += delta;
                changed = true;
            }
        }
        for i in 0..self.lower.len() {
            if self.lower[i] > self.upper[i] {
                std::mem::swap(&mut self.lower[i], &mut self.upper[i]);
            }
        }
        changed
    }

    pub fn crossover(&mut self, other: &mut Self, rng: &mut dyn RngCore) -> bool {
        let mut changed = false;
        for i in 0..self.lower.len() {
            if rng.random_bool(0.5) {
                std::mem::swap(&mut self.lower[i], &mut other.lower[i]);
                std::mem::swap(&mut self.upper[i], &mut other.upper[i]);
                changed = true;
            }
        }
        changed
    }

    /// Mean per-dimension band width, as a stand-in for covered volume
    /// (the true hypervolume underflows quickly in high dimension).
    pub fn generality(&self) -> f64 {
        if self.lower.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .lower
            .iter()
            .zip(self.upper.iter())
            .map(|(&lo, &hi)| (hi - lo).abs())
            .sum();
        total / self.lower.len() as f64
    }

    /// True if `self` subsumes `other`: every bound of `other` lies inside
    /// the corresponding bound of `self`.
    pub fn subsumes(&self, other: &Self) -> bool {
        self.lower
            .iter()
            .zip(other.lower.iter())
            .all(|(&a, &b)| a <= b)
            && self
                .upper
                .iter()
                .zip(other.upper.iter())
                .all(|(&a, &b)| a >= b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParametersBuilder;
    use rand::{rngs::StdRng, SeedableRng};

    fn params() -> Parameters {
        ParametersBuilder::default()
            .x_dim(2)
            .y_dim(1)
            .n_actions(1)
            .build()
            .unwrap()
    }

    #[test]
    fn covering_always_contains_its_seed_point() {
        let p = params();
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let x = Array1::from(vec![rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0)]);
            let c = HyperrectangleCondition::cover(&x, &p, &mut rng);
            assert!(c.matches(&x));
        }
    }

    #[test]
    fn subsumes_is_reflexive() {
        let c = HyperrectangleCondition {
            lower: Array1::from(vec![0.0, 0.0]),
            upper: Array1::from(vec![1.0, 1.0]),
        };
        assert!(c.subsumes(&c));
    }

    #[test]
    fn wider_subsumes_narrower() {
        let wide = HyperrectangleCondition {
            lower: Array1::from(vec![-1.0, -1.0]),
            upper: Array1::from(vec![1.0, 1.0]),
        };
        let narrow = HyperrectangleCondition {
            lower: Array1::from(vec![-0.2, -0.2]),
            upper: Array1::from(vec![0.2, 0.2]),
        };
        assert!(wide.subsumes(&narrow));
        assert!(!narrow.subsumes(&wide));
    }
}
