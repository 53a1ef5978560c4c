//! Classic ternary `{0, 1, #}` condition over (approximately) binary
//! inputs. `#` (don't-care) always matches; a fixed bit matches inputs
//! within `eps` of the bit value.

use ndarray::Array1;
use rand::{Rng, RngCore};

use crate::params::Parameters;

const MATCH_EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gene {
    DontCare,
    Bit(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TernaryCondition {
    pub genes: Vec<Gene>,
}

impl TernaryCondition {
    pub fn matches(&self, x: &Array1<f64>) -> bool {
        self.genes.iter().zip(x.iter()).all(|(g, &xi)| match g {
            Gene::DontCare => true,
            Gene::Bit(b) => (xi - if *b { 1.0 } else { 0.0 }).abs() < MATCH_EPS,
        })
    }

    /// `dont_care_rate` controls the fraction of genes created as `#`.
    pub fn cover(x: &Array1<f64>, params: &Parameters, rng: &mut dyn RngCore) -> Self {
        let dont_care_rate = params.cond_spread.clamp(0.0, 1.0);
        let genes = x
            .iter()
            .map(|&xi| {
                if rng.random_bool(dont_care_rate) {
                    Gene::DontCare
                } else {
                    Gene::Bit(xi >= 0.5)
                }
            })
            .collect();
        Self { genes }
    }

    pub fn mutate(&mut self, params: &Parameters, rng: &mut dyn RngCore) -> bool {
        let mut changed = false;
        for g in self.genes.iter_mut() {
            if rng.random_bool(params.mutation_rate) {
                *g = match g {
                    Gene::DontCare => Gene::Bit(rng.random_bool(0.5)),
                    Gene::Bit(_) => Gene::DontCare,
                };
                changed = true;
            }
        }
        changed
    }

    pub fn crossover(&mut self, other: &mut Self, rng: &mut dyn RngCore) -> bool {
        let mut changed = false;
        for i in 0..self.genes.len() {
            if rng.random_bool(0.5) {
                std::mem::swap(&mut self.genes[i], &mut other.genes[i]);
                changed = true;
            }
        }
        changed
    }

    /// Fraction of genes that are `#` (don't-care).
    pub fn generality(&self) -> f64 {
        if self.genes.is_empty() {
            return 0.0;
        }
        let dont_care = self
            .genes
            .iter()
            .filter(|g| matches!(g, Gene::DontCare))
            .count();
        dont_care as f64 / self.genes.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParametersBuilder;
    use rand::{rngs::StdRng, SeedableRng};

    fn params() -> Parameters {
        ParametersBuilder::default()
            .x_dim(3)
            .y_dim(1)
            .n_actions(2)
            .cond_spread(0.3)
            .build()
            .unwrap()
    }

    #[test]
    fn all_dont_care_matches_everything() {
        let c = TernaryCondition {
            genes: vec![Gene::DontCare; 3],
        };
        assert!(c.matches(&Array1::from(vec![1.0, 0.0, 1.0])));
        assert!(c.matches(&Array1::from(vec![0.0, 0.0, 0.0])));
    }

    #[test]
    fn fixed_bit_rejects_mismatch() {
        let c = TernaryCondition {
            genes: vec![Gene::Bit(true), Gene::DontCare],
        };
        assert!(c.matches(&Array1::from(vec![1.0, 0.0])));
        assert!(!c.matches(&Array1::from(vec![0.0, 0.0])));
    }

    #[test]
    fn covering_matches_its_seed() {
        let p = params();
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let x = Array1::from(vec![1.0, 0.0, 1.0]);
            let c = TernaryCondition::cover(&x, &p, &mut rng);
            assert!(c.matches(&x));
        }
    }
}
