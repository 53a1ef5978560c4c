//! Condition capability: decides whether a classifier matches an input.
//!
//! Rather than `Box<dyn Condition>` trait objects (which would force the
//! RNG facade in [`crate::random`] to erase its associated type at every
//! call site), the seven condition variants are collected into a single
//! closed enum, [`ConditionKind`], and dispatched by match. The variant set
//! is fixed by the specification, so enum dispatch is the idiomatic choice
//! here over an open trait-object hierarchy.

pub mod dgp;
pub mod dummy;
pub mod ellipsoid;
pub mod gp_tree;
pub mod hyperrectangle;
pub mod neural;
pub mod ternary;

use ndarray::Array1;
use rand::RngCore;

use crate::params::Parameters;
use dgp::DgpCondition;
use dummy::DummyCondition;
use ellipsoid::EllipsoidCondition;
use gp_tree::GpTreeCondition;
use hyperrectangle::HyperrectangleCondition;
use neural::NeuralCondition;
use ternary::TernaryCondition;

/// One of the condition substrates a classifier may carry.
#[derive(Debug, Clone)]
pub enum ConditionKind {
    Hyperrectangle(HyperrectangleCondition),
    Ellipsoid(EllipsoidCondition),
    Ternary(TernaryCondition),
    Neural(NeuralCondition),
    GpTree(GpTreeCondition),
    Dgp(DgpCondition),
    Dummy(DummyCondition),
}

impl ConditionKind {
    /// Does this condition match input `x`?
    pub fn matches(&self, x: &Array1<f64>) -> bool {
        match self {
            ConditionKind::Hyperrectangle(c) => c.matches(x),
            ConditionKind::Ellipsoid(c) => c.matches(x),
            ConditionKind::Ternary(c) => c.matches(x),
            ConditionKind::Neural(c) => c.matches(x),
            ConditionKind::GpTree(c) => c.matches(x),
            ConditionKind::Dgp(c) => c.matches(x),
            ConditionKind::Dummy(c) => c.matches(x),
        }
    }

    /// Create a new condition guaranteed to match `x`, of the same variant
    /// kind as `self` (used as a covering template). `self` is consulted
    /// only to pick which variant's `cover` constructor to call.
    pub fn cover_like(&self, x: &Array1<f64>, params: &Parameters, rng: &mut dyn RngCore) -> Self {
        match self {
            ConditionKind::Hyperrectangle(_) => {
                ConditionKind::Hyperrectangle(HyperrectangleCondition::cover(x, params, rng))
            }
            ConditionKind::Ellipsoid(_) => {
                ConditionKind::Ellipsoid(EllipsoidCondition::cover(x, params, rng))
            }
            ConditionKind::Ternary(_) => {
                ConditionKind::Ternary(TernaryCondition::cover(x, params, rng))
            }
            ConditionKind::Neural(_) => {
                ConditionKind::Neural(NeuralCondition::cover(x, params, rng))
            }
            ConditionKind::GpTree(_) => {
                ConditionKind::GpTree(GpTreeCondition::cover(x, params, rng))
            }
            ConditionKind::Dgp(_) => ConditionKind::Dgp(DgpCondition::cover(x, params, rng)),
            ConditionKind::Dummy(_) => ConditionKind::Dummy(DummyCondition::cover(x, params, rng)),
        }
    }

    /// Mutate in place. Returns whether any gene actually changed.
    pub fn mutate(&mut self, params: &Parameters, rng: &mut dyn RngCore) -> bool {
        match self {
            ConditionKind::Hyperrectangle(c) => c.mutate(params, rng),
            ConditionKind::Ellipsoid(c) => c.mutate(params, rng),
            ConditionKind::Ternary(c) => c.mutate(params, rng),
            ConditionKind::Neural(c) => c.mutate(params, rng),
            ConditionKind::GpTree(c) => c.mutate(params, rng),
            ConditionKind::Dgp(c) => c.mutate(params, rng),
            ConditionKind::Dummy(c) => c.mutate(params, rng),
        }
    }

    /// Uniform crossover between two same-variant conditions. No-op across
    /// mismatched variants (should not occur: the EA only crosses
    /// classifiers sharing the same condition variant by construction).
    pub fn crossover(&mut self, other: &mut Self, rng: &mut dyn RngCore) -> bool {
        match (self, other) {
            (ConditionKind::Hyperrectangle(a), ConditionKind::Hyperrectangle(b)) => {
                a.crossover(b, rng)
            }
            (ConditionKind::Ellipsoid(a), ConditionKind::Ellipsoid(b)) => a.crossover(b, rng),
            (ConditionKind::Ternary(a), ConditionKind::Ternary(b)) => a.crossover(b, rng),
            _ => false,
        }
    }

    /// Fraction of the input space this condition covers; used by fitness
    /// reporting and by tests, never by the EA itself.
    pub fn generality(&self) -> f64 {
        match self {
            ConditionKind::Hyperrectangle(c) => c.generality(),
            ConditionKind::Ellipsoid(c) => c.generality(),
            ConditionKind::Ternary(c) => c.generality(),
            ConditionKind::Neural(c) => c.generality(),
            ConditionKind::GpTree(c) => c.generality(),
            ConditionKind::Dgp(c) => c.generality(),
            ConditionKind::Dummy(c) => c.generality(),
        }
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
    fn dummy_always_matches() {
        let p = params();
        let mut rng = StdRng::seed_from_u64(1);
        let x = Array1::from(vec![0.3, 0.9]);
        let c = ConditionKind::Dummy(DummyCondition::cover(&x, &p, &mut rng));
        assert!(c.matches(&x));
        assert!(c.matches(&Array1::from(vec![-5.0, 5.0])));
    }

    #[test]
    fn hyperrectangle_covers_its_center() {
        let p = params();
        let mut rng = StdRng::seed_from_u64(2);
        let x = Array1::from(vec![0.3, 0.9]);
        let c = ConditionKind::Hyperrectangle(HyperrectangleCondition::cover(&x, &p, &mut rng));
        assert!(c.matches(&x));
    }
}
