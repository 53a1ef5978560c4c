//! Always-matching condition, used when the population should degrade to
//! plain function approximation over the whole input space (no
//! partitioning). Also the natural baseline for tests that want to isolate
//! prediction/action behavior from condition matching.

use ndarray::Array1;
use rand::RngCore;

use crate::params::Parameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DummyCondition;

impl DummyCondition {
    pub fn matches(&self, _x: &Array1<f64>) -> bool {
        true
    }

    pub fn cover(_x: &Array1<f64>, _params: &Parameters, _rng: &mut dyn RngCore) -> Self {
        Self
    }

    pub fn mutate(&mut self, _params: &Parameters, _rng: &mut dyn RngCore) -> bool {
        false
    }

    pub fn generality(&self) -> f64 {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_matches() {
        let c = DummyCondition;
        assert!(c.matches(&Array1::from(vec![1e9, -1e9])));
    }

    #[test]
    fn generality_is_maximal() {
        assert_eq!(DummyCondition.generality(), 1.0);
    }
}
