//! Neural condition: a small feed-forward network maps the input to a
//! single sigmoid output; the condition matches when that output exceeds
//! 0.5.

use ndarray::Array1;
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::neural::{Activation, ConnectedLayer, Network};
use crate::params::Parameters;

const HIDDEN_WIDTH: usize = 5;

#[derive(Debug, Clone)]
pub struct NeuralCondition {
    pub net: Network,
}

impl PartialEq for NeuralCondition {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

impl NeuralCondition {
    pub fn matches(&self, x: &Array1<f64>) -> bool {
        let mut net = self.net.clone();
        net.forward(x)[0] > 0.5
    }

    pub fn cover(x: &Array1<f64>, _params: &Parameters, rng: &mut dyn RngCore) -> Self {
        let mut seed_rng = StdRng::seed_from_u64(rng.next_u64());
        let net = Network::new(vec![
            ConnectedLayer::new(x.len(), HIDDEN_WIDTH, Activation::Tanh, &mut seed_rng),
            ConnectedLayer::new(HIDDEN_WIDTH, 1, Activation::Sigmoid, &mut seed_rng),
        ]);
        let mut cond = Self { net };
        // nudge the network so it matches its own covering point: one
        // gradient step toward output 1.0 at x.
        let out = cond.net.forward(x);
        let grad = Array1::from(vec![out[0] - 1.0]);
        cond.net.backward(&grad);
        cond.net.update(0.5);
        cond
    }

    pub fn mutate(&mut self, params: &Parameters, rng: &mut dyn RngCore) -> bool {
        self.net.mutate(params.mutation_rate, params.cond_spread * 0.1, rng)
    }

    pub fn generality(&self) -> f64 {
        // No closed form for a neural boundary's covered volume; report a
        // neutral constant so population-level generality averages aren't
        // skewed to zero by this variant.
        0.5
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
    fn covering_matches_its_seed_after_nudge() {
        let p = params();
        let mut rng = StdRng::seed_from_u64(21);
        let x = Array1::from(vec![0.2, -0.4]);
        let c = NeuralCondition::cover(&x, &p, &mut rng);
        assert!(c.matches(&x));
    }
}
