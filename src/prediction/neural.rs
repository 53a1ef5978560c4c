//! Neural prediction: a small feed-forward network maps the input
//! directly to the `y_dim`-length payoff vector, trained online by one SGD
//! step of squared-error backprop per update.

use ndarray::Array1;
use rand::RngCore;

use crate::neural::{Activation, ConnectedLayer, Network};
use crate::params::Parameters;

const HIDDEN_WIDTH: usize = 6;

#[derive(Debug, Clone)]
pub struct NeuralPrediction {
    pub net: Network,
}

impl PartialEq for NeuralPrediction {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

impl NeuralPrediction {
    pub fn new(params: &Parameters, rng: &mut dyn RngCore) -> Self {
        let net = Network::new(vec![
            ConnectedLayer::new(params.x_dim, HIDDEN_WIDTH, Activation::Tanh, rng),
            ConnectedLayer::new(HIDDEN_WIDTH, params.y_dim, Activation::Linear, rng),
        ]);
        Self { net }
    }

    pub fn predict(&self, x: &Array1<f64>) -> Array1<f64> {
        let mut net = self.net.clone();
        net.forward(x)
    }

    pub fn update(&mut self, x: &Array1<f64>, target: &Array1<f64>, params: &Parameters) {
        let out = self.net.forward(x);
        let grad: Array1<f64> = out
            .iter()
            .zip(target.iter())
            .map(|(&o, &t)| o - t)
            .collect();
        self.net.backward(&grad);
        self.net.update(params.beta);
    }

    pub fn mutate(&mut self, params: &Parameters, rng: &mut dyn RngCore) -> bool {
        self.net.mutate(params.mutation_rate, 0.1, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParametersBuilder;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn training_reduces_error() {
        let p = ParametersBuilder::default()
            .x_dim(1)
            .y_dim(1)
            .n_actions(1)
            .beta(0.05)
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(17);
        let mut pred = NeuralPrediction::new(&p, &mut rng);
        let x = Array1::from(vec![0.5]);
        let target = Array1::from(vec![1.0]);
        let before = (pred.predict(&x)[0] - 1.0).abs();
        for _ in 0..500 {
            pred.update(&x, &target, &p);
        }
        let after = (pred.predict(&x)[0] - 1.0).abs();
        assert!(after < before);
    }
}
