//! Minimal neural substrate shared by the neural condition/action/prediction
//! variants. A `Network` is a stack of [`Layer`]s, each responsible for its
//! own forward pass, backward pass, and in-place weight update — manual
//! backprop, no autograd graph, following the pattern in
//! `felipe-santos-gran-prix`'s `Linear` layer.

pub mod activation;
pub mod connected;

use ndarray::Array1;

pub use activation::Activation;
pub use connected::ConnectedLayer;

/// One layer of a feed-forward network.
pub trait Layer: std::fmt::Debug {
    /// Compute this layer's output for `input`, caching whatever is needed
    /// for `backward`.
    fn forward(&mut self, input: &Array1<f64>) -> Array1<f64>;

    /// Given the gradient of the loss with respect to this layer's output,
    /// return the gradient with respect to its input and accumulate
    /// gradients with respect to its own parameters.
    fn backward(&mut self, grad_output: &Array1<f64>) -> Array1<f64>;

    /// Apply one SGD step using the gradients accumulated since the last
    /// call, then clear them.
    fn update(&mut self, learning_rate: f64);

    fn output_dim(&self) -> usize;

    fn mutate(&mut self, rate: f64, sigma: f64, rng: &mut dyn rand::RngCore) -> bool;
}

/// A simple feed-forward stack, used as the shared substrate for neural
/// conditions, actions and predictions.
#[derive(Debug, Clone)]
pub struct Network {
    pub layers: Vec<ConnectedLayer>,
}

impl Network {
    pub fn new(layers: Vec<ConnectedLayer>) -> Self {
        assert!(!layers.is_empty(), "a network needs at least one layer");
        Self { layers }
    }

    pub fn forward(&mut self, input: &Array1<f64>) -> Array1<f64> {
        let mut out = input.clone();
        for layer in self.layers.iter_mut() {
            out = layer.forward(&out);
        }
        out
    }

    pub fn backward(&mut self, grad_output: &Array1<f64>) -> Array1<f64> {
        let mut grad = grad_output.clone();
        for layer in self.layers.iter_mut().rev() {
            grad = layer.backward(&grad);
        }
        grad
    }

    pub fn update(&mut self, learning_rate: f64) {
        for layer in self.layers.iter_mut() {
            layer.update(learning_rate);
        }
    }

    pub fn output_dim(&self) -> usize {
        self.layers.last().expect("non-empty network").output_dim()
    }

    pub fn mutate(&mut self, rate: f64, sigma: f64, rng: &mut dyn rand::RngCore) -> bool {
        self.layers
            .iter_mut()
            .fold(false, |acc, l| l.mutate(rate, sigma, rng) || acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn forward_produces_expected_shape() {
        let mut net = Network::new(vec![
            ConnectedLayer::new(3, 4, Activation::Relu, &mut StdRng::seed_from_u64(1)),
            ConnectedLayer::new(4, 1, Activation::Linear, &mut StdRng::seed_from_u64(2)),
        ]);
        let out = net.forward(&Array1::from(vec![0.1, 0.2, 0.3]));
        assert_eq!(out.len(), 1);
    }
}
