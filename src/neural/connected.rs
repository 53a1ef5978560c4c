//! Fully-connected layer with manual forward/backward/update, following the
//! shape of `felipe-santos-gran-prix`'s `Linear` layer (weights + biases +
//! accumulated gradients, no autograd).

use ndarray::{Array1, Array2};
use rand::{Rng, RngCore};
use rand_distr::{Distribution, StandardNormal};

use super::activation::Activation;
use super::Layer;

#[derive(Debug, Clone)]
pub struct ConnectedLayer {
    pub weights: Array2<f64>,
    pub biases: Array1<f64>,
    pub activation: Activation,

    grad_weights: Array2<f64>,
    grad_biases: Array1<f64>,
    last_input: Array1<f64>,
    last_output: Array1<f64>,
}

impl ConnectedLayer {
    pub fn new(
        input_dim: usize,
        output_dim: usize,
        activation: Activation,
        rng: &mut dyn RngCore,
    ) -> Self {
        let scale = (1.0 / input_dim.max(1) as f64).sqrt();
        let weights = Array2::from_shape_fn((output_dim, input_dim), |_| {
            StandardNormal.sample(&mut SmallRngAdapter(rng)) * scale
        });
        let biases = Array1::zeros(output_dim);
        Self {
            grad_weights: Array2::zeros((output_dim, input_dim)),
            grad_biases: Array1::zeros(output_dim),
            last_input: Array1::zeros(input_dim),
            last_output: Array1::zeros(output_dim),
            weights,
            biases,
            activation,
        }
    }
}

impl Layer for ConnectedLayer {
    fn forward(&mut self, input: &Array1<f64>) -> Array1<f64> {
        self.last_input = input.clone();
        let z = self.weights.dot(input) + &self.biases;
        let a = z.mapv(|zi| self.activation.apply(zi));
        self.last_output = a.clone();
        a
    }

    fn backward(&mut self, grad_output: &Array1<f64>) -> Array1<f64> {
        let delta: Array1<f64> = grad_output
            .iter()
            .zip(self.last_output.iter())
            .map(|(&g, &a)| g * self.activation.derivative_from_output(a))
            .collect();
        let grad_input = self.weights.t().dot(&delta);
        for i in 0..self.weights.nrows() {
            for j in 0..self.weights.ncols() {
                self.grad_weights[[i, j]] += delta[i] * self.last_input[j];
            }
        }
        self.grad_biases += &delta;
        grad_input
    }

    fn update(&mut self, learning_rate: f64) {
        self.weights.scaled_add(-learning_rate, &self.grad_weights);
        self.biases.scaled_add(-learning_rate, &self.grad_biases);
        self.grad_weights.fill(0.0);
        self.grad_biases.fill(0.0);
    }

    fn output_dim(&self) -> usize {
        self.biases.len()
    }

    fn mutate(&mut self, rate: f64, sigma: f64, rng: &mut dyn RngCore) -> bool {
        let mut changed = false;
        for w in self.weights.iter_mut() {
            if rng.random_bool(rate) {
                *w += StandardNormal.sample(&mut SmallRngAdapter(rng)) * sigma;
                changed = true;
            }
        }
        for b in self.biases.iter_mut() {
            if rng.random_bool(rate) {
                *b += StandardNormal.sample(&mut SmallRngAdapter(rng)) * sigma;
                changed = true;
            }
        }
        changed
    }
}

/// Bridges a `&mut dyn RngCore` to the `rand_distr::Distribution` sampling
/// API, which wants an `impl Rng` value rather than a trait object.
struct SmallRngAdapter<'a>(&'a mut dyn RngCore);

impl<'a> rand::RngCore for SmallRngAdapter<'a> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }
    fn fill_bytes(&mut self, dst: &mut [u8]) {
        self.0.fill_bytes(dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn forward_backward_shapes_match() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut layer = ConnectedLayer::new(3, 2, Activation::Tanh, &mut rng);
        let input = Array1::from(vec![0.5, -0.2, 0.1]);
        let out = layer.forward(&input);
        assert_eq!(out.len(), 2);
        let grad_in = layer.backward(&Array1::from(vec![1.0, -1.0]));
        assert_eq!(grad_in.len(), 3);
        layer.update(0.01);
    }

    #[test]
    fn update_moves_weights() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut layer = ConnectedLayer::new(2, 1, Activation::Linear, &mut rng);
        let before = layer.weights.clone();
        layer.forward(&Array1::from(vec![1.0, 1.0]));
        layer.backward(&Array1::from(vec![1.0]));
        layer.update(0.5);
        assert_ne!(before, layer.weights);
    }
}
