//! Neural action: a small feed-forward network scores every discrete
//! action; the advocated action is the argmax.

use ndarray::Array1;
use rand::{rngs::StdRng, RngCore, SeedableRng};

use crate::neural::{Activation, ConnectedLayer, Network};
use crate::params::Parameters;

const HIDDEN_WIDTH: usize = 4;

#[derive(Debug, Clone)]
pub struct NeuralAction {
    pub net: Network,
}

impl NeuralAction {
    pub fn action(&self) -> usize {
        let mut net = self.net.clone();
        // A constant probe input; the real action score is recomputed by
        // the engine against the actual trial input via `score`.
        let dummy = Array1::zeros(net.layers[0].weights.ncols());
        argmax(&net.forward(&dummy))
    }

    pub fn score(&self, x: &Array1<f64>) -> Array1<f64> {
        let mut net = self.net.clone();
        net.forward(x)
    }

    pub fn cover(params: &Parameters, rng: &mut dyn RngCore) -> Self {
        let mut seed_rng = StdRng::seed_from_u64(rng.next_u64());
        let net = Network::new(vec![
            ConnectedLayer::new(params.x_dim, HIDDEN_WIDTH, Activation::Tanh, &mut seed_rng),
            ConnectedLayer::new(HIDDEN_WIDTH, params.n_actions, Activation::Linear, &mut seed_rng),
        ]);
        Self { net }
    }

    pub fn mutate(&mut self, params: &Parameters, rng: &mut dyn RngCore) -> bool {
        self.net.mutate(params.mutation_rate, 0.1, rng)
    }
}

fn argmax(v: &Array1<f64>) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParametersBuilder;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn action_is_in_range() {
        let p = ParametersBuilder::default()
            .x_dim(3)
            .y_dim(1)
            .n_actions(5)
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(6);
        let a = NeuralAction::cover(&p, &mut rng);
        assert!(a.action() < 5);
    }
}
