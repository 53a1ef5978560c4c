//! Dynamical-GP-graph condition: a small recurrent graph of nodes, each
//! updated as a sigmoid of a weighted sum of its inputs (other node states
//! plus the classifier input), iterated for a fixed number of cycles. The
//! condition matches when node 0's settled state exceeds 0.5.

use ndarray::Array1;
use rand::{Rng, RngCore};

use crate::params::Parameters;

const NUM_NODES: usize = 6;
const CYCLES: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct DgpCondition {
    /// `weights[i][j]` is node `i`'s weight on node `j`'s previous state.
    pub weights: Vec<Vec<f64>>,
    /// `input_weights[i][k]` is node `i`'s weight on input feature `k`.
    pub input_weights: Vec<Vec<f64>>,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl DgpCondition {
    fn settle(&self, x: &Array1<f64>) -> Vec<f64> {
        let mut state = vec![0.5; NUM_NODES];
        for _ in 0..CYCLES {
            let mut next = vec![0.0; NUM_NODES];
            for i in 0..NUM_NODES {
                let mut z = 0.0;
                for (j, &s) in state.iter().enumerate() {
                    z += self.weights[i][j] * s;
                }
                for (k, &xi) in x.iter().enumerate() {
                    if k < self.input_weights[i].len() {
                        z += self.input_weights[i][k] * xi;
                    }
                }
                next[i] = sigmoid(z);
            }
            state = next;
        }
        state
    }

    pub fn matches(&self, x: &Array1<f64>) -> bool {
        self.settle(x)[0] > 0.5
    }

    pub fn cover(x: &Array1<f64>, _params: &Parameters, rng: &mut dyn RngCore) -> Self {
        let weights = (0..NUM_NODES)
            .map(|_| (0..NUM_NODES).map(|_| rng.random_range(-1.0..1.0)).collect())
            .collect();
        let input_weights = (0..NUM_NODES)
            .map(|_| (0..x.len()).map(|_| rng.random_range(-1.0..1.0)).collect())
            .collect();
        let mut cond = Self {
            weights,
            input_weights,
        };
        // bias node 0 toward matching its own seed point.
        let state0 = cond.settle(x)[0];
        let bump = if state0 <= 0.5 { 2.0 } else { 0.0 };
        cond.weights[0][0] += bump;
        cond
    }

    pub fn mutate(&mut self, params: &Parameters, rng: &mut dyn RngCore) -> bool {
        let mut changed = false;
        for row in self.weights.iter_mut() {
            for w in row.iter_mut() {
                if rng.random_bool(params.mutation_rate) {
                    *w += rng.random_range(-0.5..0.5);
                    changed = true;
                }
            }
        }
        for row in self.input_weights.iter_mut() {
            for w in row.iter_mut() {
                if rng.random_bool(params.mutation_rate) {
                    *w += rng.random_range(-0.5..0.5);
                    changed = true;
                }
            }
        }
        changed
    }

    pub fn generality(&self) -> f64 {
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
    fn covering_matches_its_seed() {
        let p = params();
        let mut rng = StdRng::seed_from_u64(13);
        let x = Array1::from(vec![0.4, 0.2]);
        let c = DgpCondition::cover(&x, &p, &mut rng);
        assert!(c.matches(&x));
    }

    #[test]
    fn settle_is_deterministic_given_weights() {
        let c = DgpCondition {
            weights: vec![vec![0.1; NUM_NODES]; NUM_NODES],
            input_weights: vec![vec![0.2; 2]; NUM_NODES],
        };
        let x = Array1::from(vec![0.3, 0.3]);
        assert_eq!(c.settle(&x), c.settle(&x));
    }
}
