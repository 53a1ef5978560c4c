//! Plain integer action: the classifier advocates one fixed discrete
//! action index in `[0, n_actions)`.

use rand::{Rng, RngCore};

use crate::params::Parameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerAction {
    pub action: usize,
}

impl IntegerAction {
    pub fn cover(params: &Parameters, rng: &mut dyn RngCore) -> Self {
        Self {
            action: rng.random_range(0..params.n_actions.max(1)),
        }
    }

    pub fn mutate(&mut self, params: &Parameters, rng: &mut dyn RngCore) -> bool {
        if rng.random_bool(params.mutation_rate) && params.n_actions > 1 {
            let mut new_action = rng.random_range(0..params.n_actions);
            while new_action == self.action {
                new_action = rng.random_range(0..params.n_actions);
            }
            self.action = new_action;
            true
        } else {
            false
        }
    }

    pub fn crossover(&mut self, other: &mut Self, rng: &mut dyn RngCore) -> bool {
        if rng.random_bool(0.5) {
            std::mem::swap(&mut self.action, &mut other.action);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParametersBuilder;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn mutate_always_picks_a_different_action() {
        let p = ParametersBuilder::default()
            .x_dim(1)
            .y_dim(1)
            .n_actions(3)
            .mutation_rate(1.0)
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let mut a = IntegerAction { action: 0 };
        for _ in 0..10 {
            let before = a.action;
            a.mutate(&p, &mut rng);
            assert_ne!(before, a.action);
        }
    }
}
