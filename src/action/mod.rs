//! Action capability: selects which of the `n_actions` discrete actions a
//! classifier advocates. Closed enum dispatch, mirroring
//! [`crate::condition::ConditionKind`].

pub mod integer;
pub mod neural;

use rand::RngCore;

use crate::params::Parameters;
use integer::IntegerAction;
use neural::NeuralAction;

#[derive(Debug, Clone)]
pub enum ActionKind {
    Integer(IntegerAction),
    Neural(NeuralAction),
}

impl ActionKind {
    pub fn action(&self) -> usize {
        match self {
            ActionKind::Integer(a) => a.action,
            ActionKind::Neural(a) => a.action(),
        }
    }

    pub fn cover_like(&self, params: &Parameters, rng: &mut dyn RngCore) -> Self {
        match self {
            ActionKind::Integer(_) => ActionKind::Integer(IntegerAction::cover(params, rng)),
            ActionKind::Neural(_) => ActionKind::Neural(NeuralAction::cover(params, rng)),
        }
    }

    pub fn mutate(&mut self, params: &Parameters, rng: &mut dyn RngCore) -> bool {
        match self {
            ActionKind::Integer(a) => a.mutate(params, rng),
            ActionKind::Neural(a) => a.mutate(params, rng),
        }
    }

    pub fn crossover(&mut self, other: &mut Self, rng: &mut dyn RngCore) -> bool {
        match (self, other) {
            (ActionKind::Integer(a), ActionKind::Integer(b)) => a.crossover(b, rng),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParametersBuilder;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn integer_action_in_range() {
        let p = ParametersBuilder::default()
            .x_dim(1)
            .y_dim(1)
            .n_actions(4)
            .build()
            .unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let a = ActionKind::Integer(IntegerAction::cover(&p, &mut rng));
            assert!(a.action() < 4);
        }
    }
}
