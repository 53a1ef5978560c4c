//! The population: a capped multiset of classifiers. Capacity is enforced
//! in terms of summed numerosity (macro-classifiers may each stand for
//! several micro-classifiers), not struct count, following the classic
//! XCS deletion scheme: a roulette wheel weighted by deletion vote, with
//! under-experienced or below-average-fitness classifiers weighted up.

use rand::RngCore;

use crate::classifier::Classifier;
use crate::params::Parameters;

#[derive(Debug, Default)]
pub struct Population {
    pub classifiers: Vec<Classifier>,
}

impl Population {
    pub fn new() -> Self {
        Self {
            classifiers: Vec::new(),
        }
    }

    pub fn num_sum(&self) -> u64 {
        self.classifiers.iter().map(|c| c.numerosity).sum()
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }

    /// Insert a classifier as a new macro-classifier. Unlike the
    /// insertion path in some XCS variants, this does not scan for an
    /// existing identical rule to fold into via numerosity increment;
    /// consolidation instead happens through GA subsumption
    /// ([`crate::ea::insert_with_subsumption`]) and deletion pressure.
    pub fn insert(&mut self, new_cl: Classifier) {
        self.classifiers.push(new_cl);
    }

    fn mean_fitness(&self) -> f64 {
        let num_sum = self.num_sum();
        if num_sum == 0 {
            return 0.0;
        }
        self.classifiers
            .iter()
            .map(|c| c.fitness)
            .sum::<f64>()
            / num_sum as f64
    }

    fn deletion_vote(&self, cl: &Classifier, mean_fitness: f64, params: &Parameters) -> f64 {
        let mut vote = cl.set_size * cl.numerosity as f64;
        if cl.experience as f64 > params.theta_del
            && mean_fitness > 0.0
            && cl.fitness / cl.numerosity as f64 < params.delta * mean_fitness
        {
            vote *= mean_fitness / (cl.fitness / cl.numerosity as f64).max(1e-12);
        }
        vote.max(1e-12)
    }

    /// Remove micro-classifiers one at a time, weighted by deletion vote,
    /// until `num_sum() <= pop_size`. A classifier whose numerosity drops
    /// to zero is physically removed from the vector.
    pub fn enforce_cap(&mut self, params: &Parameters, rng: &mut dyn RngCore) {
        while self.num_sum() > params.pop_size as u64 {
            if self.classifiers.is_empty() {
                break;
            }
            let mean_fitness = self.mean_fitness();
            let votes: Vec<f64> = self
                .classifiers
                .iter()
                .map(|c| self.deletion_vote(c, mean_fitness, params))
                .collect();
            let total: f64 = votes.iter().sum();
            let mut target = rng.next_u64() as f64 / u64::MAX as f64 * total;
            let mut chosen = votes.len() - 1;
            for (i, v) in votes.iter().enumerate() {
                if target <= *v {
                    chosen = i;
                    break;
                }
                target -= v;
            }
            self.classifiers[chosen].numerosity -= 1;
            if self.classifiers[chosen].numerosity == 0 {
                self.classifiers.remove(chosen);
            }
        }
    }

    /// Remove every classifier with zero numerosity (defensive sweep; in
    /// normal operation `enforce_cap` already removes these immediately).
    pub fn kill_sweep(&mut self) {
        self.classifiers.retain(|c| c.numerosity > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::integer::IntegerAction;
    use crate::action::ActionKind;
    use crate::condition::dummy::DummyCondition;
    use crate::condition::ConditionKind;
    use crate::params::ParametersBuilder;
    use crate::prediction::constant::ConstantPrediction;
    use crate::prediction::PredictionKind;
    use rand::{rngs::StdRng, SeedableRng};

    fn params(pop_size: usize) -> Parameters {
        ParametersBuilder::default()
            .x_dim(1)
            .y_dim(1)
            .n_actions(1)
            .pop_size(pop_size)
            .build()
            .unwrap()
    }

    fn dummy_cl(p: &Parameters) -> Classifier {
        Classifier {
            condition: ConditionKind::Dummy(DummyCondition),
            action: ActionKind::Integer(IntegerAction { action: 0 }),
            prediction: PredictionKind::Constant(ConstantPrediction::new(p)),
            error: p.init_error,
            fitness: p.init_fitness,
            numerosity: 1,
            experience: 0,
            set_size: 1.0,
            time_stamp: 0,
            age: 0,
        }
    }

    #[test]
    fn enforce_cap_respects_pop_size() {
        let p = params(5);
        let mut pop = Population::new();
        for _ in 0..20 {
            pop.insert(dummy_cl(&p));
        }
        let mut rng = StdRng::seed_from_u64(1);
        pop.enforce_cap(&p, &mut rng);
        assert!(pop.num_sum() <= p.pop_size as u64);
    }

    #[test]
    fn kill_sweep_removes_zero_numerosity() {
        let p = params(100);
        let mut pop = Population::new();
        let mut cl = dummy_cl(&p);
        cl.numerosity = 0;
        pop.insert(cl);
        pop.insert(dummy_cl(&p));
        pop.kill_sweep();
        assert_eq!(pop.len(), 1);
    }
}
