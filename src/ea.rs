//! Steady-state evolutionary algorithm: triggered per action set once its
//! average time since last EA exceeds `theta_ea`, it selects two parents,
//! crosses and mutates them into offspring, optionally subsumes the
//! offspring into an accurate-enough parent, and inserts the result back
//! into the population under the usual capacity cap.

use rand::RngCore;

use crate::classifier::Classifier;
use crate::params::{EaSelectType, Parameters};
use crate::population::Population;
use crate::set::Set;

/// Average time stamp (weighted by numerosity) of an action set's members.
fn mean_time_stamp(population: &Population, set: &Set) -> f64 {
    let num_sum: u64 = set.num_sum(population);
    if num_sum == 0 {
        return 0.0;
    }
    let total: f64 = set
        .indices
        .iter()
        .map(|&i| {
            let cl = &population.classifiers[i];
            cl.time_stamp as f64 * cl.numerosity as f64
        })
        .sum();
    total / num_sum as f64
}

/// Should the EA fire for this action set at `current_time`?
pub fn should_run(population: &Population, set: &Set, current_time: u64, params: &Parameters) -> bool {
    !set.is_empty() && current_time as f64 - mean_time_stamp(population, set) > params.theta_ea
}

/// Select one parent index (into `population.classifiers`) from `set`,
/// per `params.ea_select_type`.
fn select_parent(
    population: &Population,
    set: &Set,
    params: &Parameters,
    rng: &mut dyn RngCore,
) -> usize {
    match params.ea_select_type {
        EaSelectType::RouletteWheel => {
            let total: f64 = set
                .indices
                .iter()
                .map(|&i| population.classifiers[i].fitness.max(1e-12))
                .sum();
            let mut target = rng.next_u64() as f64 / u64::MAX as f64 * total;
            for &i in &set.indices {
                let w = population.classifiers[i].fitness.max(1e-12);
                if target <= w {
                    return i;
                }
                target -= w;
            }
            *set.indices.last().unwrap()
        }
        EaSelectType::Tournament => {
            let tournament_size = ((params.ea_select_size * set.len() as f64).ceil() as usize).max(1);
            let mut best = set.indices[(rng.next_u64() as usize) % set.len()];
            for _ in 1..tournament_size {
                let candidate = set.indices[(rng.next_u64() as usize) % set.len()];
                if population.classifiers[candidate].fitness > population.classifiers[best].fitness {
                    best = candidate;
                }
            }
            best
        }
    }
}

/// Run the EA once, inserting up to `params.lambda` offspring derived from
/// two parents selected out of `set`. Returns the number of offspring
/// inserted.
pub fn run(
    population: &mut Population,
    set: &Set,
    current_time: u64,
    params: &Parameters,
    rng: &mut dyn RngCore,
) -> usize {
    if set.is_empty() {
        return 0;
    }
    let p1_idx = select_parent(population, set, params, rng);
    let p2_idx = select_parent(population, set, params, rng);

    let mut offspring: Vec<Classifier> = Vec::new();
    for _ in 0..params.lambda.max(1) {
        let mut child1 = population.classifiers[p1_idx].clone();
        let mut child2 = population.classifiers[p2_idx].clone();
        child1.numerosity = 1;
        child2.numerosity = 1;
        child1.experience = 0;
        child2.experience = 0;
        child1.time_stamp = current_time;
        child2.time_stamp = current_time;
        child1.age = current_time;
        child2.age = current_time;

        let mut changed = false;
        if rng.random_bool_adapter(params.p_crossover) {
            changed |= child1.condition.crossover(&mut child2.condition, rng);
            changed |= child1.action.crossover(&mut child2.action, rng);
            changed |= child1.prediction.crossover(&mut child2.prediction, rng);
        }
        changed |= child1.condition.mutate(params, rng);
        changed |= child2.condition.mutate(params, rng);
        changed |= child1.action.mutate(params, rng);
        changed |= child2.action.mutate(params, rng);
        changed |= child1.prediction.mutate(params, rng);
        changed |= child2.prediction.mutate(params, rng);

        if changed {
            let avg_error =
                (population.classifiers[p1_idx].error + population.classifiers[p2_idx].error) / 2.0 * 0.1;
            let avg_fitness =
                (population.classifiers[p1_idx].fitness + population.classifiers[p2_idx].fitness) / 2.0 * 0.1;
            child1.error = avg_error;
            child2.error = avg_error;
            child1.fitness = avg_fitness;
            child2.fitness = avg_fitness;
        }

        offspring.push(child1);
        offspring.push(child2);
    }
    offspring.truncate(params.lambda.max(1));

    let mut inserted = 0;
    for child in offspring {
        insert_with_subsumption(population, set, child, params);
        inserted += 1;
    }
    population.enforce_cap(params, rng);
    inserted
}

/// Insert `child` into the population, first checking whether either EA
/// parent set member can subsume it (per `do_ga_subsumption`); if so the
/// subsuming classifier's numerosity is bumped instead of growing the
/// population with a near-duplicate rule.
fn insert_with_subsumption(population: &mut Population, set: &Set, child: Classifier, params: &Parameters) {
    if params.do_ga_subsumption {
        for &i in &set.indices {
            if population.classifiers[i].subsumes(&child, params) {
                population.classifiers[i].numerosity += 1;
                return;
            }
        }
    }
    population.insert(child);
}

/// `rand`'s `Rng::random_bool` isn't available on `&mut dyn RngCore`
/// directly; this local extension keeps the EA code free of the
/// `RandomGenerator` facade's associated type while still reading as a
/// plain Bernoulli draw.
trait DynRngExt {
    fn random_bool_adapter(&mut self, p: f64) -> bool;
}

impl DynRngExt for dyn RngCore + '_ {
    fn random_bool_adapter(&mut self, p: f64) -> bool {
        use rand::Rng;
        struct Adapter<'a>(&'a mut dyn RngCore);
        impl<'a> RngCore for Adapter<'a> {
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
        Adapter(self).random_bool(p.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::integer::IntegerAction;
    use crate::action::ActionKind;
    use crate::condition::hyperrectangle::HyperrectangleCondition;
    use crate::condition::ConditionKind;
    use crate::params::ParametersBuilder;
    use crate::prediction::constant::ConstantPrediction;
    use crate::prediction::PredictionKind;
    use ndarray::Array1;
    use rand::{rngs::StdRng, SeedableRng};

    fn params() -> Parameters {
        ParametersBuilder::default()
            .x_dim(2)
            .y_dim(1)
            .n_actions(1)
            .theta_ea(1.0)
            .lambda(2)
            .build()
            .unwrap()
    }

    fn cl(p: &Parameters) -> Classifier {
        Classifier {
            condition: ConditionKind::Hyperrectangle(HyperrectangleCondition {
                lower: Array1::from(vec![-1.0, -1.0]),
                upper: Array1::from(vec![1.0, 1.0]),
            }),
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
    fn should_run_fires_after_threshold() {
        let p = params();
        let mut pop = Population::new();
        pop.insert(cl(&p));
        let set = Set { indices: vec![0] };
        assert!(!should_run(&pop, &set, 0, &p));
        assert!(should_run(&pop, &set, 10, &p));
    }

    #[test]
    fn run_inserts_offspring_and_respects_cap() {
        let p = ParametersBuilder::default()
            .x_dim(2)
            .y_dim(1)
            .n_actions(1)
            .pop_size(3)
            .lambda(2)
            .build()
            .unwrap();
        let mut pop = Population::new();
        pop.insert(cl(&p));
        pop.insert(cl(&p));
        let set = Set { indices: vec![0, 1] };
        let mut rng = StdRng::seed_from_u64(5);
        run(&mut pop, &set, 100, &p, &mut rng);
        assert!(pop.num_sum() <= p.pop_size as u64);
    }
}
