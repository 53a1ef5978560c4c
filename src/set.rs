//! Classifier-set algebra: the match set `M`, action sets carved out of it,
//! and the relative-accuracy fitness update shared by every classifier in
//! an action set.

use ndarray::Array1;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::classifier::Classifier;
use crate::params::Parameters;
use crate::population::Population;

/// A set of classifiers, represented as indices into a [`Population`].
#[derive(Debug, Clone, Default)]
pub struct Set {
    pub indices: Vec<usize>,
}

impl Set {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn num_sum(&self, population: &Population) -> u64 {
        self.indices
            .iter()
            .map(|&i| population.classifiers[i].numerosity)
            .sum()
    }

    /// Build the match set: every population member whose condition
    /// matches `x`.
    pub fn build_match(population: &Population, x: &Array1<f64>) -> Self {
        #[cfg(feature = "parallel")]
        let indices: Vec<usize> = population
            .classifiers
            .par_iter()
            .enumerate()
            .filter(|(_, c)| c.matches(x))
            .map(|(i, _)| i)
            .collect();
        #[cfg(not(feature = "parallel"))]
        let indices: Vec<usize> = population
            .classifiers
            .iter()
            .enumerate()
            .filter(|(_, c)| c.matches(x))
            .map(|(i, _)| i)
            .collect();
        Self { indices }
    }

    /// Narrow a match set down to the members advocating `action`.
    pub fn build_action(&self, population: &Population, action: usize) -> Self {
        let indices = self
            .indices
            .iter()
            .copied()
            .filter(|&i| population.classifiers[i].action.action() == action)
            .collect();
        Self { indices }
    }

    /// Run each classifier's per-trial update, then recompute fitness for
    /// the whole set from relative accuracy (each member's share of the
    /// set's summed accuracy, weighted by numerosity).
    pub fn update(
        &self,
        population: &mut Population,
        x: &Array1<f64>,
        target: &Array1<f64>,
        params: &Parameters,
    ) {
        let set_size = self.num_sum(population) as usize;
        for &i in &self.indices {
            population.classifiers[i].update(x, target, set_size, params);
        }

        let accuracies: Vec<f64> = self
            .indices
            .iter()
            .map(|&i| population.classifiers[i].accuracy(params))
            .collect();
        let total: f64 = self
            .indices
            .iter()
            .zip(accuracies.iter())
            .map(|(&i, &acc)| acc * population.classifiers[i].numerosity as f64)
            .sum();
        if total <= 0.0 {
            return;
        }
        for (&i, &acc) in self.indices.iter().zip(accuracies.iter()) {
            let cl = &mut population.classifiers[i];
            let relative_acc = (acc * cl.numerosity as f64) / total;
            cl.fitness += params.beta * (relative_acc - cl.fitness);
        }

        if params.do_set_subsumption {
            self.subsume(population, params);
        }
    }

    /// Action-set subsumption: the most general classifier eligible to
    /// subsume (experienced and accurate enough) absorbs every other set
    /// member its condition actually subsumes, folding their numerosity
    /// into it. Absorbed members are zeroed, not removed here (removing
    /// them would shift `population.classifiers` and invalidate indices
    /// still held by the caller this trial); the next `kill_sweep` sweeps
    /// them out.
    fn subsume(&self, population: &mut Population, params: &Parameters) {
        if self.indices.len() < 2 {
            return;
        }
        let mut subsumer_idx = None;
        let mut best_generality = f64::NEG_INFINITY;
        for &i in &self.indices {
            let cl = &population.classifiers[i];
            if cl.could_subsume(params) {
                let generality = cl.condition.generality();
                if generality > best_generality {
                    best_generality = generality;
                    subsumer_idx = Some(i);
                }
            }
        }
        let Some(subsumer_idx) = subsumer_idx else {
            return;
        };
        for &i in &self.indices {
            if i == subsumer_idx {
                continue;
            }
            let subsumes = population.classifiers[subsumer_idx].subsumes(&population.classifiers[i], params);
            if subsumes {
                let absorbed = population.classifiers[i].numerosity;
                population.classifiers[subsumer_idx].numerosity += absorbed;
                population.classifiers[i].numerosity = 0;
            }
        }
    }

    /// `Σnum ≤ pop_size` and every index actually lies in `population`;
    /// used by tests and debug assertions, not on the hot path.
    pub fn validate(&self, population: &Population, params: &Parameters) -> bool {
        self.indices.iter().all(|&i| i < population.classifiers.len())
            && self.num_sum(population) <= params.pop_size as u64 * 4
    }

    pub fn classifiers<'a>(&self, population: &'a Population) -> Vec<&'a Classifier> {
        self.indices.iter().map(|&i| &population.classifiers[i]).collect()
    }
}
