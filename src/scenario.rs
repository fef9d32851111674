use crate::{
    network::Network,
    population::{Client, Population},
};
use core::ops::ControlFlow;
use rand::Rng;

/// A view of a population after it's been scored, handed to evolution hooks
pub struct Stats<'a> {
    pub generation: usize,
    pub population: &'a Population,
}

impl Stats<'_> {
    pub fn fittest(&self) -> Option<&Client> {
        self.population.fittest()
    }

    pub fn any_fitter_than(&self, target: f64) -> bool {
        self.population.clients().iter().any(|c| c.score >= target)
    }

    pub fn species(&self) -> usize {
        self.population.species().len()
    }
}

pub enum EvolutionTarget {
    Fitness(f64),
    Generation(usize),
}

impl EvolutionTarget {
    pub fn satisfied(&self, stats: &Stats) -> bool {
        match self {
            Self::Fitness(t) => stats.any_fitter_than(*t),
            Self::Generation(t) => *t <= stats.generation,
        }
    }
}

pub trait Scenario {
    /// Inputs and outputs of the networks this scenario evaluates
    fn io() -> (usize, usize);

    fn eval(&self, network: &mut impl Network) -> f64;

    /// Alternate scoring every client and evolving `population` until `target` is met or
    /// `hook` breaks, returning the generation reached. Panics if the population's
    /// registry wasn't built for [Scenario::io]
    fn evolve(
        &self,
        target: EvolutionTarget,
        population: &mut Population,
        rng: &mut impl Rng,
        mut hook: impl FnMut(&Stats) -> ControlFlow<()>,
    ) -> usize
    where
        Self: Sync + Sized,
    {
        let io = Self::io();
        let registry = population.registry();
        assert_eq!(
            io,
            (registry.inputs(), registry.outputs()),
            "scenario io {io:?} doesn't fit a population of {} inputs and {} outputs",
            registry.inputs(),
            registry.outputs()
        );

        loop {
            population.evaluate(|client| self.eval(client.network()));

            let stats = Stats {
                generation: population.generation(),
                population,
            };
            if hook(&stats).is_break() || target.satisfied(&stats) {
                break stats.generation;
            }

            population.evolve(rng);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{config::Properties, network::loss, random::WyRng};
    use rand::SeedableRng;

    /// Rewards a high first output for any input
    struct High;

    impl Scenario for High {
        fn io() -> (usize, usize) {
            (2, 1)
        }

        fn eval(&self, network: &mut impl Network) -> f64 {
            loss::decay_quadratic(1., network.activate(&[1., 1.])[0])
        }
    }

    struct Wide;

    impl Scenario for Wide {
        fn io() -> (usize, usize) {
            (3, 1)
        }

        fn eval(&self, _: &mut impl Network) -> f64 {
            0.
        }
    }

    #[test]
    fn test_generation_target() {
        let mut rng = WyRng::seed_from_u64(61);
        let mut population = Population::new(Properties::default(), 2, 1, 30).unwrap();
        let mut seen = vec![];
        let reached = High.evolve(
            EvolutionTarget::Generation(5),
            &mut population,
            &mut rng,
            |stats| {
                seen.push(stats.generation);
                assert!(stats.species() > 0 || stats.generation == 0);
                ControlFlow::Continue(())
            },
        );
        assert_eq!(reached, 5);
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(population.generation(), 5);
    }

    #[test]
    fn test_fitness_target() {
        let mut rng = WyRng::seed_from_u64(62);
        let mut population = Population::new(Properties::default(), 2, 1, 10).unwrap();
        // an unconnected network always answers 0.5, which scores 0.75
        let reached = High.evolve(
            EvolutionTarget::Fitness(0.5),
            &mut population,
            &mut rng,
            |_| ControlFlow::Continue(()),
        );
        assert_eq!(reached, 0);
        assert!(population.fittest().unwrap().score >= 0.75);
    }

    #[test]
    fn test_hook_breaks() {
        let mut rng = WyRng::seed_from_u64(63);
        let mut population = Population::new(Properties::default(), 2, 1, 10).unwrap();
        let reached = High.evolve(
            EvolutionTarget::Fitness(2.),
            &mut population,
            &mut rng,
            |stats| {
                if stats.generation == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );
        assert_eq!(reached, 3);

        let stats = Stats {
            generation: population.generation(),
            population: &population,
        };
        assert!(stats.fittest().is_some_and(|c| c.score > 0.));
        assert!(!stats.any_fitter_than(1.));
    }

    #[test]
    #[should_panic(expected = "scenario io (3, 1) doesn't fit a population of 2 inputs and 1 outputs")]
    fn test_io_mismatch() {
        let mut population = Population::new(Properties::default(), 2, 1, 10).unwrap();
        Wide.evolve(
            EvolutionTarget::Generation(1),
            &mut population,
            &mut WyRng::seed_from_u64(0),
            |_| ControlFlow::Continue(()),
        );
    }
}
