use approx::relative_eq;
use core::ops::ControlFlow;
use jolteon::{
    network::loss, random::default_rng, EvolutionTarget, Network, Population, Properties,
    Scenario, Stats,
};

const POPULATION: usize = 150;

struct Xor;

macro_rules! eval_pair {
    ($pair:expr, $want:expr, ($network:ident $fit:ident)) => {{
        let v = $network.activate(&$pair)[0];
        if relative_eq!(v, $want, epsilon = 0.1) {
            $fit += 1.;
        } else {
            $fit += loss::decay_quadratic($want, v);
        }
    }};
}

impl Scenario for Xor {
    fn io() -> (usize, usize) {
        // the last input is held at 1 as a bias
        (3, 1)
    }

    fn eval(&self, network: &mut impl Network) -> f64 {
        let mut fit = 0.;

        eval_pair!([0., 0., 1.], 0., (network fit));
        eval_pair!([1., 1., 1.], 0., (network fit));
        eval_pair!([1., 0., 1.], 1., (network fit));
        eval_pair!([0., 1., 1.], 1., (network fit));

        fit
    }
}

fn hook(stats: &Stats) -> ControlFlow<()> {
    if stats.generation % 25 == 0 {
        if let Some(fittest) = stats.fittest() {
            println!(
                "fittest of gen {}: {:.4} (of {} species)",
                stats.generation,
                fittest.score,
                stats.species()
            );
        }
    }

    if stats.any_fitter_than(4. - f64::EPSILON) {
        if let Some(fittest) = stats.fittest() {
            println!(
                "target met in gen {}: {:.4} with {} nodes and {} connections",
                stats.generation,
                fittest.score,
                fittest.genome().nodes().len(),
                fittest.genome().connections().len()
            );
        }
        return ControlFlow::Break(());
    }

    ControlFlow::Continue(())
}

fn main() {
    let (inputs, outputs) = Xor::io();
    let mut population = match Population::new(Properties::default(), inputs, outputs, POPULATION)
    {
        Ok(population) => population,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    let generations = Xor.evolve(
        EvolutionTarget::Generation(1_000),
        &mut population,
        &mut default_rng(),
        hook,
    );
    println!("stopped after {generations} generations");
}
