pub mod collections;
pub mod config;
pub mod constants;
pub mod crossover;
pub mod genome;
pub mod macros;
pub mod network;
pub mod population;
pub mod random;
pub mod registry;
pub mod scenario;
pub mod specie;

pub use collections::{Keyed, OrderedSet, WeightedSelector};
pub use config::{ConfigError, Properties, Property};
pub use crossover::{crossover, distance};
pub use genome::{ConnectionGene, Genome, Mutation, NodeGene, NodeKind};
pub use network::{activate, FeedForward, Network};
pub use population::{Client, Population};
pub use random::{default_rng, Happens, WyRng};
pub use registry::Registry;
pub use scenario::{EvolutionTarget, Scenario, Stats};
pub use specie::Specie;
