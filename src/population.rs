//! Clients and the generational loop over them.

use crate::{
    collections::WeightedSelector,
    config::{ConfigError, Properties, Property},
    constants::{JOLTEON_POPULATION_MAX, JOLTEON_POPULATION_MIN},
    genome::Genome,
    network::FeedForward,
    registry::Registry,
    specie::Specie,
};
use log::{debug, trace, warn};
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// A member of a population: a genome, its latest fitness, and the specie it belongs to
#[derive(Debug, Clone)]
pub struct Client {
    id: usize,
    genome: Genome,
    pub score: f64,
    species: Option<usize>,
    network: Option<FeedForward>,
}

impl Client {
    pub fn new(id: usize, genome: Genome) -> Self {
        Self {
            id,
            genome,
            score: 0.,
            species: None,
            network: None,
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn genome(&self) -> &Genome {
        &self.genome
    }

    /// Index of this client's specie within [Population::species]
    #[inline]
    pub fn species(&self) -> Option<usize> {
        self.species
    }

    /// This client's network, built on first use after any change to its genome
    pub fn network(&mut self) -> &mut FeedForward {
        self.network.get_or_insert_with(|| self.genome.network())
    }

    /// Replace the genome, forgetting its network and score
    pub fn set_genome(&mut self, genome: Genome) {
        self.genome = genome;
        self.network = None;
        self.score = 0.;
    }

    pub fn mutate(
        &mut self,
        registry: &mut Registry,
        properties: &Properties,
        rng: &mut impl Rng,
    ) -> bool {
        let changed = self.genome.mutate(registry, properties, rng);
        if changed {
            self.network = None;
        }
        changed
    }
}

#[derive(Debug)]
pub struct Population {
    properties: Properties,
    registry: Registry,
    clients: Vec<Client>,
    species: Vec<Specie>,
    generation: usize,
}

impl Population {
    pub fn new(
        properties: Properties,
        inputs: usize,
        outputs: usize,
        size: usize,
    ) -> Result<Self, ConfigError> {
        if !(JOLTEON_POPULATION_MIN..=JOLTEON_POPULATION_MAX).contains(&size) {
            return Err(ConfigError::PopulationSize(size));
        }
        properties.validate()?;
        let registry = Registry::new(inputs, outputs)?;

        let clients = (0..size)
            .map(|id| Client::new(id, Genome::new(&registry)))
            .collect();
        Ok(Self {
            properties,
            registry,
            clients,
            species: Vec::new(),
            generation: 0,
        })
    }

    #[inline]
    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    #[inline]
    pub fn clients_mut(&mut self) -> &mut [Client] {
        &mut self.clients
    }

    pub fn client(&self, id: usize) -> Option<&Client> {
        self.clients.get(id)
    }

    #[inline]
    pub fn species(&self) -> &[Specie] {
        &self.species
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Number of completed calls to [Population::evolve]
    #[inline]
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn set_property(&mut self, property: Property, value: f64) -> Result<(), ConfigError> {
        self.properties.try_set(property, value)
    }

    pub fn fittest(&self) -> Option<&Client> {
        self.clients
            .iter()
            .max_by(|l, r| l.score.total_cmp(&r.score))
    }

    /// Score every client with `f`. Only clients are touched, so this may run in parallel
    pub fn evaluate<F>(&mut self, f: F)
    where
        F: Fn(&mut Client) -> f64 + Sync + Send,
    {
        #[cfg(feature = "parallel")]
        self.clients.par_iter_mut().for_each(|client| {
            client.score = f(client);
        });

        #[cfg(not(feature = "parallel"))]
        self.clients.iter_mut().for_each(|client| {
            client.score = f(client);
        });
    }

    /// Advance one generation: re-speciate, cull, breed replacements, and mutate everyone
    pub fn evolve(&mut self, rng: &mut impl Rng) {
        self.reset_species(rng);
        self.speciate();
        self.evaluate_species();
        self.truncate();
        self.extinguish();
        self.reproduce(rng);
        self.mutate(rng);

        self.generation += 1;
        debug!(
            "generation {}: {} species, best specie score {:.4}, {} nodes and {} connections known",
            self.generation,
            self.species.len(),
            self.species
                .iter()
                .map(Specie::score)
                .fold(0., f64::max),
            self.registry.node_count(),
            self.registry.connection_count(),
        );
    }

    /// Point every member's specie index at its position in the specie list
    fn reindex(&mut self) {
        for (idx, specie) in self.species.iter().enumerate() {
            for member in specie.members() {
                self.clients[*member].species = Some(idx);
            }
        }
    }

    fn reset_species(&mut self, rng: &mut impl Rng) {
        for specie in self.species.iter_mut() {
            specie.reset(rng);
        }
        for client in self.clients.iter_mut() {
            client.species = None;
        }
        self.reindex();
    }

    fn speciate(&mut self) {
        for id in 0..self.clients.len() {
            if self.clients[id].species.is_some() {
                continue;
            }

            let genome = self.clients[id].genome();
            let found = self
                .species
                .iter()
                .position(|specie| specie.matches(genome, &self.clients, &self.properties));
            let idx = match found {
                Some(idx) => {
                    self.species[idx].put(id);
                    idx
                }
                None => {
                    self.species.push(Specie::new(id));
                    trace!("client {id} founds specie {}", self.species.len() - 1);
                    self.species.len() - 1
                }
            };
            self.clients[id].species = Some(idx);
        }
    }

    fn evaluate_species(&mut self) {
        for specie in self.species.iter_mut() {
            specie.evaluate(&self.clients);
        }
    }

    fn truncate(&mut self) {
        for specie in self.species.iter_mut() {
            for id in specie.truncate(self.properties.survival_chance, &self.clients) {
                self.clients[id].species = None;
            }
        }
    }

    /// Drop species of fewer than 2 members. If none are left, keep the best scoring one
    fn extinguish(&mut self) {
        let mut keep = self
            .species
            .iter()
            .map(|specie| specie.len() >= 2)
            .collect::<Vec<_>>();

        if !keep.contains(&true) {
            let best = self
                .species
                .iter()
                .enumerate()
                .filter(|(_, specie)| !specie.is_empty())
                .max_by(|(_, l), (_, r)| l.score().total_cmp(&r.score()))
                .map(|(idx, _)| idx);
            if let Some(idx) = best {
                warn!(
                    "all {} species would go extinct, keeping specie {idx} with score {:.4}",
                    self.species.len(),
                    self.species[idx].score()
                );
                keep[idx] = true;
            }
        }

        let species = core::mem::take(&mut self.species);
        for (idx, (mut specie, keep)) in species.into_iter().zip(keep).enumerate() {
            if keep {
                self.species.push(specie);
            } else {
                trace!("specie {idx} goes extinct with {} members", specie.len());
                for id in specie.extinguish() {
                    self.clients[id].species = None;
                }
            }
        }
        self.reindex();
    }

    /// Give every unassigned client a child of a specie drawn by score
    fn reproduce(&mut self, rng: &mut impl Rng) {
        if self.species.is_empty() {
            return;
        }

        let selector = self
            .species
            .iter()
            .enumerate()
            .map(|(idx, specie)| (idx, specie.score()))
            .collect::<WeightedSelector<_>>();

        for id in 0..self.clients.len() {
            if self.clients[id].species.is_some() {
                continue;
            }

            let idx = *selector.draw(rng);
            let child = self.species[idx].breed(&self.clients, &self.registry, rng);
            self.clients[id].set_genome(child);
            self.species[idx].put(id);
            self.clients[id].species = Some(idx);
        }
    }

    fn mutate(&mut self, rng: &mut impl Rng) {
        for client in self.clients.iter_mut() {
            client.mutate(&mut self.registry, &self.properties, rng);
        }
    }
}
