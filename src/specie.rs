//! Species: clusters of clients within a genetic distance of a shared representative.
//! Members are indices into the population's clients.

use crate::{
    config::Properties,
    crossover::{crossover, distance},
    genome::Genome,
    population::Client,
    registry::Registry,
};
use rand::{seq::IndexedRandom, Rng};

/// Two distinct indices below `len` drawn uniformly, or None with fewer than 2 to pick from
#[inline]
fn uniq_2(len: usize, rng: &mut impl Rng) -> Option<(usize, usize)> {
    if len < 2 {
        return None;
    }

    let l = rng.random_range(0..len);
    let r = rng.random_range(0..len - 1);
    Some((l, if r >= l { r + 1 } else { r }))
}

#[derive(Debug, Clone)]
pub struct Specie {
    base: usize,
    members: Vec<usize>,
    score: f64,
}

impl Specie {
    /// A specie of just `base`
    pub fn new(base: usize) -> Self {
        Self {
            base,
            members: vec![base],
            score: 0.,
        }
    }

    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    #[inline]
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Average member fitness as of the last [Specie::evaluate], never below 0
    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether `genome` is close enough to this specie's base to join it
    pub fn matches(&self, genome: &Genome, clients: &[Client], properties: &Properties) -> bool {
        distance(clients[self.base].genome(), genome, properties) < properties.species_distance
    }

    /// Add a member without checking its distance
    pub fn put(&mut self, client: usize) {
        self.members.push(client);
    }

    pub fn evaluate(&mut self, clients: &[Client]) {
        self.score = if self.members.is_empty() {
            0.
        } else {
            let total = self.members.iter().map(|m| clients[*m].score).sum::<f64>();
            (total / self.members.len() as f64).max(0.)
        };
    }

    /// Drop the lowest scoring `floor((1 - survival) * len)` members, returning them.
    /// Members left are ordered by ascending score
    pub fn truncate(&mut self, survival: f64, clients: &[Client]) -> Vec<usize> {
        self.members
            .sort_by(|l, r| clients[*l].score.total_cmp(&clients[*r].score));
        let cut = ((1. - survival) * self.members.len() as f64).floor() as usize;
        self.members.drain(..cut.min(self.members.len())).collect()
    }

    /// Remove every member, returning them
    pub fn extinguish(&mut self) -> Vec<usize> {
        self.score = 0.;
        core::mem::take(&mut self.members)
    }

    /// Keep one random member as the new base, and only that member
    pub fn reset(&mut self, rng: &mut impl Rng) {
        if let Some(base) = self.members.choose(rng) {
            self.base = *base;
        }
        self.members = vec![self.base];
        self.score = 0.;
    }

    /// A child of two distinct random members, the fitter one dominant. A lone member is
    /// crossed with itself. Panics with no members
    pub fn breed(&self, clients: &[Client], registry: &Registry, rng: &mut impl Rng) -> Genome {
        assert!(!self.is_empty(), "can't breed from an empty specie");

        let (l, r) = match uniq_2(self.members.len(), rng) {
            Some((l, r)) => (&clients[self.members[l]], &clients[self.members[r]]),
            None => (&clients[self.members[0]], &clients[self.members[0]]),
        };
        let (dominant, other) = if r.score > l.score { (r, l) } else { (l, r) };
        crossover(dominant.genome(), other.genome(), registry, rng)
    }
}
