//! Structural and parametric mutation of a [Genome].

use super::{connection_key, ConnectionGene, Genome, NodeKind};
use crate::{
    collections::Keyed,
    config::{Properties, Property},
    constants::*,
    random::Happens,
    registry::Registry,
};
use log::trace;
use rand::Rng;
use rand_distr::Open01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    AddLink,
    AddNode,
    RandomWeight,
    WeightShift,
    ToggleLink,
    RemoveNode,
}

impl Mutation {
    /// Order of a mutation pass. Later operators see the changes of earlier ones
    pub const ORDER: [Mutation; 6] = [
        Mutation::AddLink,
        Mutation::AddNode,
        Mutation::RandomWeight,
        Mutation::WeightShift,
        Mutation::ToggleLink,
        Mutation::RemoveNode,
    ];

    /// The chance gating this operator in a pass
    pub fn property(&self) -> Property {
        match self {
            Mutation::AddLink => Property::MutateLink,
            Mutation::AddNode => Property::MutateNode,
            Mutation::RandomWeight => Property::MutateRandomWeight,
            Mutation::WeightShift => Property::MutateShiftWeight,
            Mutation::ToggleLink => Property::MutateToggleLink,
            Mutation::RemoveNode => Property::MutateRemoveNode,
        }
    }
}

/// U(-1, 1) scaled by `strength`
#[inline]
fn uniform_weight(rng: &mut impl Rng, strength: f64) -> f64 {
    let u: f64 = rng.sample(Open01);
    (2. * u - 1.) * strength
}

impl Genome {
    /// One mutation pass: every operator, in [Mutation::ORDER], runs if its chance happens.
    /// True if anything changed
    pub fn mutate(
        &mut self,
        registry: &mut Registry,
        properties: &Properties,
        rng: &mut impl Rng,
    ) -> bool {
        let mut changed = false;
        for mutation in Mutation::ORDER {
            if rng.happens(properties.get(mutation.property())) {
                changed |= self.apply(mutation, registry, properties, rng);
            }
        }
        changed
    }

    /// Run a single operator unconditionally. True if it changed anything
    pub fn apply(
        &mut self,
        mutation: Mutation,
        registry: &mut Registry,
        properties: &Properties,
        rng: &mut impl Rng,
    ) -> bool {
        match mutation {
            Mutation::AddLink => self.mutate_link(registry, rng),
            Mutation::AddNode => self.mutate_node(registry, rng),
            Mutation::RandomWeight => {
                self.mutate_random_weight(properties.random_weight_strength, rng)
            }
            Mutation::WeightShift => {
                self.mutate_weight_shift(properties.shift_weight_strength, rng)
            }
            Mutation::ToggleLink => self.mutate_toggle_link(rng),
            Mutation::RemoveNode => self.mutate_remove_node(rng),
        }
    }

    /// Connect two random nodes of different layers, lower x to higher x
    pub fn mutate_link(&mut self, registry: &mut Registry, rng: &mut impl Rng) -> bool {
        for _ in 0..JOLTEON_ADD_LINK_ATTEMPTS {
            let a = self.nodes.random(rng);
            let b = self.nodes.random(rng);
            if (a.x - b.x).abs() < JOLTEON_LAYER_EPSILON {
                continue;
            }

            let (from, to) = if a.x < b.x { (a.id, b.id) } else { (b.id, a.id) };
            if self.connections.contains(connection_key(from, to)) {
                continue;
            }

            let connection = registry.connection(ConnectionGene::new(from, to));
            return self.insert_connection(connection);
        }
        false
    }

    /// Split a random connection with a hidden node. The node is shared with every other
    /// genome splitting the same pair. Genes of the split this genome already holds are kept
    pub fn mutate_node(&mut self, registry: &mut Registry, rng: &mut impl Rng) -> bool {
        if self.connections.is_empty() {
            return false;
        }

        let split = self.connections.random(rng).clone();
        let mid = match registry.split(&split) {
            Some(id) => registry.node(id),
            None => {
                let (from, to) = (registry.node(split.from), registry.node(split.to));
                let Some(mid) = registry.create_node(
                    NodeKind::Hidden,
                    (from.x + to.x) / 2.,
                    (from.y + to.y) / 2.,
                ) else {
                    trace!("no node id left to split {} -> {}", split.from, split.to);
                    return false;
                };
                registry.set_split(&split, mid.id);
                mid
            }
        };

        let into = registry.connection(ConnectionGene {
            weight: 1.,
            ..ConnectionGene::new(split.from, mid.id)
        });
        let out_of = registry.connection(ConnectionGene {
            weight: split.weight,
            enabled: split.enabled,
            ..ConnectionGene::new(mid.id, split.to)
        });

        self.remove_connection(split.key());
        self.insert_node(mid);
        self.insert_connection(into);
        self.insert_connection(out_of);
        true
    }

    pub fn mutate_random_weight(&mut self, strength: f64, rng: &mut impl Rng) -> bool {
        if self.connections.is_empty() {
            return false;
        }

        let connection = self.connections.random_mut(rng);
        connection.weight = uniform_weight(rng, strength);
        true
    }

    pub fn mutate_weight_shift(&mut self, strength: f64, rng: &mut impl Rng) -> bool {
        if self.connections.is_empty() {
            return false;
        }

        let connection = self.connections.random_mut(rng);
        connection.weight += uniform_weight(rng, strength);
        true
    }

    pub fn mutate_toggle_link(&mut self, rng: &mut impl Rng) -> bool {
        if self.connections.is_empty() {
            return false;
        }

        let connection = self.connections.random_mut(rng);
        connection.enabled = !connection.enabled;
        true
    }

    /// Remove a random hidden node and everything connected to it, giving up after a few
    /// draws land on inputs or outputs
    pub fn mutate_remove_node(&mut self, rng: &mut impl Rng) -> bool {
        for _ in 0..JOLTEON_REMOVE_NODE_ATTEMPTS {
            let node = self.nodes.random(rng);
            if node.kind == NodeKind::Hidden {
                let id = node.id;
                return self.remove_node(id).is_some();
            }
        }
        false
    }
}
