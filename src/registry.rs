//! The authority over gene identity. Every genome of a population draws its node ids and
//! connection innovations from one [Registry], so equal structure means equal ids.

use crate::{
    collections::Keyed,
    config::ConfigError,
    constants::*,
    genome::{ConnectionGene, NodeGene, NodeKind},
};
use fxhash::FxHashMap;

/// The registry's record of a structural pair
#[derive(Debug, Clone, Copy)]
struct Canonical {
    innovation: usize,
    /// hidden node created the first time this pair was split
    split: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Registry {
    inputs: usize,
    outputs: usize,
    nodes: Vec<NodeGene>,
    connections: FxHashMap<usize, Canonical>,
}

impl Registry {
    pub fn new(inputs: usize, outputs: usize) -> Result<Self, ConfigError> {
        if inputs == 0 || outputs == 0 || inputs + outputs > JOLTEON_MAX_NODES {
            return Err(ConfigError::Topology { inputs, outputs });
        }

        let mut registry = Self {
            inputs,
            outputs,
            nodes: Vec::with_capacity(inputs + outputs),
            connections: FxHashMap::default(),
        };
        registry.reset();
        Ok(registry)
    }

    /// Forget every hidden node and connection, then lay out the inputs and outputs again
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.connections.clear();

        for i in 0..self.inputs {
            let y = (i + 1) as f64 / self.inputs as f64;
            self.nodes
                .push(NodeGene::new(i, NodeKind::Input, JOLTEON_INPUT_X, y));
        }
        for i in 0..self.outputs {
            let y = (i + 1) as f64 / self.outputs as f64;
            self.nodes.push(NodeGene::new(
                self.inputs + i,
                NodeKind::Output,
                JOLTEON_OUTPUT_X,
                y,
            ));
        }
    }

    /// A new node template with the next free id, or None once the id space is spent
    pub fn create_node(&mut self, kind: NodeKind, x: f64, y: f64) -> Option<NodeGene> {
        let id = self.nodes.len();
        if id >= JOLTEON_MAX_NODES {
            return None;
        }

        let node = NodeGene::new(id, kind, x, y);
        self.nodes.push(node.clone());
        Some(node)
    }

    /// A fresh copy of node `id`
    pub fn node(&self, id: usize) -> NodeGene {
        match self.nodes.get(id) {
            Some(node) => node.clone(),
            None => panic!("node {id} is not registered ({} known)", self.nodes.len()),
        }
    }

    /// `candidate` with the canonical innovation of its pair, assigning the next one if
    /// the pair is new. Weight and enabled are kept as given
    pub fn connection(&mut self, candidate: ConnectionGene) -> ConnectionGene {
        let next = self.connections.len();
        let canonical = self
            .connections
            .entry(candidate.key())
            .or_insert(Canonical {
                innovation: next,
                split: None,
            });

        ConnectionGene {
            innovation: canonical.innovation,
            ..candidate
        }
    }

    pub fn split(&self, connection: &ConnectionGene) -> Option<usize> {
        self.connections
            .get(&connection.key())
            .and_then(|canonical| canonical.split)
    }

    pub fn set_split(&mut self, connection: &ConnectionGene, node: usize) {
        let (from, to) = connection.path();
        match self.connections.get_mut(&connection.key()) {
            Some(canonical) => canonical.split = Some(node),
            None => panic!("connection {from} -> {to} is not registered"),
        }
    }

    #[inline]
    pub fn inputs(&self) -> usize {
        self.inputs
    }

    #[inline]
    pub fn outputs(&self) -> usize {
        self.outputs
    }

    /// Number of node ids handed out so far, inputs and outputs included
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
