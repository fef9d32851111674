pub mod connection;
pub mod mutate;
pub mod node;

pub use connection::{connection_key, ConnectionGene};
pub use mutate::Mutation;
pub use node::{NodeGene, NodeKind};

use crate::{
    collections::{Keyed, OrderedSet},
    network::FeedForward,
    registry::Registry,
};

/// An individual: node genes ascending by id and connection genes ascending by innovation.
/// Every connection's endpoints are in the node set, and each endpoint lists the
/// connection's key in its adjacency
#[derive(Debug, Clone)]
pub struct Genome {
    nodes: OrderedSet<NodeGene>,
    connections: OrderedSet<ConnectionGene>,
}

impl Genome {
    /// A genome of just the registry's inputs and outputs
    pub fn new(registry: &Registry) -> Self {
        Self {
            nodes: (0..registry.inputs() + registry.outputs())
                .map(|id| registry.node(id))
                .collect(),
            connections: OrderedSet::new(),
        }
    }

    #[inline]
    pub fn nodes(&self) -> &OrderedSet<NodeGene> {
        &self.nodes
    }

    #[inline]
    pub fn connections(&self) -> &OrderedSet<ConnectionGene> {
        &self.connections
    }

    pub fn node(&self, id: usize) -> Option<&NodeGene> {
        self.nodes.get(id)
    }

    pub fn connection(&self, from: usize, to: usize) -> Option<&ConnectionGene> {
        self.connections.get(connection_key(from, to))
    }

    /// Highest innovation carried, 0 with no connections
    pub fn max_innovation(&self) -> usize {
        self.connections.last().map_or(0, |c| c.innovation)
    }

    /// Add a node in id order. False if this id is already present
    pub fn insert_node(&mut self, node: NodeGene) -> bool {
        self.nodes.push_sorted(node)
    }

    /// Add a connection in innovation order and wire it into its endpoints.
    /// False if its pair is already present. Panics if an endpoint is missing
    pub fn insert_connection(&mut self, connection: ConnectionGene) -> bool {
        let key = connection.key();
        if self.connections.contains(key) {
            return false;
        }

        let (from, to) = connection.path();
        for id in [from, to] {
            assert!(
                self.nodes.contains(id),
                "connection {from} -> {to} needs node {id}, which this genome lacks"
            );
        }

        if let Some(node) = self.nodes.get_mut(from) {
            node.outgoing.push(key);
        }
        if let Some(node) = self.nodes.get_mut(to) {
            node.incoming.push(key);
        }
        self.connections.push_sorted(connection)
    }

    pub fn remove_connection(&mut self, key: usize) -> Option<ConnectionGene> {
        let connection = self.connections.remove(key)?;
        for id in [connection.from, connection.to] {
            if let Some(node) = self.nodes.get_mut(id) {
                node.unwire(key);
            }
        }
        Some(connection)
    }

    /// Remove a hidden node along with every connection touching it. Other endpoints of
    /// those connections are unwired. Panics for an input or output
    pub fn remove_node(&mut self, id: usize) -> Option<NodeGene> {
        let node = self.nodes.get(id)?;
        assert!(
            !node.is_fixed(),
            "node {id} is fixed ({:?}) and can't be removed",
            node.kind
        );

        let mut touching = Vec::new();
        let mut cursor = self.connections.cursor_mut();
        while let Some(connection) = cursor.move_next() {
            if connection.from == id || connection.to == id {
                touching.extend(cursor.remove_current());
            }
        }

        for connection in touching {
            let other = if connection.from == id {
                connection.to
            } else {
                connection.from
            };
            if let Some(node) = self.nodes.get_mut(other) {
                node.unwire(connection.key());
            }
        }

        self.nodes.remove(id)
    }

    pub fn network(&self) -> FeedForward {
        FeedForward::new(self)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Register `from -> to` and add it to `genome`
    pub(crate) fn linked(
        registry: &mut Registry,
        genome: &mut Genome,
        from: usize,
        to: usize,
        weight: f64,
    ) {
        let connection = registry.connection(ConnectionGene {
            weight,
            ..ConnectionGene::new(from, to)
        });
        assert!(genome.insert_connection(connection));
    }

    #[test]
    fn test_new() {
        let registry = Registry::new(3, 2).unwrap();
        let genome = Genome::new(&registry);
        assert_eq!(
            genome.nodes().iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4]
        );
        assert!(genome.connections().is_empty());
        assert_eq!(genome.max_innovation(), 0);
    }

    #[test]
    fn test_insert_wires() {
        let mut registry = Registry::new(2, 1).unwrap();
        let mut genome = Genome::new(&registry);
        linked(&mut registry, &mut genome, 1, 2, 0.5);
        linked(&mut registry, &mut genome, 0, 2, -0.5);

        let key = connection_key(1, 2);
        assert_eq!(genome.node(1).unwrap().outgoing, vec![key]);
        assert_eq!(genome.node(2).unwrap().incoming, vec![key, connection_key(0, 2)]);
        assert_eq!(
            genome.connections().iter().map(|c| c.innovation).collect::<Vec<_>>(),
            vec![0, 1]
        );
        assert_eq!(genome.max_innovation(), 1);
        assert!(!genome.insert_connection(registry.connection(ConnectionGene::new(1, 2))));
    }

    #[test]
    fn test_insert_sorted_by_innovation() {
        let mut registry = Registry::new(2, 1).unwrap();
        let late = registry.connection(ConnectionGene::new(1, 2));
        let early = registry.connection(ConnectionGene::new(0, 2));
        let mut genome = Genome::new(&registry);
        genome.insert_connection(early);
        genome.insert_connection(late);
        assert_eq!(
            genome.connections().iter().map(|c| c.from).collect::<Vec<_>>(),
            vec![1, 0]
        );
    }

    #[test]
    #[should_panic(expected = "needs node 3, which this genome lacks")]
    fn test_insert_missing_endpoint() {
        let mut registry = Registry::new(2, 1).unwrap();
        registry.create_node(NodeKind::Hidden, 0.5, 0.5);
        let mut genome = Genome::new(&registry);
        genome.insert_connection(registry.connection(ConnectionGene::new(0, 3)));
    }

    #[test]
    fn test_remove_connection_unwires() {
        let mut registry = Registry::new(2, 1).unwrap();
        let mut genome = Genome::new(&registry);
        linked(&mut registry, &mut genome, 0, 2, 1.);

        let removed = genome.remove_connection(connection_key(0, 2)).unwrap();
        assert_eq!(removed.path(), (0, 2));
        assert!(genome.node(0).unwrap().outgoing.is_empty());
        assert!(genome.node(2).unwrap().incoming.is_empty());
        assert!(genome.remove_connection(connection_key(0, 2)).is_none());
        // the registry still knows the pair
        assert_eq!(registry.connection(ConnectionGene::new(0, 2)).innovation, 0);
    }

    #[test]
    fn test_remove_node() {
        let mut registry = Registry::new(2, 1).unwrap();
        let mid = registry.create_node(NodeKind::Hidden, 0.5, 0.75).unwrap();
        let mut genome = Genome::new(&registry);
        genome.insert_node(mid);
        linked(&mut registry, &mut genome, 0, 3, 1.);
        linked(&mut registry, &mut genome, 1, 3, 1.);
        linked(&mut registry, &mut genome, 3, 2, 1.);
        linked(&mut registry, &mut genome, 1, 2, 1.);

        let other = genome.clone();
        assert_eq!(genome.remove_node(3).map(|n| n.id), Some(3));

        assert!(genome.node(3).is_none());
        assert_eq!(
            genome.connections().iter().map(|c| c.path()).collect::<Vec<_>>(),
            vec![(1, 2)]
        );
        assert!(genome.node(0).unwrap().outgoing.is_empty());
        assert_eq!(genome.node(1).unwrap().outgoing, vec![connection_key(1, 2)]);
        assert_eq!(genome.node(2).unwrap().incoming, vec![connection_key(1, 2)]);

        // clones and the registry are untouched
        assert_eq!(other.connections().len(), 4);
        assert_eq!(registry.node(3).id, 3);
        assert!(genome.remove_node(3).is_none());
    }

    #[test]
    #[should_panic(expected = "node 2 is fixed (Output) and can't be removed")]
    fn test_remove_fixed_node() {
        let registry = Registry::new(2, 1).unwrap();
        Genome::new(&registry).remove_node(2);
    }
}
