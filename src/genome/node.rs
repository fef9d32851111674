use crate::collections::Keyed;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Input,
    Hidden,
    Output,
}

/// A neuron. Registry templates carry no adjacency; a genome's copy lists the keys of
/// the connections touching it within that genome
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGene {
    pub id: usize,
    pub kind: NodeKind,
    /// layer, from 0.1 for inputs to 0.9 for outputs
    pub x: f64,
    pub y: f64,
    pub incoming: Vec<usize>,
    pub outgoing: Vec<usize>,
}

impl NodeGene {
    pub fn new(id: usize, kind: NodeKind, x: f64, y: f64) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }
    }

    /// Inputs and outputs are part of every genome and may not be removed
    #[inline]
    pub fn is_fixed(&self) -> bool {
        !matches!(self.kind, NodeKind::Hidden)
    }

    /// Forget the connection `key` on both sides of this node
    pub(crate) fn unwire(&mut self, key: usize) {
        self.incoming.retain(|k| *k != key);
        self.outgoing.retain(|k| *k != key);
    }
}

impl Keyed for NodeGene {
    #[inline]
    fn key(&self) -> usize {
        self.id
    }

    #[inline]
    fn rank(&self) -> usize {
        self.id
    }
}
