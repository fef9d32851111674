use super::{activate::sigmoid, Network};
use crate::genome::{Genome, NodeKind};
use core::ops::Range;
use fxhash::FxHashMap;

/// A neuron past the input layer, reading the state slots of its enabled incoming
/// connections
#[derive(Debug, Clone)]
struct Neuron {
    incoming: Vec<(usize, f64)>,
}

/// A feed-forward network. State is laid out as inputs by id, hidden neurons by ascending
/// x, then outputs by id, so one pass front to back sees every source before its target
#[derive(Debug, Clone)]
pub struct FeedForward {
    inputs: usize,
    neurons: Vec<Neuron>,
    state: Vec<f64>,
    outputs: Range<usize>,
}

impl FeedForward {
    pub fn new(genome: &Genome) -> Self {
        let of_kind = |kind: NodeKind| genome.nodes().iter().filter(move |n| n.kind == kind);

        let mut hidden = of_kind(NodeKind::Hidden).collect::<Vec<_>>();
        hidden.sort_by(|l, r| l.x.total_cmp(&r.x));

        let order = of_kind(NodeKind::Input)
            .chain(hidden)
            .chain(of_kind(NodeKind::Output))
            .collect::<Vec<_>>();
        let slots = order
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id, slot))
            .collect::<FxHashMap<_, _>>();

        let inputs = of_kind(NodeKind::Input).count();
        let outputs = of_kind(NodeKind::Output).count();
        let neurons = order[inputs..]
            .iter()
            .map(|node| Neuron {
                incoming: node
                    .incoming
                    .iter()
                    .filter_map(|key| genome.connections().get(*key))
                    .filter(|c| c.enabled)
                    .filter_map(|c| slots.get(&c.from).map(|slot| (*slot, c.weight)))
                    .collect(),
            })
            .collect();

        Self {
            inputs,
            neurons,
            state: vec![0.; order.len()],
            outputs: order.len() - outputs..order.len(),
        }
    }
}

impl Network for FeedForward {
    fn activate(&mut self, input: &[f64]) -> &[f64] {
        assert_eq!(
            input.len(),
            self.inputs,
            "expected {} inputs, got {}",
            self.inputs,
            input.len()
        );

        self.state[..self.inputs].copy_from_slice(input);
        for (idx, neuron) in self.neurons.iter().enumerate() {
            let sum = neuron
                .incoming
                .iter()
                .map(|(slot, weight)| self.state[*slot] * weight)
                .sum::<f64>();
            self.state[self.inputs + idx] = sigmoid(sum);
        }

        self.output()
    }

    fn output(&self) -> &[f64] {
        &self.state[self.outputs.start..self.outputs.end]
    }
}
