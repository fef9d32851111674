//! Genetic distance and crossover, both walking two genomes' connections in ascending
//! innovation order.

use crate::{
    config::Properties,
    constants::JOLTEON_DISTANCE_NORMALIZATION_THRESHOLD,
    genome::{ConnectionGene, Genome},
    registry::Registry,
};
use core::cmp::Ordering;
use rand::Rng;

/// Compatibility distance: disjoint and excess genes per gene, plus the average weight
/// difference of matching genes, each scaled by its factor. Symmetric
pub fn distance(l: &Genome, r: &Genome, properties: &Properties) -> f64 {
    // g1 reaches further, so only its tail can be excess
    let (g1, g2) = if l.max_innovation() >= r.max_innovation() {
        (l, r)
    } else {
        (r, l)
    };

    let mut left = g1.connections().iter().peekable();
    let mut right = g2.connections().iter().peekable();
    let (mut similar, mut disjoint) = (0usize, 0usize);
    let mut weight_diff = 0.;

    loop {
        let (a, b) = match (left.peek(), right.peek()) {
            (Some(a), Some(b)) => (*a, *b),
            _ => break,
        };

        match a.innovation.cmp(&b.innovation) {
            Ordering::Equal => {
                similar += 1;
                weight_diff += (a.weight - b.weight).abs();
                left.next();
                right.next();
            }
            Ordering::Greater => {
                disjoint += 1;
                right.next();
            }
            Ordering::Less => {
                disjoint += 1;
                left.next();
            }
        }
    }

    let excess = left.count();
    let avg_weight_diff = if similar == 0 {
        0.
    } else {
        weight_diff / similar as f64
    };

    let n = g1.connections().len().max(g2.connections().len());
    let n = if n < JOLTEON_DISTANCE_NORMALIZATION_THRESHOLD {
        1.
    } else {
        n as f64
    };

    disjoint as f64 / n * properties.disjoint_factor
        + excess as f64 / n * properties.excess_factor
        + avg_weight_diff * properties.weight_factor
}

fn inherit(child: &mut Genome, gene: &ConnectionGene, registry: &Registry) {
    for id in [gene.from, gene.to] {
        if !child.nodes().contains(id) {
            child.insert_node(registry.node(id));
        }
    }
    child.insert_connection(gene.clone());
}

/// A child of `dominant` and `other`. Matching genes come from either parent at random,
/// genes only `dominant` has are all kept, and genes only `other` has are dropped
pub fn crossover(
    dominant: &Genome,
    other: &Genome,
    registry: &Registry,
    rng: &mut impl Rng,
) -> Genome {
    let mut child = Genome::new(registry);
    let mut left = dominant.connections().iter().peekable();
    let mut right = other.connections().iter().peekable();

    loop {
        let (a, b) = match (left.peek(), right.peek()) {
            (Some(a), Some(b)) => (*a, *b),
            _ => break,
        };

        match a.innovation.cmp(&b.innovation) {
            Ordering::Equal => {
                inherit(&mut child, if rng.random_bool(0.5) { a } else { b }, registry);
                left.next();
                right.next();
            }
            Ordering::Greater => {
                right.next();
            }
            Ordering::Less => {
                inherit(&mut child, a, registry);
                left.next();
            }
        }
    }

    for gene in left {
        inherit(&mut child, gene, registry);
    }

    child
}
