//! Centralized constants for Jolteon evolution parameters.
//!
//! Structural limits and the default value of every [Property](crate::config::Property)
//! are defined here with the `JOLTEON_` prefix.

// ============================================================================
// Gene Identity Parameters
// ============================================================================

/// Bits available to a node id inside a packed connection key
pub const JOLTEON_MAX_NODE_BITS: usize = 8;

/// Size of the node id space shared by every genome of a registry
pub const JOLTEON_MAX_NODES: usize = 1 << JOLTEON_MAX_NODE_BITS;

/// Layer of every input node
pub const JOLTEON_INPUT_X: f64 = 0.1;

/// Layer of every output node
pub const JOLTEON_OUTPUT_X: f64 = 0.9;

/// Two nodes whose x differ by less than this share a layer and may not be linked
pub const JOLTEON_LAYER_EPSILON: f64 = 1e-6;

// ============================================================================
// Population Parameters
// ============================================================================

/// Smallest population a [Population](crate::population::Population) accepts
pub const JOLTEON_POPULATION_MIN: usize = 10;

/// Largest population a [Population](crate::population::Population) accepts
pub const JOLTEON_POPULATION_MAX: usize = 1000;

/// Genetic distance threshold for speciation
pub const JOLTEON_SPECIES_DISTANCE: f64 = 4.0;

/// Fraction of each specie kept before reproduction
pub const JOLTEON_SURVIVAL_CHANCE: f64 = 0.75;

// ============================================================================
// Distance Coefficients
// ============================================================================

/// Coefficient for excess genes in compatibility distance calculation
pub const JOLTEON_EXCESS_FACTOR: f64 = 1.0;

/// Coefficient for disjoint genes in compatibility distance calculation
pub const JOLTEON_DISJOINT_FACTOR: f64 = 1.0;

/// Coefficient for average weight difference in compatibility distance calculation
pub const JOLTEON_WEIGHT_FACTOR: f64 = 1.0;

/// Genomes smaller than this are not normalized by their size in distance calculation
pub const JOLTEON_DISTANCE_NORMALIZATION_THRESHOLD: usize = 20;

// ============================================================================
// Mutation Parameters
// ============================================================================

/// Scale of a replaced weight, drawn from U(-1, 1)
pub const JOLTEON_RANDOM_WEIGHT_STRENGTH: f64 = 1.0;

/// Scale of a weight perturbation, drawn from U(-1, 1)
pub const JOLTEON_SHIFT_WEIGHT_STRENGTH: f64 = 0.25;

/// Probability of replacing a random connection weight
pub const JOLTEON_MUTATE_RANDOM_WEIGHT: f64 = 0.10;

/// Probability of perturbing a random connection weight
pub const JOLTEON_MUTATE_SHIFT_WEIGHT: f64 = 0.25;

/// Probability of toggling a random connection
pub const JOLTEON_MUTATE_TOGGLE_LINK: f64 = 0.05;

/// Probability of adding a new connection
pub const JOLTEON_MUTATE_LINK: f64 = 0.10;

/// Probability of splitting a connection with a new node
pub const JOLTEON_MUTATE_NODE: f64 = 0.5;

/// Probability of removing a hidden node
pub const JOLTEON_MUTATE_REMOVE_NODE: f64 = 0.02;

/// Node pairs drawn before giving up on adding a connection
pub const JOLTEON_ADD_LINK_ATTEMPTS: usize = 20;

/// Nodes drawn before giving up on removing a hidden node
pub const JOLTEON_REMOVE_NODE_ATTEMPTS: usize = 5;
