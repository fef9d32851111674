pub mod ordered;
pub mod weighted;

pub use ordered::{CursorMut, Keyed, OrderedSet};
pub use weighted::WeightedSelector;
