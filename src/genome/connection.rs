use crate::{collections::Keyed, constants::JOLTEON_MAX_NODE_BITS};

/// Structural identity of the connection `from -> to`
#[inline]
pub const fn connection_key(from: usize, to: usize) -> usize {
    from << JOLTEON_MAX_NODE_BITS | to
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionGene {
    /// assigned by the registry once per (from, to) pair
    pub innovation: usize,
    pub from: usize,
    pub to: usize,
    pub weight: f64,
    pub enabled: bool,
}

impl ConnectionGene {
    /// A candidate for `from -> to`, not yet given an innovation by a registry
    pub fn new(from: usize, to: usize) -> Self {
        Self {
            innovation: 0,
            from,
            to,
            weight: 0.,
            enabled: true,
        }
    }

    #[inline]
    pub fn path(&self) -> (usize, usize) {
        (self.from, self.to)
    }

    #[inline]
    pub fn enable(&mut self) {
        self.enabled = true;
    }

    #[inline]
    pub fn disable(&mut self) {
        self.enabled = false;
    }
}

impl Keyed for ConnectionGene {
    #[inline]
    fn key(&self) -> usize {
        connection_key(self.from, self.to)
    }

    #[inline]
    fn rank(&self) -> usize {
        self.innovation
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_key_is_structural() {
        let mut l = ConnectionGene::new(3, 7);
        let mut r = ConnectionGene::new(3, 7);
        l.innovation = 1;
        r.innovation = 9;
        r.weight = 0.5;
        assert_eq!(l.key(), r.key());
        assert_eq!(l.key(), 3 * 256 + 7);
        assert_ne!(l.key(), ConnectionGene::new(7, 3).key());
        assert_eq!(r.rank(), 9);
    }

    #[test]
    fn test_toggle() {
        let mut c = ConnectionGene::new(0, 1);
        assert!(c.enabled);
        c.disable();
        assert!(!c.enabled);
        c.enable();
        assert!(c.enabled);
        assert_eq!(c.path(), (0, 1));
    }
}
