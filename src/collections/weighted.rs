use rand::Rng;

/// Draws elements with probability proportional to their weight
#[derive(Debug, Clone)]
pub struct WeightedSelector<E> {
    /// (cumulative weight before this entry, weight, element)
    entries: Vec<(f64, f64, E)>,
    total: f64,
}

impl<E> Default for WeightedSelector<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            total: 0.,
        }
    }
}

impl<E> WeightedSelector<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            total: 0.,
        }
    }

    pub fn push(&mut self, element: E, weight: f64) {
        assert!(
            weight.is_finite() && weight >= 0.,
            "weight {weight} must be finite and non-negative"
        );
        self.entries.push((self.total, weight, element));
        self.total += weight;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Draw an element. When every weight is zero the draw is uniform over all of them.
    /// Panics if there are no elements
    pub fn draw(&self, rng: &mut impl Rng) -> &E {
        assert!(!self.is_empty(), "nothing to draw from");

        if self.total <= 0. {
            return &self.entries[rng.random_range(0..self.entries.len())].2;
        }

        let u = rng.random::<f64>() * self.total;
        // a zero weight entry shares its offset with its successor, so the last entry
        // starting at or before u always has width
        let idx = self
            .entries
            .partition_point(|(offset, _, _)| *offset <= u)
            .saturating_sub(1);
        &self.entries[idx].2
    }
}

impl<E> FromIterator<(E, f64)> for WeightedSelector<E> {
    fn from_iter<I: IntoIterator<Item = (E, f64)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut selector = Self::with_capacity(iter.size_hint().0);
        for (element, weight) in iter {
            selector.push(element, weight);
        }
        selector
    }
}
