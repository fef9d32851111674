//! A hashed set whose elements also sit in a doubly linked order.
//!
//! Membership and removal go through a chained, power-of-two hash table keyed by
//! [Keyed::key]. Traversal follows the links, which start out in insertion order and
//! are rearranged by [OrderedSet::push_sorted] and [OrderedSet::sort]. Links live in a
//! slab and refer to each other by index, so nothing is reference counted.

use rand::Rng;

/// An element of an [OrderedSet]
pub trait Keyed {
    /// Identity within a set. Doubles as the element's hash
    fn key(&self) -> usize;

    /// Position in ascending order
    fn rank(&self) -> usize;
}

const DEFAULT_INITIAL_CAPACITY: usize = 1 << 4;
const MAXIMUM_CAPACITY: usize = 1 << 30;
const LOAD_FACTOR: f64 = 0.75;

#[inline]
fn table_size(capacity: usize) -> usize {
    capacity.max(1).next_power_of_two().min(MAXIMUM_CAPACITY)
}

#[inline]
fn threshold(buckets: usize) -> usize {
    (buckets as f64 * LOAD_FACTOR) as usize
}

#[derive(Debug, Clone)]
struct Link<T> {
    item: T,
    prev: Option<usize>,
    next: Option<usize>,
    /// next link sharing this link's bucket
    chain: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct OrderedSet<T> {
    links: Vec<Option<Link<T>>>,
    vacant: Vec<usize>,
    table: Vec<Option<usize>>,
    threshold: usize,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<T: Keyed> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> OrderedSet<T> {
    #[inline]
    fn link(&self, idx: usize) -> &Link<T> {
        match &self.links[idx] {
            Some(link) => link,
            None => unreachable!("vacant link {idx} is still referenced"),
        }
    }

    #[inline]
    fn link_mut(&mut self, idx: usize) -> &mut Link<T> {
        match &mut self.links[idx] {
            Some(link) => link,
            None => unreachable!("vacant link {idx} is still referenced"),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn first(&self) -> Option<&T> {
        self.head.map(|idx| &self.link(idx).item)
    }

    pub fn last(&self) -> Option<&T> {
        self.tail.map(|idx| &self.link(idx).item)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            set: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// Walk to the link at position `index`, starting from whichever end is nearer
    fn position(&self, index: usize) -> Option<usize> {
        if index >= self.len {
            return None;
        }

        if index < self.len >> 1 {
            let mut cursor = self.head;
            for _ in 0..index {
                cursor = cursor.and_then(|idx| self.link(idx).next);
            }
            cursor
        } else {
            let mut cursor = self.tail;
            for _ in index + 1..self.len {
                cursor = cursor.and_then(|idx| self.link(idx).prev);
            }
            cursor
        }
    }

    pub fn nth(&self, index: usize) -> Option<&T> {
        self.position(index).map(|idx| &self.link(idx).item)
    }

    pub fn nth_mut(&mut self, index: usize) -> Option<&mut T> {
        self.position(index).map(|idx| &mut self.link_mut(idx).item)
    }

    /// A uniformly random element. Panics if there are none
    pub fn random(&self, rng: &mut impl Rng) -> &T {
        assert!(!self.is_empty(), "no elements to choose from");
        let index = rng.random_range(0..self.len);
        match self.nth(index) {
            Some(item) => item,
            None => unreachable!("index {index} within {} has no link", self.len),
        }
    }

    /// A uniformly random element, mutably. Panics if there are none
    pub fn random_mut(&mut self, rng: &mut impl Rng) -> &mut T {
        assert!(!self.is_empty(), "no elements to choose from");
        let index = rng.random_range(0..self.len);
        let len = self.len;
        match self.nth_mut(index) {
            Some(item) => item,
            None => unreachable!("index {index} within {len} has no link"),
        }
    }

    pub fn clear(&mut self) {
        self.links.clear();
        self.vacant.clear();
        self.table.iter_mut().for_each(|bucket| *bucket = None);
        self.head = None;
        self.tail = None;
        self.len = 0;
    }
}

impl<T: Keyed> OrderedSet<T> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_INITIAL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let buckets = table_size(capacity);
        Self {
            links: Vec::new(),
            vacant: Vec::new(),
            table: vec![None; buckets],
            threshold: threshold(buckets),
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    fn bucket(&self, key: usize) -> usize {
        key & (self.table.len() - 1)
    }

    fn find(&self, key: usize) -> Option<usize> {
        let mut cursor = self.table[self.bucket(key)];
        while let Some(idx) = cursor {
            let link = self.link(idx);
            if link.item.key() == key {
                return Some(idx);
            }
            cursor = link.chain;
        }
        None
    }

    pub fn contains(&self, key: usize) -> bool {
        self.find(key).is_some()
    }

    pub fn get(&self, key: usize) -> Option<&T> {
        self.find(key).map(|idx| &self.link(idx).item)
    }

    /// Mutable access by key. The element's key must not change through this reference,
    /// and a changed rank only takes effect in the order after [OrderedSet::sort]
    pub fn get_mut(&mut self, key: usize) -> Option<&mut T> {
        self.find(key).map(|idx| &mut self.link_mut(idx).item)
    }

    fn alloc(&mut self, link: Link<T>) -> usize {
        match self.vacant.pop() {
            Some(idx) => {
                self.links[idx] = Some(link);
                idx
            }
            None => {
                self.links.push(Some(link));
                self.links.len() - 1
            }
        }
    }

    fn attach(&mut self, idx: usize) {
        let bucket = self.bucket(self.link(idx).item.key());
        self.link_mut(idx).chain = self.table[bucket];
        self.table[bucket] = Some(idx);

        self.len += 1;
        if self.len > self.threshold {
            self.resize();
        }
    }

    fn detach(&mut self, idx: usize) {
        let bucket = self.bucket(self.link(idx).item.key());
        let chain = self.link(idx).chain;

        let mut prev = None;
        let mut cursor = self.table[bucket];
        while let Some(at) = cursor {
            if at == idx {
                match prev {
                    None => self.table[bucket] = chain,
                    Some(p) => self.link_mut(p).chain = chain,
                }
                self.len -= 1;
                return;
            }
            prev = Some(at);
            cursor = self.link(at).chain;
        }

        unreachable!("link {idx} missing from bucket {bucket}");
    }

    /// Double the table, splitting every bucket into the half whose new bit is clear and
    /// the half whose new bit is set. Relative order within each half is kept
    fn resize(&mut self) {
        let old_cap = self.table.len();
        if old_cap >= MAXIMUM_CAPACITY {
            self.threshold = usize::MAX;
            return;
        }

        let new_cap = old_cap << 1;
        let mut table = vec![None; new_cap];
        for j in 0..old_cap {
            let (mut lo_head, mut lo_tail) = (None, None);
            let (mut hi_head, mut hi_tail) = (None, None);

            let mut cursor = self.table[j];
            while let Some(idx) = cursor {
                let link = self.link(idx);
                cursor = link.chain;

                let (head, tail) = if link.item.key() & old_cap == 0 {
                    (&mut lo_head, &mut lo_tail)
                } else {
                    (&mut hi_head, &mut hi_tail)
                };
                match *tail {
                    None => *head = Some(idx),
                    Some(t) => self.link_mut(t).chain = Some(idx),
                }
                *tail = Some(idx);
            }

            if let Some(t) = lo_tail {
                self.link_mut(t).chain = None;
                table[j] = lo_head;
            }
            if let Some(t) = hi_tail {
                self.link_mut(t).chain = None;
                table[j + old_cap] = hi_head;
            }
        }

        self.table = table;
        self.threshold = threshold(new_cap);
    }

    fn link_first(&mut self, item: T) {
        let idx = self.alloc(Link {
            item,
            prev: None,
            next: self.head,
            chain: None,
        });
        match self.head {
            Some(h) => self.link_mut(h).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.head = Some(idx);
        self.attach(idx);
    }

    fn link_after(&mut self, item: T, at: usize) {
        let next = self.link(at).next;
        let idx = self.alloc(Link {
            item,
            prev: Some(at),
            next,
            chain: None,
        });
        self.link_mut(at).next = Some(idx);
        match next {
            Some(n) => self.link_mut(n).prev = Some(idx),
            None => self.tail = Some(idx),
        }
        self.attach(idx);
    }

    fn unlink(&mut self, idx: usize) -> T {
        self.detach(idx);

        let (prev, next) = {
            let link = self.link(idx);
            (link.prev, link.next)
        };
        match prev {
            Some(p) => self.link_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.link_mut(n).prev = prev,
            None => self.tail = prev,
        }

        self.vacant.push(idx);
        match self.links[idx].take() {
            Some(link) => link.item,
            None => unreachable!("link {idx} was vacant while linked"),
        }
    }

    /// Append to the end of the order. False if an element with this key is present
    pub fn push(&mut self, item: T) -> bool {
        if self.contains(item.key()) {
            return false;
        }

        match self.tail {
            Some(t) => self.link_after(item, t),
            None => self.link_first(item),
        }
        true
    }

    /// Insert after the last element whose rank doesn't exceed this one's, scanning from
    /// the tail. False if an element with this key is present
    pub fn push_sorted(&mut self, item: T) -> bool {
        if self.contains(item.key()) {
            return false;
        }

        let rank = item.rank();
        let mut cursor = self.tail;
        while let Some(idx) = cursor {
            let link = self.link(idx);
            if link.item.rank() <= rank {
                break;
            }
            cursor = link.prev;
        }

        match cursor {
            Some(at) => self.link_after(item, at),
            None => self.link_first(item),
        }
        true
    }

    pub fn remove(&mut self, key: usize) -> Option<T> {
        self.find(key).map(|idx| self.unlink(idx))
    }

    /// Stable merge sort of the linked order by rank, bottom up. The hash table is left
    /// alone since keys don't move between buckets
    pub fn sort(&mut self) {
        if self.len < 2 {
            return;
        }

        let mut list = self.head;
        let mut run = 1;
        loop {
            let mut p = list;
            list = None;
            let mut tail: Option<usize> = None;
            let mut merges = 0;

            while p.is_some() {
                merges += 1;

                let mut q = p;
                let mut p_size = 0;
                for _ in 0..run {
                    p_size += 1;
                    q = q.and_then(|idx| self.link(idx).next);
                    if q.is_none() {
                        break;
                    }
                }

                let mut q_size = run;
                while p_size > 0 || (q_size > 0 && q.is_some()) {
                    let from_p = if p_size == 0 {
                        false
                    } else if q_size == 0 {
                        true
                    } else {
                        match (p, q) {
                            (Some(l), Some(r)) => {
                                self.link(l).item.rank() <= self.link(r).item.rank()
                            }
                            _ => true,
                        }
                    };

                    let taken = if from_p {
                        let taken = p;
                        p = taken.and_then(|idx| self.link(idx).next);
                        p_size -= 1;
                        taken
                    } else {
                        let taken = q;
                        q = taken.and_then(|idx| self.link(idx).next);
                        q_size -= 1;
                        taken
                    };

                    let Some(idx) = taken else {
                        unreachable!("merge ran past the end of a run");
                    };
                    match tail {
                        Some(t) => self.link_mut(t).next = Some(idx),
                        None => list = Some(idx),
                    }
                    self.link_mut(idx).prev = tail;
                    tail = Some(idx);
                }

                p = q;
            }

            if let Some(t) = tail {
                self.link_mut(t).next = None;
            }

            if merges <= 1 {
                self.head = list;
                self.tail = tail;
                return;
            }

            run <<= 1;
        }
    }

    /// A cursor who walks the order front to back and may remove what it last yielded
    pub fn cursor_mut(&mut self) -> CursorMut<'_, T> {
        CursorMut {
            upcoming: self.head,
            current: None,
            set: self,
        }
    }

    /// Keep only the elements for whom `keep` is true, preserving order
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let mut cursor = self.cursor_mut();
        while let Some(item) = cursor.move_next() {
            if !keep(&*item) {
                cursor.remove_current();
            }
        }
    }
}

impl<T: Keyed> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for item in iter {
            set.push(item);
        }
        set
    }
}

pub struct Iter<'a, T> {
    set: &'a OrderedSet<T>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.cursor?;
        let link = self.set.link(idx);
        self.cursor = link.next;
        self.remaining -= 1;
        Some(&link.item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Front to back traversal of an [OrderedSet] that survives removal of the element it
/// last yielded, resuming at that element's successor
pub struct CursorMut<'a, T: Keyed> {
    set: &'a mut OrderedSet<T>,
    current: Option<usize>,
    upcoming: Option<usize>,
}

impl<T: Keyed> CursorMut<'_, T> {
    #[allow(clippy::should_implement_trait)]
    pub fn move_next(&mut self) -> Option<&mut T> {
        let idx = self.upcoming?;
        self.current = Some(idx);
        self.upcoming = self.set.link(idx).next;
        Some(&mut self.set.link_mut(idx).item)
    }

    /// Remove the element last yielded by [CursorMut::move_next]. None if there is none,
    /// or it has already been removed
    pub fn remove_current(&mut self) -> Option<T> {
        self.current.take().map(|idx| self.set.unlink(idx))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{random::WyRng, test_t};
    use core::fmt::Debug;
    use rand::SeedableRng;
    use std::collections::HashSet;

    trait Sample: Keyed + Debug {
        fn sample(n: usize) -> Self;
        fn n(&self) -> usize;
    }

    /// key and rank are the same
    #[derive(Debug, Clone, PartialEq)]
    struct Plain(usize);

    impl Keyed for Plain {
        fn key(&self) -> usize {
            self.0
        }

        fn rank(&self) -> usize {
            self.0
        }
    }

    impl Sample for Plain {
        fn sample(n: usize) -> Self {
            Plain(n)
        }

        fn n(&self) -> usize {
            self.0
        }
    }

    /// every key lands in bucket 0 of a fresh table, and ranks repeat
    #[derive(Debug, Clone, PartialEq)]
    struct Tagged {
        n: usize,
    }

    impl Keyed for Tagged {
        fn key(&self) -> usize {
            self.n << 4
        }

        fn rank(&self) -> usize {
            self.n / 2
        }
    }

    impl Sample for Tagged {
        fn sample(n: usize) -> Self {
            Tagged { n }
        }

        fn n(&self) -> usize {
            self.n
        }
    }

    fn ranks<T: Keyed>(set: &OrderedSet<T>) -> Vec<usize> {
        set.iter().map(Keyed::rank).collect()
    }

    test_t!(
    membership[T: Plain | Tagged]() {
        let mut rng = WyRng::seed_from_u64(11);
        let mut set = OrderedSet::<T>::new();
        let mut model = HashSet::new();

        for _ in 0..2_000 {
            let n = rng.random_range(0..64);
            if rng.random_bool(0.6) {
                assert_eq!(set.push(T::sample(n)), model.insert(n));
            } else {
                assert_eq!(set.remove(T::sample(n).key()).is_some(), model.remove(&n));
            }

            assert_eq!(set.len(), model.len());
            assert_eq!(set.iter().count(), model.len());
        }

        for n in 0..64 {
            assert_eq!(set.contains(T::sample(n).key()), model.contains(&n), "{n}");
        }
    });

    test_t!(
    sort_non_decreasing[T: Plain | Tagged]() {
        let mut rng = WyRng::seed_from_u64(3);
        let mut set = OrderedSet::<T>::new();
        for _ in 0..300 {
            set.push(T::sample(rng.random_range(0..1_000)));
        }
        for _ in 0..100 {
            set.remove(T::sample(rng.random_range(0..1_000)).key());
        }

        let len = set.len();
        set.sort();
        assert_eq!(set.len(), len);
        assert!(ranks(&set).windows(2).all(|w| w[0] <= w[1]));

        // links are consistent in both directions
        let forward = (0..len).map(|i| set.nth(i).unwrap().key()).collect::<Vec<_>>();
        let backward = (0..len).rev().map(|i| set.nth(i).unwrap().key()).rev().collect::<Vec<_>>();
        assert_eq!(forward, backward);
        assert_eq!(set.first().map(Keyed::key), forward.first().copied());
        assert_eq!(set.last().map(Keyed::key), forward.last().copied());
    });

    test_t!(
    push_sorted_in_order[T: Plain | Tagged]() {
        let mut rng = WyRng::seed_from_u64(5);
        let mut set = OrderedSet::<T>::new();
        for _ in 0..200 {
            set.push_sorted(T::sample(rng.random_range(0..500)));
        }
        assert!(ranks(&set).windows(2).all(|w| w[0] <= w[1]));

        let present = set.random(&mut rng).n();
        let len = set.len();
        assert!(!set.push_sorted(T::sample(present)));
        assert_eq!(set.len(), len);
    });

    test_t!(
    #[should_panic(expected = "no elements to choose from")]
    random_empty[T: Plain | Tagged]() {
        let set = OrderedSet::<T>::new();
        set.random(&mut WyRng::seed_from_u64(0));
    });

    test_t!(
    random_uniform[T: Plain | Tagged]() {
        let mut rng = WyRng::seed_from_u64(99);
        let set = (0..5).map(T::sample).collect::<OrderedSet<_>>();
        let mut counts = [0usize; 5];
        for _ in 0..50_000 {
            let item = set.random(&mut rng);
            let idx = set.iter().position(|i| i.key() == item.key()).unwrap();
            counts[idx] += 1;
        }
        for count in counts {
            assert!((9_000..11_000).contains(&count), "{counts:?}");
        }
    });

    test_t!(
    cursor_remove_resumes[T: Plain | Tagged]() {
        let mut set = (0..10).map(T::sample).collect::<OrderedSet<_>>();
        let mut visited = vec![];
        let mut cursor = set.cursor_mut();
        while let Some(item) = cursor.move_next() {
            let key = item.key();
            visited.push(key);
            if item.n() % 2 == 0 {
                assert_eq!(cursor.remove_current().map(|i| i.key()), Some(key));
                assert!(cursor.remove_current().is_none());
            }
        }

        assert_eq!(visited, (0..10).map(|n| T::sample(n).key()).collect::<Vec<_>>());
        assert_eq!(set.len(), 5);
        assert_eq!(
            set.iter().map(Keyed::key).collect::<Vec<_>>(),
            (0..10).filter(|n| n % 2 == 1).map(|n| T::sample(n).key()).collect::<Vec<_>>()
        );
    });

    test_t!(
    nth_both_ends[T: Plain | Tagged]() {
        let set = (0..9).map(T::sample).collect::<OrderedSet<_>>();
        for i in 0..9 {
            assert_eq!(set.nth(i).map(Keyed::key), Some(T::sample(i).key()));
        }
        assert!(set.nth(9).is_none());
    });

    test_t!(
    growth[T: Plain | Tagged]() {
        let mut set = OrderedSet::<T>::with_capacity(3);
        assert_eq!(set.table.len(), 4);
        for n in 0..1_000 {
            assert!(set.push(T::sample(n)));
        }
        assert!(set.table.len().is_power_of_two());
        assert!(set.len() as f64 <= set.table.len() as f64 * LOAD_FACTOR);
        for n in 0..1_000 {
            assert!(set.contains(T::sample(n).key()));
            assert!(!set.push(T::sample(n)));
        }
        assert_eq!(
            set.iter().map(Keyed::key).collect::<Vec<_>>(),
            (0..1_000).map(|n| T::sample(n).key()).collect::<Vec<_>>()
        );
    });

    test_t!(
    clear_reuse[T: Plain | Tagged]() {
        let mut set = (0..20).map(T::sample).collect::<OrderedSet<_>>();
        set.clear();
        assert!(set.is_empty());
        assert!(set.first().is_none());
        assert!(!set.contains(T::sample(3).key()));
        assert!(set.push(T::sample(3)));
        assert_eq!(set.len(), 1);
    });

    #[test]
    fn test_sort_stable() {
        // ranks pair up as (0, 1) (2, 3) ... and each pair is pushed in reverse
        let mut set = OrderedSet::new();
        for n in (0..40).rev() {
            set.push(Tagged { n });
        }
        set.sort();
        let order = set.iter().map(|t| t.n).collect::<Vec<_>>();
        let want = (0..20).flat_map(|r| [2 * r + 1, 2 * r]).collect::<Vec<_>>();
        assert_eq!(order, want);
    }

    #[test]
    fn test_push_sorted_ties_go_last() {
        let mut set = OrderedSet::new();
        set.push_sorted(Tagged { n: 5 });
        set.push_sorted(Tagged { n: 1 });
        set.push_sorted(Tagged { n: 4 });
        set.push_sorted(Tagged { n: 0 });
        assert_eq!(set.iter().map(|t| t.n).collect::<Vec<_>>(), vec![1, 0, 5, 4]);
    }

    #[test]
    fn test_retain() {
        let mut set = (0..30).map(Plain).collect::<OrderedSet<_>>();
        set.retain(|p| p.0 % 3 == 0);
        assert_eq!(set.iter().map(|p| p.0).collect::<Vec<_>>(), (0..30).step_by(3).collect::<Vec<_>>());
        for n in 0..30 {
            assert_eq!(set.contains(n), n % 3 == 0);
        }
    }

    #[test]
    fn test_random_mut_and_get_mut() {
        #[derive(Debug)]
        struct Weighted(usize, f64);
        impl Keyed for Weighted {
            fn key(&self) -> usize {
                self.0
            }
            fn rank(&self) -> usize {
                self.0
            }
        }

        let mut set = (0..4).map(|n| Weighted(n, 0.)).collect::<OrderedSet<_>>();
        set.random_mut(&mut WyRng::seed_from_u64(1)).1 = 1.;
        assert_eq!(set.iter().filter(|w| w.1 == 1.).count(), 1);

        set.get_mut(2).unwrap().1 = 2.;
        assert_eq!(set.get(2).unwrap().1, 2.);
        assert!(set.get_mut(9).is_none());
    }
}
