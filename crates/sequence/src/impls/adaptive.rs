use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use tracing::trace;

use crate::error::{OutOfRange, Result};
use crate::policy::{Immutable, Mutability, Mutable};
use crate::rebuild;
use crate::traits::{Handle, Iter, Sequence};

pub type MutableAdaptiveSequence<T> = AdaptiveSequence<T, Mutable>;
pub type ImmutableAdaptiveSequence<T> = AdaptiveSequence<T, Immutable>;

/// Growable double-ended buffer.
///
/// The occupied slots `front..front + len` sit inside a power-of-two block.
/// The first element of an empty sequence goes to the midpoint, and every
/// growth doubles the block and re-bases the elements at a quarter of the new
/// capacity, so both ends keep headroom and append/prepend are amortized O(1).
pub struct AdaptiveSequence<T, M: Mutability> {
    buffer: Box<[Option<T>]>,
    front: usize,
    len: usize,
    _policy: PhantomData<M>,
}

fn capacity_for(count: usize) -> usize {
    if count == 0 { 0 } else { count.next_power_of_two() }
}

fn empty_block<T>(capacity: usize) -> Box<[Option<T>]> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}

impl<T, M: Mutability> AdaptiveSequence<T, M> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Pre-allocates `capacity` rounded up to a power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity_for(capacity);
        Self {
            buffer: empty_block(capacity),
            front: capacity / 2,
            len: 0,
            _policy: PhantomData,
        }
    }

    /// Copies a run of elements. They start at offset 0 of a block sized to
    /// the rounded count.
    pub fn from_slice(items: &[T]) -> Self
    where
        T: Clone,
    {
        Self::from(items.to_vec())
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Moves the buffer into the other mutability variant without copying.
    pub fn into_policy<N: Mutability>(self) -> AdaptiveSequence<T, N> {
        AdaptiveSequence {
            buffer: self.buffer,
            front: self.front,
            len: self.len,
            _policy: PhantomData,
        }
    }

    pub fn iter(&self) -> Iter<'_, T>
    where
        T: Clone + 'static,
    {
        Iter::new(self)
    }

    pub fn map<U, F>(&self, f: F) -> AdaptiveSequence<U, M>
    where
        F: FnMut(&T) -> U,
    {
        self.items().map(f).collect()
    }

    pub fn filter<F>(&self, mut pred: F) -> Self
    where
        T: Clone,
        F: FnMut(&T) -> bool,
    {
        self.items().filter(|item| pred(*item)).cloned().collect()
    }

    /// Pairs elements position by position, stopping at the shorter input.
    pub fn zip<U, N>(&self, other: &AdaptiveSequence<U, N>) -> AdaptiveSequence<(T, U), M>
    where
        T: Clone,
        U: Clone,
        N: Mutability,
    {
        self.items()
            .zip(other.items())
            .map(|(a, b)| (a.clone(), b.clone()))
            .collect()
    }

    fn items(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.buffer[self.front..self.front + self.len].iter().flatten()
    }

    fn slot(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }
        self.buffer[self.front + index].as_ref()
    }

    fn slot_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len {
            return None;
        }
        self.buffer[self.front + index].as_mut()
    }

    fn grow(&mut self) {
        let old_capacity = self.buffer.len();
        let new_capacity = (old_capacity * 2).max(1);
        let new_front = new_capacity / 4;
        trace!(
            old_capacity,
            new_capacity,
            len = self.len,
            front = new_front,
            "grow adaptive buffer"
        );

        let mut block = empty_block(new_capacity);
        let old = &mut self.buffer[self.front..self.front + self.len];
        for (dst, src) in block[new_front..new_front + self.len].iter_mut().zip(old) {
            *dst = src.take();
        }
        self.buffer = block;
        self.front = new_front;
    }

    fn push_back(&mut self, item: T) {
        if self.len == 0 {
            if self.buffer.is_empty() {
                self.grow();
            }
            self.front = self.buffer.len() / 2;
        } else if self.front + self.len >= self.buffer.len() {
            self.grow();
        }
        self.buffer[self.front + self.len] = Some(item);
        self.len += 1;
    }

    fn push_front(&mut self, item: T) {
        if self.len == 0 {
            if self.buffer.is_empty() {
                self.grow();
            }
            self.front = self.buffer.len() / 2;
        } else {
            // Blocks below 4 slots leave no front headroom after one doubling.
            while self.front == 0 {
                self.grow();
            }
            self.front -= 1;
        }
        self.buffer[self.front] = Some(item);
        self.len += 1;
    }
}

impl<T: Clone + 'static, M: Mutability> Sequence<T> for AdaptiveSequence<T, M> {
    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> Result<&T> {
        let len = self.len;
        self.slot(index).ok_or_else(|| OutOfRange::index(index, len))
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.slot_mut(index)
            .ok_or_else(|| OutOfRange::index(index, len))
    }

    fn is_mutable(&self) -> bool {
        M::MUTABLE
    }

    fn create_empty(&self) -> Box<dyn Sequence<T>> {
        Box::new(Self::new())
    }

    fn append_in_place(&mut self, item: T) {
        self.push_back(item);
    }

    fn prepend_in_place(&mut self, item: T) {
        self.push_front(item);
    }

    fn append(&mut self, item: T) -> Handle<'_, T> {
        let mut operand = M::operand(self);
        operand.push_back(item);
        operand.into_handle()
    }

    fn prepend(&mut self, item: T) -> Handle<'_, T> {
        let mut operand = M::operand(self);
        operand.push_front(item);
        operand.into_handle()
    }

    fn insert_at(&mut self, item: T, index: usize) -> Result<Handle<'_, T>> {
        if index > self.len {
            return Err(OutOfRange::index(index, self.len));
        }
        if index == 0 {
            return Ok(self.prepend(item));
        }
        if index == self.len {
            return Ok(self.append(item));
        }
        Ok(Handle::Fresh(rebuild::insert(&*self, item, index)))
    }

    fn concat(&self, other: &dyn Sequence<T>) -> Box<dyn Sequence<T>> {
        rebuild::concat(self, other)
    }

    fn subsequence(&self, start: usize, end: usize) -> Result<Box<dyn Sequence<T>>> {
        rebuild::subsequence(self, start, end)
    }
}

impl<T, M: Mutability> Default for AdaptiveSequence<T, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, M: Mutability> Clone for AdaptiveSequence<T, M> {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer.clone(),
            front: self.front,
            len: self.len,
            _policy: PhantomData,
        }
    }
}

impl<T, M: Mutability> From<Vec<T>> for AdaptiveSequence<T, M> {
    fn from(items: Vec<T>) -> Self {
        let len = items.len();
        let mut buffer = empty_block(capacity_for(len));
        for (slot, item) in buffer.iter_mut().zip(items) {
            *slot = Some(item);
        }
        Self {
            buffer,
            front: 0,
            len,
            _policy: PhantomData,
        }
    }
}

impl<T, M: Mutability> FromIterator<T> for AdaptiveSequence<T, M> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<T, M: Mutability> Index<usize> for AdaptiveSequence<T, M> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.slot(index) {
            Some(item) => item,
            None => panic!(
                "index {index} out of range for sequence of length {}",
                self.len
            ),
        }
    }
}

impl<T, M: Mutability> IndexMut<usize> for AdaptiveSequence<T, M> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.slot_mut(index) {
            Some(item) => item,
            None => panic!("index {index} out of range for sequence of length {len}"),
        }
    }
}

impl<'a, T: Clone + 'static, M: Mutability> IntoIterator for &'a AdaptiveSequence<T, M> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: PartialEq, M: Mutability, N: Mutability> PartialEq<AdaptiveSequence<T, N>>
    for AdaptiveSequence<T, M>
{
    fn eq(&self, other: &AdaptiveSequence<T, N>) -> bool {
        self.len == other.len && self.items().eq(other.items())
    }
}

impl<T: Eq, M: Mutability> Eq for AdaptiveSequence<T, M> {}

impl<T: fmt::Debug, M: Mutability> fmt::Debug for AdaptiveSequence<T, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ImmutableAdaptiveSequence, MutableAdaptiveSequence};
    use crate::error::OutOfRange;
    use crate::policy::Immutable;
    use crate::traits::Sequence;
    use std::collections::VecDeque;

    #[test]
    fn capacity_rounds_to_power_of_two() {
        assert_eq!(MutableAdaptiveSequence::<u32>::new().capacity(), 0);
        assert_eq!(MutableAdaptiveSequence::<u32>::with_capacity(3).capacity(), 4);
        assert_eq!(MutableAdaptiveSequence::<u32>::with_capacity(8).capacity(), 8);
        assert_eq!(MutableAdaptiveSequence::from_slice(&[1, 2, 3, 4, 5]).capacity(), 8);
        assert_eq!(MutableAdaptiveSequence::<u32>::from_slice(&[]).capacity(), 0);
    }

    #[test]
    fn first_element_lands_at_midpoint() {
        let mut seq = MutableAdaptiveSequence::with_capacity(8);
        let _ = seq.append(7_u32);
        assert_eq!(seq.front, 4);

        let mut seq = MutableAdaptiveSequence::with_capacity(8);
        let _ = seq.prepend(7_u32);
        assert_eq!(seq.front, 4);
        assert_eq!(seq.capacity(), 8);
    }

    #[test]
    fn growth_rebases_at_quarter_capacity() {
        let mut seq = MutableAdaptiveSequence::new();
        for value in 1..=4_u32 {
            let _ = seq.append(value);
        }
        assert_eq!(seq.capacity(), 8);
        assert_eq!(seq.front, seq.capacity() / 4);
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn prepend_on_packed_run_grows_front() {
        let mut seq = MutableAdaptiveSequence::from_slice(&[1, 2, 3, 4_u32]);
        assert_eq!(seq.front, 0);
        let _ = seq.prepend(0);
        assert_eq!(seq.capacity(), 8);
        assert_eq!(seq.front, 1);
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn prepend_from_single_slot_block() {
        let mut seq = MutableAdaptiveSequence::new();
        let _ = seq.append(2_u32);
        assert_eq!(seq.capacity(), 1);
        let _ = seq.prepend(1);
        assert_eq!(seq.capacity(), 4);
        assert_eq!(seq.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn alternating_ends_grow_logarithmically() {
        const OPS: usize = 1_000;
        let mut seq = MutableAdaptiveSequence::new();
        let mut oracle = VecDeque::new();
        let mut reallocations = 0;
        let mut capacity = seq.capacity();

        for i in 0..OPS {
            if i % 2 == 0 {
                let _ = seq.append(i);
                oracle.push_back(i);
            } else {
                let _ = seq.prepend(i);
                oracle.push_front(i);
            }
            if seq.capacity() != capacity {
                assert!(seq.capacity() > capacity);
                assert!(seq.capacity().is_power_of_two());
                capacity = seq.capacity();
                reallocations += 1;
            }
        }

        let log = (usize::BITS - OPS.leading_zeros()) as usize;
        assert!(reallocations <= 2 * log, "reallocations={reallocations}");
        assert_eq!(seq.len(), OPS);
        assert!(seq.iter().eq(oracle.iter()));
    }

    #[test]
    fn spare_capacity_is_not_addressable() {
        let mut seq = MutableAdaptiveSequence::with_capacity(16);
        let _ = seq.append(1_u32);
        assert_eq!(seq.get(1), Err(OutOfRange::Index { index: 1, len: 1 }));
        assert!(seq.get_mut(15).is_err());
    }

    #[test]
    fn clone_owns_its_buffer() {
        let original = MutableAdaptiveSequence::from_slice(&[1, 2, 3_u32]);
        let mut copy = original.clone();
        copy[1] = 20;
        let _ = copy.append(4);
        assert_eq!(original.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(copy.iter().copied().collect::<Vec<_>>(), vec![1, 20, 3, 4]);
    }

    #[test]
    fn into_policy_keeps_contents() {
        let mut seq = MutableAdaptiveSequence::new();
        for value in [3, 1, 4_u32] {
            let _ = seq.prepend(value);
        }
        let capacity = seq.capacity();
        let mut frozen = seq.into_policy::<Immutable>();
        assert!(!frozen.is_mutable());
        assert_eq!(frozen.capacity(), capacity);
        assert_eq!(frozen.iter().copied().collect::<Vec<_>>(), vec![4, 1, 3]);

        let next = frozen.append(1).into_fresh();
        assert!(next.is_some());
        assert_eq!(frozen.len(), 3);
    }

    #[test]
    fn map_filter_zip_keep_policy() {
        let seq = ImmutableAdaptiveSequence::from_slice(&[10, 20, 30_i64]);

        let mapped = seq.map(|x| x + 1);
        assert!(!Sequence::is_mutable(&mapped));
        assert_eq!(mapped, ImmutableAdaptiveSequence::from_slice(&[11, 21, 31]));

        let filtered = seq.filter(|&x| x > 10);
        assert_eq!(filtered.iter().copied().collect::<Vec<_>>(), vec![20, 30]);

        let words = MutableAdaptiveSequence::from_slice(&["a", "b"]);
        let zipped = seq.zip(&words);
        assert_eq!(zipped.len(), 2);
        assert_eq!(zipped[1], (20, "b"));
    }

    #[test]
    fn equality_ignores_layout() {
        let packed = MutableAdaptiveSequence::from_slice(&[1, 2, 3_u32]);
        let mut centered = ImmutableAdaptiveSequence::with_capacity(64);
        for value in [1, 2, 3] {
            centered.append_in_place(value);
        }
        assert_ne!(packed.capacity(), centered.capacity());
        assert_eq!(packed, centered);
    }

    #[test]
    fn debug_prints_logical_order() {
        let mut seq = MutableAdaptiveSequence::new();
        let _ = seq.append(2_u32);
        let _ = seq.prepend(1);
        let _ = seq.append(3);
        assert_eq!(format!("{seq:?}"), "[1, 2, 3]");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_panics_past_len() {
        let seq = MutableAdaptiveSequence::from_slice(&[1_u32]);
        std::hint::black_box(seq[1]);
    }
}
