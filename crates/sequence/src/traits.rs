use std::fmt;
use std::iter::FusedIterator;
use std::ops::{Deref, DerefMut};

use crate::error::{OutOfRange, Result};
use crate::rebuild;

/// Ordered sequence interface shared by every backing store.
///
/// - Positions are `0..len()`. `first`/`last` fail with [`OutOfRange::Empty`]
///   on an empty sequence.
/// - `append`, `prepend` and `insert_at` return a [`Handle`]. Mutable kinds
///   hand back the receiver, immutable kinds a fresh copy that owns its own
///   storage. Callers continue with the handle.
/// - `concat` and `subsequence` always copy out into a new sequence of the
///   receiver's kind.
/// - `append_in_place`/`prepend_in_place` are the raw primitives behind the
///   public mutators. They ignore the mutability policy and are meant for
///   code filling a sequence it just obtained from `create_empty`.
pub trait Sequence<T: Clone + 'static> {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Result<&T>;

    fn get_mut(&mut self, index: usize) -> Result<&mut T>;

    fn first(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(OutOfRange::empty());
        }
        self.get(0)
    }

    fn last(&self) -> Result<&T> {
        match self.len().checked_sub(1) {
            Some(index) => self.get(index),
            None => Err(OutOfRange::empty()),
        }
    }

    fn first_mut(&mut self) -> Result<&mut T> {
        if self.is_empty() {
            return Err(OutOfRange::empty());
        }
        self.get_mut(0)
    }

    fn last_mut(&mut self) -> Result<&mut T> {
        match self.len().checked_sub(1) {
            Some(index) => self.get_mut(index),
            None => Err(OutOfRange::empty()),
        }
    }

    /// Whether mutating calls act on the receiver itself.
    fn is_mutable(&self) -> bool;

    /// A new, empty sequence of the receiver's concrete kind.
    fn create_empty(&self) -> Box<dyn Sequence<T>>;

    fn append_in_place(&mut self, item: T);

    fn prepend_in_place(&mut self, item: T);

    fn append(&mut self, item: T) -> Handle<'_, T>;

    fn prepend(&mut self, item: T) -> Handle<'_, T>;

    /// Inserts `item` so that it ends up at `index`.
    ///
    /// `index == 0` and `index == len()` behave as `prepend`/`append`. Any
    /// interior position rebuilds into a fresh sequence, for both kinds.
    fn insert_at(&mut self, item: T, index: usize) -> Result<Handle<'_, T>>;

    fn concat(&self, other: &dyn Sequence<T>) -> Box<dyn Sequence<T>>;

    /// Copies the closed range `[start, end]` into a new sequence.
    fn subsequence(&self, start: usize, end: usize) -> Result<Box<dyn Sequence<T>>>;

    /// Renders the structure of the sequence. Flat stores print a plain list;
    /// composite stores override this to show their segments.
    fn describe(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    where
        T: fmt::Debug,
    {
        let mut list = f.debug_list();
        for index in 0..self.len() {
            if let Ok(item) = self.get(index) {
                list.entry(item);
            }
        }
        list.finish()
    }
}

impl<'a, T: Clone + 'static> dyn Sequence<T> + 'a {
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self)
    }

    /// Applies `f` to every element, producing a new sequence of the same kind.
    pub fn map<F: FnMut(&T) -> T>(&self, mut f: F) -> Box<dyn Sequence<T>> {
        rebuild::map(self, &mut f)
    }

    /// Keeps the elements `pred` accepts in a new sequence of the same kind.
    pub fn filter<F: FnMut(&T) -> bool>(&self, mut pred: F) -> Box<dyn Sequence<T>> {
        rebuild::filter(self, &mut pred)
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for dyn Sequence<T> + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.describe(f)
    }
}

impl<'a, 'b: 'a, T: Clone + 'static> IntoIterator for &'a (dyn Sequence<T> + 'b) {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        Iter::new(self)
    }
}

/// The sequence a mutating call produced.
///
/// `Same` borrows the receiver (mutable kinds, and appends or prepends at the
/// ends). `Fresh` owns a new sequence that shares no storage with the
/// receiver.
#[must_use = "immutable sequences only change through the returned handle"]
pub enum Handle<'a, T: Clone + 'static> {
    Same(&'a mut (dyn Sequence<T> + 'static)),
    Fresh(Box<dyn Sequence<T>>),
}

impl<'a, T: Clone + 'static> Handle<'a, T> {
    pub fn is_same(&self) -> bool {
        matches!(self, Self::Same(_))
    }

    /// Detaches the fresh sequence, ending the borrow of the receiver.
    /// Returns `None` when the receiver itself was mutated.
    pub fn into_fresh(self) -> Option<Box<dyn Sequence<T>>> {
        match self {
            Self::Same(_) => None,
            Self::Fresh(seq) => Some(seq),
        }
    }
}

impl<T: Clone + 'static> Deref for Handle<'_, T> {
    type Target = dyn Sequence<T>;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Same(seq) => &**seq,
            Self::Fresh(seq) => &**seq,
        }
    }
}

impl<T: Clone + 'static> DerefMut for Handle<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            Self::Same(seq) => &mut **seq,
            Self::Fresh(seq) => &mut **seq,
        }
    }
}

impl<T: Clone + fmt::Debug + 'static> fmt::Debug for Handle<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

/// Forward/backward iterator over any [`Sequence`] in logical order.
///
/// A clone continues from the same position; call `iter()` again to restart.
pub struct Iter<'a, T: Clone + 'static> {
    seq: &'a dyn Sequence<T>,
    front: usize,
    back: usize,
}

impl<'a, T: Clone + 'static> Iter<'a, T> {
    pub(crate) fn new(seq: &'a dyn Sequence<T>) -> Self {
        Self {
            seq,
            front: 0,
            back: seq.len(),
        }
    }
}

impl<T: Clone + 'static> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            front: self.front,
            back: self.back,
        }
    }
}

impl<'a, T: Clone + 'static> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let item = self.seq.get(self.front).ok();
        self.front += 1;
        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.back - self.front;
        (rest, Some(rest))
    }
}

impl<T: Clone + 'static> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        self.seq.get(self.back).ok()
    }
}

impl<T: Clone + 'static> ExactSizeIterator for Iter<'_, T> {}

impl<T: Clone + 'static> FusedIterator for Iter<'_, T> {}
