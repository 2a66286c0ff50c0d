//! Kind-agnostic derived operations.
//!
//! Each builds its result through `create_empty` and the in-place append
//! primitive, so any backing store can reuse them unchanged.

use tracing::debug;

use crate::error::{OutOfRange, Result};
use crate::traits::Sequence;

/// Copies `seq` into a fresh sequence with `item` placed at `index`.
///
/// `index` must already be validated against `0..=seq.len()`.
pub fn insert<T: Clone + 'static>(
    seq: &dyn Sequence<T>,
    item: T,
    index: usize,
) -> Box<dyn Sequence<T>> {
    debug_assert!(index <= seq.len());
    debug!(index, len = seq.len(), "rebuilding sequence for interior insert");

    let mut fresh = seq.create_empty();
    let mut items = seq.iter();
    for value in items.by_ref().take(index) {
        fresh.append_in_place(value.clone());
    }
    fresh.append_in_place(item);
    for value in items {
        fresh.append_in_place(value.clone());
    }
    fresh
}

pub fn concat<T: Clone + 'static>(
    seq: &dyn Sequence<T>,
    other: &dyn Sequence<T>,
) -> Box<dyn Sequence<T>> {
    let mut fresh = seq.create_empty();
    for value in seq.iter().chain(other.iter()) {
        fresh.append_in_place(value.clone());
    }
    fresh
}

/// Copies the closed range `[start, end]`.
///
/// Fails when `seq` is empty, `end >= seq.len()` or `start > end`.
pub fn subsequence<T: Clone + 'static>(
    seq: &dyn Sequence<T>,
    start: usize,
    end: usize,
) -> Result<Box<dyn Sequence<T>>> {
    let len = seq.len();
    if len == 0 {
        return Err(OutOfRange::empty());
    }
    if start > end || end >= len {
        return Err(OutOfRange::range(start, end, len));
    }

    let mut fresh = seq.create_empty();
    for value in seq.iter().skip(start).take(end - start + 1) {
        fresh.append_in_place(value.clone());
    }
    Ok(fresh)
}

/// Copies every element `pred` accepts, in order.
pub fn filter<T: Clone + 'static>(
    seq: &dyn Sequence<T>,
    pred: &mut dyn FnMut(&T) -> bool,
) -> Box<dyn Sequence<T>> {
    let mut fresh = seq.create_empty();
    for value in seq.iter() {
        if pred(value) {
            fresh.append_in_place(value.clone());
        }
    }
    fresh
}

pub fn map<T: Clone + 'static>(
    seq: &dyn Sequence<T>,
    f: &mut dyn FnMut(&T) -> T,
) -> Box<dyn Sequence<T>> {
    let mut fresh = seq.create_empty();
    for value in seq.iter() {
        fresh.append_in_place(f(value));
    }
    fresh
}
