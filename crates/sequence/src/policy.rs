use std::ops::{Deref, DerefMut};

use crate::traits::{Handle, Sequence};

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Mutable {}
    impl Sealed for super::Immutable {}
}

/// Picks the operand of a mutating call.
///
/// This hook is the only thing that differs between the mutable and the
/// immutable flavour of a backing store; every buffer algorithm is shared.
pub trait Mutability: sealed::Sealed + Sized + 'static {
    const MUTABLE: bool;

    fn operand<S: Clone>(seq: &mut S) -> Operand<'_, S>;
}

/// Mutates the receiver in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Mutable;

/// Mutates a deep copy and leaves the receiver untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Immutable;

impl Mutability for Mutable {
    const MUTABLE: bool = true;

    fn operand<S: Clone>(seq: &mut S) -> Operand<'_, S> {
        Operand::Receiver(seq)
    }
}

impl Mutability for Immutable {
    const MUTABLE: bool = false;

    fn operand<S: Clone>(seq: &mut S) -> Operand<'_, S> {
        Operand::Copy(seq.clone())
    }
}

/// The object a mutating call actually writes to.
pub enum Operand<'a, S> {
    Receiver(&'a mut S),
    Copy(S),
}

impl<'a, S> Operand<'a, S> {
    pub fn into_handle<T>(self) -> Handle<'a, T>
    where
        T: Clone + 'static,
        S: Sequence<T> + 'static,
    {
        match self {
            Self::Receiver(seq) => Handle::Same(seq),
            Self::Copy(seq) => Handle::Fresh(Box::new(seq)),
        }
    }
}

impl<S> Deref for Operand<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        match self {
            Self::Receiver(seq) => seq,
            Self::Copy(seq) => seq,
        }
    }
}

impl<S> DerefMut for Operand<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        match self {
            Self::Receiver(seq) => seq,
            Self::Copy(seq) => seq,
        }
    }
}
