mod error;
mod policy;
mod traits;

pub mod impls;
pub mod rebuild;

pub use error::{OutOfRange, Result};
pub use impls::{AdaptiveSequence, ImmutableAdaptiveSequence, MutableAdaptiveSequence};
pub use policy::{Immutable, Mutability, Mutable, Operand};
pub use traits::{Handle, Iter, Sequence};
