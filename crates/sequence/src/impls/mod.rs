pub mod adaptive;

pub use adaptive::{AdaptiveSequence, ImmutableAdaptiveSequence, MutableAdaptiveSequence};
