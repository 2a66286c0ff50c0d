use thiserror::Error;
use tracing::debug;

pub type Result<T> = std::result::Result<T, OutOfRange>;

/// The single fault kind of the sequence contract.
///
/// Raised before any state is touched, so a failed call leaves the receiver
/// exactly as it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OutOfRange {
    #[error("sequence is empty")]
    Empty,

    #[error("index {index} out of range for sequence of length {len}")]
    Index { index: usize, len: usize },

    #[error("invalid range [{start}, {end}] for sequence of length {len}")]
    Range { start: usize, end: usize, len: usize },
}

impl OutOfRange {
    pub(crate) fn empty() -> Self {
        debug!("access to empty sequence");
        Self::Empty
    }

    pub(crate) fn index(index: usize, len: usize) -> Self {
        debug!(index, len, "index out of range");
        Self::Index { index, len }
    }

    pub(crate) fn range(start: usize, end: usize, len: usize) -> Self {
        debug!(start, end, len, "invalid range");
        Self::Range { start, end, len }
    }
}
