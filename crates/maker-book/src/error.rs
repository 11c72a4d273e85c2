//! Order book error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookError {
    /// The delta's sequence number does not follow the book's current
    /// sequence by exactly one. The book must be discarded and rebuilt
    /// from a fresh snapshot.
    #[error("Sequence gap: expected {expected}, got {got}")]
    SequenceGap { expected: u64, got: u64 },
}

pub type BookResult<T> = Result<T, BookError>;
