/// Failures produced by the stack store.
///
/// All variants are local and non-fatal: they describe why one operation
/// was refused and leave the store in a consistent state. The single
/// documented exception is `push_bulk`, which may have committed a prefix
/// of its batch when it reports [`StoreError::StackOverflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The identifier matches no live stack (unknown, destroyed, or expired).
    #[error("stack not found")]
    NotFound,

    /// The store already holds the maximum number of stacks.
    #[error("maximum number of stacks reached ({0})")]
    TooManyStacks(usize),

    /// Appending would grow the stack past its element capacity.
    #[error("stack overflow (capacity {0})")]
    StackOverflow(usize),

    /// An input value does not fit the signed 64-bit range.
    #[error("value out of signed 64-bit range")]
    ValueOutOfRange,

    /// A bulk push was given no values.
    #[error("no values provided")]
    MissingValues,

    /// Fewer elements are present than the pop requested.
    #[error("stack underflow")]
    Underflow,

    /// Peek on a stack with no elements.
    #[error("stack is empty")]
    Empty,
}
