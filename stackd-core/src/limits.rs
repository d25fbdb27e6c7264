use std::time::Duration;

/// Maximum number of elements a single stack may hold.
///
/// This is an element count, not a byte budget, even though it reads like
/// one (1024 * 100).
pub const MAX_STACK_SIZE: usize = 1024 * 100;

/// Maximum number of concurrently live stacks in the store.
pub const MAX_STACKS: usize = 1000;

/// Sliding idle timeout. Every operation that addresses a stack by id
/// pushes its expiry out by this much; a stack untouched for the full
/// window is reclaimed by the sweep.
pub const TTL: Duration = Duration::from_secs(60 * 60);

/// Capacity and timeout settings for a [`crate::StackStore`].
///
/// The service always runs with [`Limits::default`]; non-default values
/// exist so tests can exercise the capacity and expiry paths without
/// filling a 102 400-element stack or waiting an hour.
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    /// Ceiling on concurrently live stacks.
    pub max_stacks: usize,
    /// Ceiling on elements per stack.
    pub max_stack_size: usize,
    /// Sliding idle timeout.
    pub ttl: Duration,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_stacks: MAX_STACKS, max_stack_size: MAX_STACK_SIZE, ttl: TTL }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_match_constants() {
        let limits = Limits::default();
        assert_eq!(limits.max_stacks, 1000);
        assert_eq!(limits.max_stack_size, 102_400);
        assert_eq!(limits.ttl, Duration::from_secs(3600));
    }
}
