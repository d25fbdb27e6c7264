use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Unique identifier for a stack in the store.
///
/// Identifiers are drawn uniformly from the full 64-bit space by a
/// cryptographically secure source, so possession of one id reveals nothing
/// about any other. The store does not check for collisions: with at most
/// [`crate::MAX_STACKS`] live entries in a 2^64 space, a collision is an
/// accepted risk rather than a handled case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct StackId(pub u64);

impl StackId {
    /// Draws a fresh random identifier from the OS CSPRNG.
    ///
    /// # Panics
    /// Panics if the operating system's entropy source is unavailable.
    #[must_use]
    pub fn random() -> Self {
        #[expect(clippy::expect_used, reason = "an unavailable entropy source is unrecoverable")]
        let raw = getrandom::u64().expect("OS entropy source unavailable");
        Self(raw)
    }

    /// Returns the raw 64-bit value.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for StackId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl FromStr for StackId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}
