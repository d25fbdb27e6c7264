use std::time::Instant;

use crate::error::StoreError;
use crate::id::StackId;

/// One bounded LIFO sequence of signed 64-bit integers.
///
/// The end of `values` is the top of the stack. The element capacity is
/// owned by the store and passed into each growing operation, so an entry
/// never outgrows the limits of the store that holds it.
#[derive(Debug)]
pub struct StackEntry {
    id: StackId,
    values: Vec<i64>,
    deadline: Instant,
}

impl StackEntry {
    /// Creates an empty stack that expires at `deadline` if never touched.
    #[must_use]
    pub fn new(id: StackId, deadline: Instant) -> Self {
        Self { id, values: Vec::new(), deadline }
    }

    /// The identifier this entry is stored under.
    #[must_use]
    pub fn id(&self) -> StackId {
        self.id
    }

    /// Current number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the stack holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The instant after which the sweep may reclaim this entry.
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Pushes the expiry out to a new deadline.
    pub fn touch(&mut self, deadline: Instant) {
        self.deadline = deadline;
    }

    /// Appends one value, subject to the element capacity `cap`.
    ///
    /// The value is appended first and rolled back if the stack is now over
    /// capacity. For a single push this is indistinguishable from a
    /// pre-check; the loop in [`StackEntry::push_bulk`] relies on the
    /// per-element shape.
    ///
    /// # Errors
    /// [`StoreError::StackOverflow`] if the stack is already full; the
    /// stack is unchanged.
    pub fn push(&mut self, value: i64, cap: usize) -> Result<(), StoreError> {
        self.values.push(value);
        if self.values.len() > cap {
            self.values.pop();
            return Err(StoreError::StackOverflow(cap));
        }
        Ok(())
    }

    /// Appends a batch of values one at a time, in input order.
    ///
    /// Not atomic: on overflow, the elements already appended stay
    /// committed and only the offending element is rolled back. A caller
    /// seeing [`StoreError::StackOverflow`] must treat the batch as
    /// partially applied and re-query the size to learn how much.
    ///
    /// # Errors
    /// [`StoreError::MissingValues`] if the batch is empty (nothing
    /// appended), or [`StoreError::StackOverflow`] on the first element
    /// that does not fit.
    pub fn push_bulk(&mut self, values: &[i64], cap: usize) -> Result<(), StoreError> {
        if values.is_empty() {
            return Err(StoreError::MissingValues);
        }
        for &value in values {
            self.push(value, cap)?;
        }
        Ok(())
    }

    /// Removes and returns the top element.
    ///
    /// # Errors
    /// [`StoreError::Underflow`] if the stack is empty.
    pub fn pop(&mut self) -> Result<i64, StoreError> {
        self.values.pop().ok_or(StoreError::Underflow)
    }

    /// Removes exactly `count` elements, returned most-recently-pushed
    /// first.
    ///
    /// Atomic: the size is checked up front, so either all `count`
    /// elements come off or none do.
    ///
    /// # Errors
    /// [`StoreError::Underflow`] if fewer than `count` elements are
    /// present; the stack is unchanged.
    pub fn pop_bulk(&mut self, count: usize) -> Result<Vec<i64>, StoreError> {
        if self.values.len() < count {
            return Err(StoreError::Underflow);
        }
        let mut popped = self.values.split_off(self.values.len() - count);
        popped.reverse();
        Ok(popped)
    }

    /// Returns the top element without removing it.
    ///
    /// # Errors
    /// [`StoreError::Empty`] if the stack has no elements.
    pub fn peek(&self) -> Result<i64, StoreError> {
        self.values.last().copied().ok_or(StoreError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry() -> StackEntry {
        StackEntry::new(StackId(1), Instant::now() + Duration::from_secs(3600))
    }

    #[test]
    fn push_then_pop_is_lifo() {
        let mut e = entry();
        e.push(5, 10).expect("push within capacity");
        e.push(7, 10).expect("push within capacity");
        assert_eq!(e.len(), 2);
        assert_eq!(e.pop(), Ok(7));
        assert_eq!(e.pop(), Ok(5));
        assert_eq!(e.pop(), Err(StoreError::Underflow));
    }

    #[test]
    fn push_at_capacity_rolls_back() {
        let mut e = entry();
        for v in 0..3 {
            e.push(v, 3).expect("push within capacity");
        }
        assert_eq!(e.push(99, 3), Err(StoreError::StackOverflow(3)));
        assert_eq!(e.len(), 3, "failed push must leave the size unchanged");
        assert_eq!(e.peek(), Ok(2), "failed push must not disturb the top");
    }

    #[test]
    fn push_bulk_commits_prefix_on_overflow() {
        let mut e = entry();
        e.push_bulk(&[1, 2, 3], 5).expect("batch fits");
        assert_eq!(e.push_bulk(&[10, 20, 30, 40], 5), Err(StoreError::StackOverflow(5)));
        assert_eq!(e.len(), 5, "prefix up to capacity stays committed");
        assert_eq!(e.pop_bulk(5), Ok(vec![20, 10, 3, 2, 1]));
    }

    #[test]
    fn push_bulk_rejects_empty_batch() {
        let mut e = entry();
        assert_eq!(e.push_bulk(&[], 10), Err(StoreError::MissingValues));
        assert!(e.is_empty());
    }

    #[test]
    fn pop_bulk_returns_top_first() {
        let mut e = entry();
        e.push_bulk(&[1, 2, 3, 4, 5], 10).expect("batch fits");
        assert_eq!(e.pop_bulk(3), Ok(vec![5, 4, 3]));
        assert_eq!(e.len(), 2);
    }

    #[test]
    fn pop_bulk_excess_count_leaves_stack_untouched() {
        let mut e = entry();
        e.push_bulk(&[1, 2, 3], 10).expect("batch fits");
        assert_eq!(e.pop_bulk(4), Err(StoreError::Underflow));
        assert_eq!(e.len(), 3, "atomic pop must not partially drain");
        assert_eq!(e.peek(), Ok(3));
    }

    #[test]
    fn pop_bulk_zero_is_a_no_op() {
        let mut e = entry();
        e.push(1, 10).expect("push within capacity");
        assert_eq!(e.pop_bulk(0), Ok(vec![]));
        assert_eq!(e.len(), 1);
    }

    #[test]
    fn peek_does_not_mutate() {
        let mut e = entry();
        assert_eq!(e.peek(), Err(StoreError::Empty));
        e.push(42, 10).expect("push within capacity");
        assert_eq!(e.peek(), Ok(42));
        assert_eq!(e.peek(), Ok(42));
        assert_eq!(e.len(), 1);
    }

    #[test]
    fn extreme_values_round_trip() {
        let mut e = entry();
        e.push(i64::MIN, 10).expect("push within capacity");
        e.push(i64::MAX, 10).expect("push within capacity");
        assert_eq!(e.pop(), Ok(i64::MAX));
        assert_eq!(e.pop(), Ok(i64::MIN));
    }

    #[test]
    fn touch_moves_the_deadline() {
        let mut e = entry();
        let later = e.deadline() + Duration::from_secs(3600);
        e.touch(later);
        assert_eq!(e.deadline(), later);
    }
}
