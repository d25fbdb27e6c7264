//! In-memory store of capacity-bounded integer stacks.
//!
//! Each stack is an independent LIFO sequence of `i64` values, addressed by
//! an unguessable 64-bit identifier and reclaimed after an idle timeout.
//! This crate holds the data structures and their invariants only; the HTTP
//! surface lives in `stackd-gateway`.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod entry;
pub mod error;
pub mod id;
pub mod limits;
pub mod store;

pub use entry::StackEntry;
pub use error::StoreError;
pub use id::StackId;
pub use limits::{Limits, MAX_STACKS, MAX_STACK_SIZE, TTL};
pub use store::{StackStore, StackSummary, StoreSummary};
