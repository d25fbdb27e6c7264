//! Plain-text HTTP facade over the stack store.
//!
//! Translates query-string parameters into [`stackd_core::StackStore`]
//! operations and renders results as `text/plain` bodies: 200/201 on
//! success, 400 for refused operations and malformed parameters, 404 for
//! unknown stacks.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod error;
pub mod routes;
