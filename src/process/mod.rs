//! # Process specifications.
//!
//! - [`ProcessSpec`] - argv plus standard stream redirections
//! - [`Redirect`] - source of one standard stream

mod spec;

pub use spec::{ProcessSpec, Redirect};
