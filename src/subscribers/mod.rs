//! # Event subscribers for the procvisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the `SubscriberSet` fan-out
//! and the built-in [`LogWriter`] (feature `logging`).
//!
//! ## Architecture
//! ```text
//! reaper / API ── publish(Event) ──► Bus ──► bus listener ──► SubscriberSet::emit
//!                                                                  │
//!                                                     ┌────────────┼────────────┐
//!                                                     ▼            ▼            ▼
//!                                                 LogWriter     Metrics      Custom
//! ```

mod embedded;
mod subscriber;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
pub use subscriber::Subscribe;
pub(crate) use subscriber_set::SubscriberSet;
