//! # Supervisor configuration.
//!
//! Provides [`SupervisorConfig`] centralized settings for one supervisor instance.
//!
//! ## Sentinel values
//! - `poll_interval = 0s` → `wait_all` relies on reaper notifications only
//! - `initial_capacity` and `bus_capacity` are clamped to a minimum of 1

use std::time::Duration;

/// Configuration for a [`Supervisor`](crate::Supervisor).
///
/// ## Field semantics
/// - `initial_capacity`: initial capacity of the tracked and orphan collections
/// - `bus_capacity`: event bus ring buffer size
/// - `poll_interval`: fallback re-probe tick for `wait_all`
/// - `close_inherited_fds`: close every descriptor above stderr in spawned children
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over checking sentinels directly.
///
/// ## Example
/// ```
/// use std::time::Duration;
/// use procvisor::SupervisorConfig;
///
/// let mut cfg = SupervisorConfig::default();
/// cfg.poll_interval = Duration::ZERO;
/// assert!(cfg.poll_tick().is_none());
/// ```
#[derive(Clone, Debug)]
pub struct SupervisorConfig {
    /// Initial capacity of both record collections. Growth beyond it is amortized doubling.
    pub initial_capacity: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers lagging more than `bus_capacity` events observe `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// How often `wait_all` re-probes running records when no reaper notification arrives.
    ///
    /// - `Duration::ZERO` = never; wake only on reaper notifications
    pub poll_interval: Duration,

    /// Whether spawned children close all inherited descriptors except 0, 1 and 2.
    pub close_inherited_fds: bool,
}

impl SupervisorConfig {
    #[inline]
    pub fn initial_capacity_clamped(&self) -> usize {
        self.initial_capacity.max(1)
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the `wait_all` fallback tick as an `Option`.
    ///
    /// - `None` → notifications only
    /// - `Some(d)` → re-probe at least every `d`
    #[inline]
    pub fn poll_tick(&self) -> Option<Duration> {
        if self.poll_interval == Duration::ZERO {
            None
        } else {
            Some(self.poll_interval)
        }
    }
}

impl Default for SupervisorConfig {
    /// Default configuration:
    ///
    /// - `initial_capacity = 10`
    /// - `bus_capacity = 1024`
    /// - `poll_interval = 250ms`
    /// - `close_inherited_fds = true`
    fn default() -> Self {
        Self {
            initial_capacity: 10,
            bus_capacity: 1024,
            poll_interval: Duration::from_millis(250),
            close_inherited_fds: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = SupervisorConfig::default();
        assert_eq!(cfg.initial_capacity_clamped(), 10);
        assert_eq!(cfg.bus_capacity_clamped(), 1024);
        assert_eq!(cfg.poll_tick(), Some(Duration::from_millis(250)));
        assert!(cfg.close_inherited_fds);
    }

    #[test]
    fn zero_values_are_clamped() {
        let cfg = SupervisorConfig {
            initial_capacity: 0,
            bus_capacity: 0,
            poll_interval: Duration::ZERO,
            close_inherited_fds: false,
        };
        assert_eq!(cfg.initial_capacity_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.poll_tick(), None);
    }
}
