use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{config::SupervisorConfig, reaper, shared::Shared, supervisor::Supervisor};
use crate::{
    error::SupervisorError,
    events::Bus,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a Supervisor with optional subscribers.
pub struct SupervisorBuilder {
    cfg: SupervisorConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl SupervisorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: SupervisorConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (spawns, exits, orphans, signals)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Adds one subscriber.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds and returns the Supervisor instance.
    ///
    /// This consumes the builder and initializes all runtime components:
    /// - process-wide reaper (first build only): subreaper flag, `SIGCHLD` handler, reaper thread
    /// - record store, registered with the reaper
    /// - event bus, subscriber workers and the bus listener
    ///
    /// Must be called inside a tokio runtime.
    ///
    /// ### Errors
    /// [`SupervisorError::Setup`] if the reaper cannot be installed. Treat it as fatal.
    pub fn build(self) -> Result<Arc<Supervisor>, SupervisorError> {
        let reaper = reaper::install()?;

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let shared = Arc::new(Shared::new(self.cfg.initial_capacity_clamped(), bus));
        reaper.register(&shared);

        let sup = Arc::new(Supervisor::new_internal(
            self.cfg,
            shared,
            reaper,
            CancellationToken::new(),
        ));
        sup.spawn_listener(subs);
        Ok(sup)
    }
}
