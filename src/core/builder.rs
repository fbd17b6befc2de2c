use std::sync::Arc;

use super::{config::Config, dispatcher::Dispatcher};
use crate::subscribers::Subscribe;

/// Builder for constructing a [`Dispatcher`] with an initial set of subscribers.
pub struct DispatcherBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
        }
    }

    /// Sets the initial subscribers, in registration order.
    ///
    /// Duplicated instances are registered once.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Appends one subscriber to the initial set.
    pub fn with_subscriber(mut self, subscriber: Arc<dyn Subscribe>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// Builds the dispatcher and starts its worker pool.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Arc<Dispatcher> {
        let dispatcher = Dispatcher::new(self.cfg);
        for sub in self.subscribers {
            dispatcher.register(sub);
        }
        Arc::new(dispatcher)
    }
}
