use tracing::debug;

use crate::config::LedgerConfig;
use crate::due::DueCalculator;
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::storage::{InMemoryStore, Storage};

/// composition root: one storage handle shared by the registry and the ledger
///
/// Registry operations live in `registry.rs`, ledger operations in
/// `ledger.rs` and report building in `report.rs`. Every write takes
/// `&mut self`, so writes are serialized for as long as one `Library` owns
/// the store.
pub struct Library<S: Storage> {
    pub(crate) store: S,
    pub(crate) config: LedgerConfig,
    pub(crate) calculator: DueCalculator,
    pub(crate) events: EventStore,
}

impl<S: Storage> Library<S> {
    /// create over an injected store, rejecting invalid configuration
    pub fn new(store: S, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        debug!(?config, "library opened");
        Ok(Self {
            store,
            calculator: DueCalculator::new(config.due_policy),
            config,
            events: EventStore::new(),
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn calculator(&self) -> &DueCalculator {
        &self.calculator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// hand the store back to the caller
    pub fn into_store(self) -> S {
        self.store
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }
}

impl Library<InMemoryStore> {
    /// library over a fresh volatile store
    pub fn in_memory(config: LedgerConfig) -> Result<Self> {
        Self::new(InMemoryStore::new(), config)
    }
}
