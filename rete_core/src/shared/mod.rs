//! A thread-safe handle serializing access to one network.
//!
//! Every insertion runs under the lock from start to finish, so callers on
//! different threads observe the same results as a single-threaded sequence
//! of insertions in lock-acquisition order.

use rete_facts::{Fact, Symbol};
use std::sync::{Arc, Mutex};

use crate::error::ReteError;
use crate::network::{NetworkStats, ReteNetwork};

/// Cloneable, mutex-guarded [`ReteNetwork`].
#[derive(Debug, Clone)]
pub struct SharedNetwork {
    inner: Arc<Mutex<ReteNetwork>>,
}

impl SharedNetwork {
    /// Wrap a fully constructed network.
    pub fn new(network: ReteNetwork) -> Self {
        Self {
            inner: Arc::new(Mutex::new(network)),
        }
    }

    /// Insert a fact, waiting for any insertion in progress on another thread.
    pub fn insert(&self, fact: Fact) -> Result<(), ReteError> {
        self.with(|network| network.insert(fact))?
    }

    /// Insert the fact `(identifier attribute value)`.
    pub fn insert_triple(
        &self,
        identifier: impl Into<Symbol>,
        attribute: impl Into<Symbol>,
        value: impl Into<Symbol>,
    ) -> Result<(), ReteError> {
        self.insert(Fact::new(identifier, attribute, value))
    }

    /// Run `f` with exclusive access to the network.
    pub fn with<R>(&self, f: impl FnOnce(&mut ReteNetwork) -> R) -> Result<R, ReteError> {
        let mut network = self.inner.lock().map_err(|_| ReteError::Poisoned)?;
        Ok(f(&mut network))
    }

    pub fn stats(&self) -> Result<NetworkStats, ReteError> {
        self.with(|network| network.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::blocks_world;
    use crate::NetworkConfig;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn test_concurrent_inserts_fire_once() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let (network, _) = blocks_world(NetworkConfig::default(), move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .unwrap();
        let shared = SharedNetwork::new(network);

        let facts = vec![
            Fact::new("b1", "on", "b2"),
            Fact::new("b2", "left_of", "b3"),
            Fact::new("b3", "color", "red"),
        ];
        let handles: Vec<_> = facts
            .into_iter()
            .map(|fact| {
                let shared = shared.clone();
                thread::spawn(move || shared.insert(fact))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(shared.stats().unwrap().rules_fired, 1);
    }

    #[test]
    fn test_with_gives_access_to_network() {
        let shared = SharedNetwork::new(ReteNetwork::default());
        shared.insert_triple("b1", "on", "b2").unwrap();

        let inserted = shared.with(|network| network.stats().facts_inserted).unwrap();
        assert_eq!(inserted, 1);
    }
}
