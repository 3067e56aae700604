//! Blocking single-flight table: concurrent callers with the same key share
//! one execution of the work. The first caller leads; the rest wait for its
//! result. If the leader unwinds without a result, each waiter runs the work
//! itself.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

enum Slot<V> {
    Pending,
    Done(V),
    Abandoned,
}

struct Flight<V> {
    slot: Mutex<Slot<V>>,
    done: Condvar,
}

/// Leader / waiter counters.
#[derive(Debug, Default)]
pub struct FlightStats {
    pub leaders: AtomicU64,
    pub waiters: AtomicU64,
}

pub struct SingleFlight<K, V> {
    flights: Mutex<HashMap<K, Arc<Flight<V>>>>,
    stats: FlightStats,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            flights: Mutex::new(HashMap::new()),
            stats: FlightStats::default(),
        }
    }

    pub fn stats(&self) -> &FlightStats {
        &self.stats
    }

    /// Number of keys currently being worked on.
    #[cfg(test)]
    pub(crate) fn in_flight(&self) -> usize {
        lock(&self.flights).len()
    }

    /// Run `work` for `key`, or wait for the caller already running it.
    pub fn run<F>(&self, key: K, work: F) -> V
    where
        F: FnOnce() -> V,
    {
        let (flight, leader) = {
            let mut flights = lock(&self.flights);
            match flights.entry(key.clone()) {
                Entry::Occupied(e) => (Arc::clone(e.get()), false),
                Entry::Vacant(e) => {
                    let flight = Arc::new(Flight {
                        slot: Mutex::new(Slot::Pending),
                        done: Condvar::new(),
                    });
                    e.insert(Arc::clone(&flight));
                    (flight, true)
                }
            }
        };

        if leader {
            self.stats.leaders.fetch_add(1, Ordering::Relaxed);
            let mut guard = LeaderGuard {
                owner: self,
                key,
                flight: &flight,
                result: None,
            };
            let value = work();
            guard.result = Some(value.clone());
            return value;
        }

        self.stats.waiters.fetch_add(1, Ordering::Relaxed);
        let mut slot = lock(&flight.slot);
        loop {
            match &*slot {
                Slot::Done(v) => return v.clone(),
                Slot::Abandoned => break,
                Slot::Pending => {}
            }
            slot = flight
                .done
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
        drop(slot);
        work()
    }
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Publishes the leader's result (or abandonment, on unwind) and clears the key.
struct LeaderGuard<'a, K: Eq + Hash, V> {
    owner: &'a SingleFlight<K, V>,
    key: K,
    flight: &'a Arc<Flight<V>>,
    result: Option<V>,
}

impl<K: Eq + Hash, V> Drop for LeaderGuard<'_, K, V> {
    fn drop(&mut self) {
        lock(&self.owner.flights).remove(&self.key);
        let mut slot = lock(&self.flight.slot);
        *slot = match self.result.take() {
            Some(v) => Slot::Done(v),
            None => Slot::Abandoned,
        };
        self.flight.done.notify_all();
    }
}
