//! The synchronization hub (§4.7, §5): named barriers and named reentrant
//! mutexes, shared by every thread spawned for a single `call f{N}(...)`.
//!
//! Barriers provide a full happens-before across every thread rendezvousing
//! on the same name; mutexes provide acquire/release ordering on the same
//! name. Different names are fully independent of each other; the hub
//! does no cross-name deadlock detection, matching §4.7/§5's "programmers
//! must order acquisitions" stance.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::ThreadId;

use crate::error::{RailwayError, RailwayResult};

/// State for one named barrier: a rendezvous that resets after every
/// thread arrives, so the same name can be used again for a later cycle.
struct BarrierState {
    expected: usize,
    arrived: usize,
    cycle: u64,
}

/// State for one named reentrant mutex: owner thread (if held) plus
/// recursion depth, so the same thread can re-acquire it without
/// deadlocking itself.
struct MutexState {
    owner: Option<ThreadId>,
    depth: usize,
}

pub struct SyncHub {
    barriers: Mutex<HashMap<String, BarrierState>>,
    barrier_cv: Condvar,
    mutexes: Mutex<HashMap<String, MutexState>>,
    mutex_cv: Condvar,
}

impl SyncHub {
    pub fn new() -> Arc<Self> {
        Arc::new(SyncHub {
            barriers: Mutex::new(HashMap::new()),
            barrier_cv: Condvar::new(),
            mutexes: Mutex::new(HashMap::new()),
            mutex_cv: Condvar::new(),
        })
    }

    /// Block until `n_threads` total threads have all called `barrier`
    /// with this name since the last rendezvous. The barrier expected
    /// count is fixed to `n_threads` (the total thread count) per §4.7.
    pub fn barrier(&self, name: &str, n_threads: usize) -> RailwayResult<()> {
        if n_threads == 0 {
            return Err(RailwayError::sync_error("barrier with zero threads"));
        }
        let mut barriers = self.barriers.lock().expect("sync hub mutex poisoned");
        let state = barriers.entry(name.to_string()).or_insert(BarrierState {
            expected: n_threads,
            arrived: 0,
            cycle: 0,
        });
        if state.expected != n_threads {
            return Err(RailwayError::sync_error(format!(
                "barrier '{name}' expected-count mismatch: {} vs {}",
                state.expected, n_threads
            )));
        }
        let my_cycle = state.cycle;
        state.arrived += 1;
        if state.arrived == state.expected {
            state.arrived = 0;
            state.cycle += 1;
            self.barrier_cv.notify_all();
            Ok(())
        } else {
            let _guard = self
                .barrier_cv
                .wait_while(barriers, |b| {
                    b.get(name).map(|s| s.cycle).unwrap_or(my_cycle) == my_cycle
                })
                .expect("sync hub mutex poisoned");
            Ok(())
        }
    }

    /// Acquire the named mutex, run `body`, then release (released on
    /// every exit path (including an `Err` from `body`) because
    /// [`MutexGuard`] releases on `Drop`.
    pub fn with_mutex<T>(
        self: &Arc<Self>,
        name: &str,
        body: impl FnOnce() -> RailwayResult<T>,
    ) -> RailwayResult<T> {
        let _guard = MutexGuard::acquire(self.clone(), name.to_string());
        body()
    }

    fn acquire(&self, name: &str) {
        let me = std::thread::current().id();
        let mut mutexes = self.mutexes.lock().expect("sync hub mutex poisoned");
        loop {
            let state = mutexes
                .entry(name.to_string())
                .or_insert(MutexState { owner: None, depth: 0 });
            match state.owner {
                None => {
                    state.owner = Some(me);
                    state.depth = 1;
                    return;
                }
                Some(owner) if owner == me => {
                    state.depth += 1;
                    return;
                }
                Some(_) => {
                    mutexes = self.mutex_cv.wait(mutexes).expect("sync hub mutex poisoned");
                }
            }
        }
    }

    fn release(&self, name: &str) {
        let me = std::thread::current().id();
        let mut mutexes = self.mutexes.lock().expect("sync hub mutex poisoned");
        if let Some(state) = mutexes.get_mut(name) {
            if state.owner == Some(me) {
                state.depth -= 1;
                if state.depth == 0 {
                    state.owner = None;
                    self.mutex_cv.notify_all();
                }
            }
        }
    }
}

/// RAII guard releasing the named mutex on drop, including on unwind.
struct MutexGuard {
    hub: Arc<SyncHub>,
    name: String,
}

impl MutexGuard {
    fn acquire(hub: Arc<SyncHub>, name: String) -> Self {
        hub.acquire(&name);
        MutexGuard { hub, name }
    }
}

impl Drop for MutexGuard {
    fn drop(&mut self) {
        self.hub.release(&self.name);
    }
}
