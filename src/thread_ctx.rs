//! Per-thread execution context (§3, §5): identity, the thread's private
//! scope stack, and shared handles to the module registry and
//! synchronization hub.

use std::sync::Arc;

use crate::error::{RailwayError, RailwayResult};
use crate::eval_expr::NameResolver;
use crate::registry::ModuleRegistry;
use crate::scope::Scope;
use crate::sync::SyncHub;
use crate::value::Value;

pub struct ThreadContext {
    pub tid: usize,
    pub n_threads: usize,
    pub module: String,
    pub registry: Arc<ModuleRegistry>,
    pub hub: Arc<SyncHub>,
    /// The call stack: top frame is `scopes.last()`. Lookup only ever
    /// consults the current (topmost) frame plus module globals (Railway
    /// has no lexical nesting across call boundaries (§3).
    pub scopes: Vec<Scope>,
}

impl ThreadContext {
    pub fn new(tid: usize, n_threads: usize, module: String, registry: Arc<ModuleRegistry>, hub: Arc<SyncHub>) -> Self {
        ThreadContext { tid, n_threads, module, registry, hub, scopes: vec![Scope::new()] }
    }

    pub fn scope(&self) -> &Scope {
        self.scopes.last().expect("thread context always has a frame")
    }

    pub fn scope_mut(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("thread context always has a frame")
    }

    pub fn push_frame(&mut self, frame: Scope) {
        self.scopes.push(frame);
    }

    pub fn pop_frame(&mut self) -> Scope {
        self.scopes.pop().expect("pop_frame called on empty call stack")
    }

    /// Run `body` inside a module's context (used by a call to an
    /// imported function, which runs with that module's globals rather
    /// than the caller's).
    pub fn with_module<R>(&mut self, module: &str, body: impl FnOnce(&mut Self) -> RailwayResult<R>) -> RailwayResult<R> {
        if !self.registry.has_module(module) {
            return Err(RailwayError::load_error(format!("unknown module '{module}'")));
        }
        let previous = std::mem::replace(&mut self.module, module.to_string());
        let result = body(self);
        self.module = previous;
        result
    }
}

impl NameResolver for ThreadContext {
    fn resolve_global(&self, name: &str) -> RailwayResult<Value> {
        self.registry.resolve_global(&self.module, name)
    }

    fn thread_id(&self) -> usize {
        self.tid
    }

    fn num_threads(&self) -> usize {
        self.n_threads
    }
}
