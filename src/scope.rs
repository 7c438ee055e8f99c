//! Scope frames and the reversibility discipline (§4.2).
//!
//! A frame maps name to storage cell. Storage is a reference-counted,
//! mutex-guarded cell (`Arc<Mutex<Value>>`) rather than a bare [`Value`],
//! because Railway's calling convention binds borrow/in-out parameters *by
//! alias*: the callee must see and mutate the exact same storage the
//! caller named, including across the OS threads spawned by a parallel
//! `call f{N}(...)`. A plain owned `Value` could not be shared that way.
//!
//! Every `let` is eventually matched by an `unlet` whose (optional) value
//! expression is checked against the name's current value before removal.
//! Names with a leading `.` are monodirectional and are exempt from that
//! obligation; they are silently dropped when the scope that introduced
//! them ends.

use std::sync::{Arc, Mutex};

use indexmap::IndexMap;

use crate::ast::is_mono;
use crate::error::{RailwayError, RailwayResult};
use crate::value::Value;

pub type Cell = Arc<Mutex<Value>>;

#[derive(Debug, Clone)]
struct Entry {
    cell: Cell,
    mono: bool,
}

/// A single scope frame: the locals of one active call (or the top level).
#[derive(Debug, Clone, Default)]
pub struct Scope {
    entries: IndexMap<String, Entry>,
}

impl Scope {
    pub fn new() -> Self {
        Scope { entries: IndexMap::new() }
    }

    /// Introduce `name` bound to a fresh, unshared cell holding `value`.
    pub fn let_(&mut self, name: &str, value: Value) -> RailwayResult<()> {
        self.let_cell(name, Arc::new(Mutex::new(value)))
    }

    /// Introduce `name` sharing an existing cell, the call dispatcher's
    /// alias binding for borrow/in-out parameters.
    pub fn let_cell(&mut self, name: &str, cell: Cell) -> RailwayResult<()> {
        if self.entries.contains_key(name) {
            return Err(RailwayError::scope_error(format!("duplicate let of '{name}'")));
        }
        self.entries.insert(name.to_string(), Entry { cell, mono: is_mono(name) });
        Ok(())
    }

    /// Remove `name`, optionally checking it currently equals `expected`.
    /// A mismatch is a [`RailwayError::ReversibilityViolation`]; this is
    /// the "unlet checks value against an expression" integrity check.
    pub fn unlet(&mut self, name: &str, expected: Option<&Value>) -> RailwayResult<Value> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| RailwayError::scope_error(format!("unlet of undefined name '{name}'")))?
            .clone();
        let current = entry.cell.lock().expect("scope mutex poisoned").clone();
        if let Some(expected) = expected {
            if &current != expected {
                return Err(RailwayError::reversibility(format!(
                    "unlet '{name}' expected {expected} but found {current}"
                )));
            }
        }
        self.entries.shift_remove(name);
        Ok(current)
    }

    pub fn get(&self, name: &str) -> RailwayResult<Value> {
        Ok(self.cell(name)?.lock().expect("scope mutex poisoned").clone())
    }

    pub fn set(&self, name: &str, value: Value) -> RailwayResult<()> {
        *self.cell(name)?.lock().expect("scope mutex poisoned") = value;
        Ok(())
    }

    /// Run `f` against the current value of `name`, writing back whatever
    /// `f` returns. Used by indexed assignment and modops so the lock is
    /// held for the whole read-modify-write.
    pub fn with_value_mut<R>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Value) -> RailwayResult<R>,
    ) -> RailwayResult<R> {
        let cell = self.cell(name)?;
        let mut guard = cell.lock().expect("scope mutex poisoned");
        f(&mut guard)
    }

    fn cell(&self, name: &str) -> RailwayResult<Cell> {
        self.entries
            .get(name)
            .map(|e| e.cell.clone())
            .ok_or_else(|| RailwayError::scope_error(format!("undefined name '{name}'")))
    }

    /// Clone out the alias cell for `name`, for binding into a callee's
    /// borrow/in-out parameter.
    pub fn alias_cell(&self, name: &str) -> RailwayResult<Cell> {
        self.cell(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_mono(&self, name: &str) -> RailwayResult<bool> {
        self.entries
            .get(name)
            .map(|e| e.mono)
            .ok_or_else(|| RailwayError::scope_error(format!("undefined name '{name}'")))
    }

    /// Remove a mono name, bypassing the unlet value check (used by
    /// `promote`, which transfers a mono value out without a check).
    pub fn take_mono(&mut self, name: &str) -> RailwayResult<Value> {
        if !self.is_mono(name)? {
            return Err(RailwayError::scope_error(format!("'{name}' is not monodirectional")));
        }
        let entry = self.entries.shift_remove(name).expect("checked above");
        let value = entry.cell.lock().expect("scope mutex poisoned").clone();
        Ok(value)
    }

    /// Drop every mono entry silently; used at the end of a monodirectional
    /// region (the `yield` block of `do/yield/undo`).
    pub fn erase_mono(&mut self) {
        self.entries.retain(|_, e| !e.mono);
    }

    /// True once every non-mono name introduced here has been unlet, the
    /// dynamic check the call dispatcher performs on return (§4.8).
    pub fn is_empty_of_bidirectional(&self) -> bool {
        self.entries.values().all(|e| e.mono)
    }

    pub fn names_bidirectional(&self) -> Vec<String> {
        self.entries.iter().filter(|(_, e)| !e.mono).map(|(n, _)| n.clone()).collect()
    }

    /// A snapshot used by `try`/`catch` to roll an abandoned attempt back.
    /// Captures each entry's current value alongside its existing cell (not
    /// a fresh one), so `restore` can write the saved value back into the
    /// very cell a caller may be aliasing, rather than rebinding the name to
    /// new storage and silently severing that alias.
    pub fn snapshot(&self) -> ScopeSnapshot {
        let entries = self
            .entries
            .iter()
            .map(|(k, e)| {
                let value = e.cell.lock().expect("scope mutex poisoned").clone();
                (k.clone(), e.cell.clone(), value, e.mono)
            })
            .collect();
        ScopeSnapshot { entries }
    }

    /// Undo everything done since `snapshot` was taken: names introduced
    /// afterward are dropped, names removed (by `unlet`) are reinstated on
    /// their original cell, and every surviving name has its saved value
    /// written back into its own cell in place, so any alias held outside
    /// this frame observes the rollback through the same storage.
    pub fn restore(&mut self, snapshot: ScopeSnapshot) {
        let mut entries = IndexMap::new();
        for (name, cell, value, mono) in snapshot.entries {
            *cell.lock().expect("scope mutex poisoned") = value;
            entries.insert(name, Entry { cell, mono });
        }
        self.entries = entries;
    }
}

/// Saved (name, cell, value, mono) tuples from [`Scope::snapshot`]. Keeping
/// the original `Cell` (not a copy of it) is what lets [`Scope::restore`]
/// preserve aliasing across a rolled-back `try` attempt.
#[derive(Debug, Clone)]
pub struct ScopeSnapshot {
    entries: Vec<(String, Cell, Value, bool)>,
}
