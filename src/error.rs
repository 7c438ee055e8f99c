//! The Railway error taxonomy (§7).
//!
//! Every error aborts the current thread's execution immediately; there is
//! no user-level catch mechanism other than `try`/`catch`, which searches
//! for a satisfying value rather than recovering from a fault.

use thiserror::Error;

pub type RailwayResult<T> = Result<T, RailwayError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RailwayError {
    /// `unlet` value mismatch, `fi` post-predicate mismatch, loop
    /// predicate invariant violation, or a self-referencing modop.
    #[error("reversibility violation: {0}")]
    ReversibilityViolation(String),

    /// Undefined name, duplicate `let`, mono-rule violation, or a
    /// non-empty callee frame on return.
    #[error("scope error: {0}")]
    ScopeError(String),

    /// Numeric op on an array, indexing a scalar, `#` of a scalar, or a
    /// non-integer exponent on a rational base.
    #[error("type error: {0}")]
    TypeError(String),

    /// Positive out-of-range array index.
    #[error("index error: {0}")]
    IndexError(String),

    /// Division by zero or a non-integer XOR/AND/OR operand.
    #[error("arithmetic error: {0}")]
    ArithmeticError(String),

    /// A `try` block finished its range without any `catch` firing.
    #[error("try exhausted: {0}")]
    TryExhausted(String),

    /// Missing module, file, or CLI flag.
    #[error("load error: {0}")]
    LoadError(String),

    /// Programmer-visible synchronization impossibilities.
    #[error("sync error: {0}")]
    SyncError(String),
}

impl RailwayError {
    pub fn reversibility(msg: impl Into<String>) -> Self {
        Self::ReversibilityViolation(msg.into())
    }
    pub fn scope_error(msg: impl Into<String>) -> Self {
        Self::ScopeError(msg.into())
    }
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::TypeError(msg.into())
    }
    pub fn index_error(msg: impl Into<String>) -> Self {
        Self::IndexError(msg.into())
    }
    pub fn arithmetic_error(msg: impl Into<String>) -> Self {
        Self::ArithmeticError(msg.into())
    }
    pub fn try_exhausted(msg: impl Into<String>) -> Self {
        Self::TryExhausted(msg.into())
    }
    pub fn load_error(msg: impl Into<String>) -> Self {
        Self::LoadError(msg.into())
    }
    pub fn sync_error(msg: impl Into<String>) -> Self {
        Self::SyncError(msg.into())
    }
}
