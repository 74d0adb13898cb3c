//! Error types for the forensic analysis engine.
//!
//! The engine recognizes three kinds of abnormal condition (spec §7), but only
//! one of them is ever returned to a caller as an `Err`: a violated input
//! contract. The other two are handled inline — an enumeration cap hit keeps
//! the partial result and logs a warning; a numeric degeneracy resolves to a
//! documented neutral value at the call site. Neither propagates.

use thiserror::Error;

/// Errors surfaced by the forensic engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForensicError {
    /// A precondition on the transaction table was not met — e.g. a
    /// self-loop, a non-positive amount, or an empty input. The caller is
    /// responsible for not attempting repair; this is raised immediately.
    #[error("input contract violation: {0}")]
    InputContractViolation(String),
}

/// Describes an enumeration safety cap being hit during detection.
///
/// This is logged (`log::warn!`), never returned as an error — the detector
/// that hit the cap keeps whatever partial result it had accumulated and
/// simply stops enumerating further. Exists only to give the handful of cap
/// sites a single formatting path.
#[derive(Debug, Clone)]
pub struct CapWarning {
    pub component: &'static str,
    pub source: String,
    pub limit: usize,
}

impl CapWarning {
    pub fn new(component: &'static str, source: impl Into<String>, limit: usize) -> Self {
        Self {
            component,
            source: source.into(),
            limit,
        }
    }

    pub fn log(&self) {
        log::warn!(
            "{}: enumeration cap {} hit at {} — stopping early, keeping partial result",
            self.component,
            self.limit,
            self.source
        );
    }
}
