//! Diagnostic reporting for the Rye backend.
//!
//! The backend trusts its input: the tree it receives has already been
//! type-checked and scope-resolved by the frontend, so everything the
//! generator can complain about is an internal invariant violation, never
//! a user-facing error. Diagnostics therefore identify the offending
//! translation unit rather than a source location, and the driver fails
//! fast instead of emitting malformed output.

use std::sync::atomic::{AtomicBool, Ordering};

/// Structured container for an internal generator error.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message describing the violated invariant.
    pub message: String,
    /// Translation unit being generated when the violation was detected.
    pub unit: Option<String>,
    /// Optional additional context.
    pub note: Option<String>,
}

/// Result alias threaded through the recursive generation calls.
pub type DiagnosticResult<T> = Result<T, Diagnostic>;

impl Diagnostic {
    /// Create a diagnostic for a violated internal invariant.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Diagnostic {
            message: msg.into(),
            unit: None,
            note: None,
        }
    }

    /// Tag the diagnostic with the unit it surfaced in. The first tag wins:
    /// inner generation frames are closer to the offending node.
    pub fn in_unit(mut self, unit: &str) -> Self {
        if self.unit.is_none() {
            self.unit = Some(unit.to_string());
        }
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.unit {
            Some(unit) => write!(f, "{} (in unit `{}`)", self.message, unit),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for Diagnostic {}

/// Print a compact, rustc-style rendering of `d` to stderr.
pub fn emit_diagnostic(d: &Diagnostic) {
    if !DIAGNOSTICS_ENABLED.load(Ordering::SeqCst) {
        return;
    }
    let red = "\x1b[31m";
    let reset = "\x1b[0m";

    eprintln!("{}error{}: internal: {}", red, reset, d.message);
    if let Some(unit) = &d.unit {
        eprintln!("  --> unit `{}`", unit);
    }
    if let Some(note) = &d.note {
        let blue = "\x1b[34m";
        eprintln!("{}note{}: {}", blue, reset, note);
    }
}

static DIAGNOSTICS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Suppress diagnostic printing for the current scope. Returns a guard that
/// restores the previous enabled state when dropped. Tests can call
/// `let _g = diagnostics::suppress();` to silence stderr output while still
/// inspecting the returned errors.
pub fn suppress() -> SuppressGuard {
    let prev = DIAGNOSTICS_ENABLED.swap(false, Ordering::SeqCst);
    SuppressGuard { prev }
}

/// Guard type returned by `suppress()`.
pub struct SuppressGuard {
    prev: bool,
}

impl Drop for SuppressGuard {
    fn drop(&mut self) {
        DIAGNOSTICS_ENABLED.store(self.prev, Ordering::SeqCst);
    }
}
