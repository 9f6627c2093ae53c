//! Thread-local context tracking for crash reports.
//!
//! Records which phase of a generation pass is running and which file is
//! being read, so the panic hook can say where a crash happened. Progress
//! counters live beside the context and are reset at the start of each pass.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;

thread_local! {
    static CURRENT_CONTEXT: RefCell<ScanContext> = const { RefCell::new(ScanContext::new()) };
    /// (processed, total) files of the running pass
    static FILE_PROGRESS: Cell<(usize, usize)> = const { Cell::new((0, 0)) };
}

/// Context snapshot for the current pass.
#[derive(Debug, Clone, Default)]
pub struct ScanContext {
    pub phase: Option<ScanPhase>,
    pub current_file: Option<PathBuf>,
}

impl ScanContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            current_file: None,
        }
    }
}

/// Stages of one generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Locating the crate root and its source files
    Discovery,
    /// Parsing source files into syntax trees
    Parsing,
    /// Building per-module scopes for path resolution
    SymbolResolution,
    /// Reading grouping directives from the crate root
    DirectiveCollection,
    /// Recording attributed functions
    DeclarationScan,
    /// Matching functions against groupings
    Classification,
    /// Rendering the generated source
    Emission,
}

impl std::fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovery => write!(f, "discovery"),
            Self::Parsing => write!(f, "parsing"),
            Self::SymbolResolution => write!(f, "symbol_resolution"),
            Self::DirectiveCollection => write!(f, "directive_collection"),
            Self::DeclarationScan => write!(f, "declaration_scan"),
            Self::Classification => write!(f, "classification"),
            Self::Emission => write!(f, "emission"),
        }
    }
}

/// RAII guard restoring the previous context on drop.
pub struct ContextGuard {
    previous: ScanContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = self.previous.clone();
        });
    }
}

/// Set the current phase. The previous phase comes back when the guard drops.
///
/// ```ignore
/// let _phase = set_phase(ScanPhase::Parsing);
/// ```
#[must_use]
pub fn set_phase(phase: ScanPhase) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().phase = Some(phase);
        ContextGuard { previous }
    })
}

/// Set the file currently being read or scanned.
#[must_use]
pub fn set_current_file(path: impl Into<PathBuf>) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let previous = ctx.borrow().clone();
        ctx.borrow_mut().current_file = Some(path.into());
        ContextGuard { previous }
    })
}

pub fn set_progress(processed: usize, total: usize) {
    FILE_PROGRESS.with(|progress| progress.set((processed, total)));
}

pub fn increment_processed() {
    FILE_PROGRESS.with(|progress| {
        let (processed, total) = progress.get();
        progress.set((processed + 1, total));
    });
}

#[must_use]
pub fn get_current_context() -> ScanContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// (processed, total) files
#[must_use]
pub fn get_progress() -> (usize, usize) {
    FILE_PROGRESS.with(Cell::get)
}

pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = ScanContext::new();
    });
}
