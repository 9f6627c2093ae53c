//! Crash reporting and phase tracking.
//!
//! The binary installs the panic hook at startup; the pipeline marks each
//! phase and file with RAII guards:
//!
//! ```ignore
//! use markscan::observability::{set_phase, set_current_file, ScanPhase};
//!
//! let _phase = set_phase(ScanPhase::Parsing);
//! for file in files {
//!     let _file = set_current_file(&file);
//!     parse(&file)?;
//! }
//! ```

pub mod context;
pub mod panic_hook;

pub use context::{
    get_current_context, get_progress, increment_processed, reset_context, set_current_file,
    set_phase, set_progress, ContextGuard, ScanContext, ScanPhase,
};
pub use panic_hook::install_panic_hook;
