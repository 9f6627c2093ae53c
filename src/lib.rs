// Export modules for library usage
pub mod build_script;
pub mod classifier;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod emitter;
pub mod io;
pub mod observability;
pub mod pipeline;
pub mod scanner;

// Re-export commonly used types
pub use crate::core::{
    ClassificationResult, Error, GroupEntry, Grouping, ItemPath, MethodDeclaration, Origin,
    Resolution, Result,
};

pub use crate::classifier::classify;
pub use crate::config::{resolve_settings, GeneratorSettings, MarkscanConfig};
pub use crate::emitter::{Emitter, GENERATED_HEADER};
pub use crate::pipeline::{
    analyze, check_output, generate, generate_for_project, write_output, GeneratedSource,
    ScanReport, WriteOutcome,
};
pub use crate::scanner::{SourceCorpus, SymbolTable};

/// Request a registration-name list for every function marked with the given
/// attribute.
///
/// Place it at the crate root. It expands to nothing; the scanner reads it
/// from source and emits one constant per requested marker:
///
/// ```ignore
/// markscan::generate_functions_with!(crate::markers::Audited);
///
/// #[crate::markers::Audited]
/// #[functions_worker::function("ListUsers")]
/// pub fn list_users() {}
///
/// // after generation:
/// // functions_attributes::GenerateFunctionsWith::Audited == &["ListUsers"]
/// ```
#[macro_export]
macro_rules! generate_functions_with {
    ($marker:path $(,)?) => {};
}
