//! Syntax-level scanning of a crate: source corpus, symbol table, the
//! declaration store and the directive registry.

pub mod corpus;
pub mod declarations;
pub mod directives;
pub mod symbols;

pub use corpus::{SourceCorpus, SourceFile};
pub use symbols::SymbolTable;
