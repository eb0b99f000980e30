//! Symbol table and resolved symbol data model
//!
//! - [`types`]: canonical types and the entities stored in the table
//! - [`table`]: the shared, mutation-guarded [`SymbolTable`]

pub mod table;
pub mod types;

pub use table::{AliasMap, SymbolSnapshot, SymbolTable};
pub use types::*;
