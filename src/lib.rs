//! # Introduction
//!
//! declscan extracts a type-resolved symbol table from C headers and from
//! XML API registries, for use by binding generators. Every constant,
//! typedef, struct and function comes out with a [`symbols::CanonicalType`]:
//! a fixed-width scalar or a user type name plus a pointer depth.
//!
//! ## Header pipeline
//!
//! ```text
//! Source → Normalize → Recognizers → TypeResolver → SymbolTable
//! ```
//!
//! 1. [`parser`]: strips comments and noise tokens, then runs one recognizer
//!    per declaration shape in staged, partly parallel passes.
//! 2. [`resolve`]: turns raw C types and declarators into canonical types,
//!    degrading unknown types to a pointer-sized placeholder.
//! 3. [`literals`]: infers the narrowest type for constant values.
//! 4. [`symbols`]: the shared table with its single flat namespace, and the
//!    serializable data model.
//!
//! ## Registry pipeline
//!
//! [`registry`] resolves every enumerant and command into a global pool once,
//! then builds an independent table per selected feature or extension.
//!
//! ## Failure policy
//!
//! Lines that match no shape, duplicate names, unknown types and ambiguous
//! literals are logged through the `log` facade and skipped. Only structural
//! problems (an unclosed struct body, malformed XML) return a [`ScanError`].

pub mod config;
pub mod errors;
pub mod literals;
pub mod parser;
pub mod registry;
pub mod resolve;
pub mod symbols;

pub use config::ScanConfig;
pub use errors::ScanError;
pub use parser::scan_header;
pub use registry::parse_registry;
pub use resolve::TypeResolver;
pub use symbols::{SymbolSnapshot, SymbolTable};
