//! C header declaration parser
//!
//! This module turns header text into symbols:
//! - [`normalize`]: Comment, blank line and noise token removal
//! - [`lexer`]: Tokenization of one declaration
//! - [`parse`]: The [`parse::LineParser`] cursor shared by all recognizers
//! - [`declarations`]: Single-line shapes (macros, typedefs, prototypes)
//! - [`aggregates`]: Multi-line struct bodies
//! - [`scanner`]: Runs the recognizers in staged passes over a table
//!
//! # Supported declarations
//!
//! - `#define NAME VALUE` with a literal (or, best-effort, a flag expression)
//! - `typedef struct TAG NAME;`
//! - `typedef RET (*NAME)(ARGS);`
//! - `[typedef] struct [TAG] { ... } [NAME];`
//! - `RET NAME(ARGS);`
//!
//! No preprocessor conditionals, multi-line macros, unions or enums.
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent recognizers, one per declaration shape.
//! A recognizer that does not match simply reports a non-match.

pub mod aggregates;
pub mod declarations;
pub mod lexer;
pub mod normalize;
pub mod parse;
pub mod scanner;

pub use scanner::{scan_header, ScanOptions, Scanner};
