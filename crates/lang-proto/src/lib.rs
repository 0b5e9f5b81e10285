//! Declaration-level parsing of Protocol Buffers schema files.
//!
//! This crate deliberately stops at the declarations a migration engine
//! needs: package names, import paths, service heads, and file-level
//! options. Message bodies and anything else inside braces are skipped,
//! not modeled.

pub mod ast;
pub mod parser;

pub use ast::{Declaration, ImportModifier, SchemaAst};
pub use parser::{ParseError, parse};
