//! subtidy - Layout formatter for EPICS substitution files
//!
//! Parses `file "…" { pattern {…} {…}… }` blocks and re-renders them with
//! aligned columns, preserving every comment.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod directive;
pub mod document;
pub mod error;
pub mod format;
pub mod parser;
pub mod process;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs};
pub use config::Config;
pub use diagnostics::{DiagnosticSink, MemorySink, SilentSink, StderrSink};
pub use directive::{find_directive, parse_directive, DirectiveOverrides};
pub use document::{Annotated, DocItem, Document, RowEntry, SubstitutionBlock};
pub use error::{ParseError, RenderError, Result};
pub use format::render;
pub use parser::parse;
