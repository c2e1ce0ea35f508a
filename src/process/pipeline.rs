//! Parse-then-render pipeline
//!
//! The main entry point is [`format_file`]: it reads the whole input, parses
//! it into a document, and renders the document back out with the configured
//! layout. Parsing must succeed completely before anything is written, so a
//! malformed input never produces partial output.

use std::io::{BufRead, Write};

use crate::config::Config;
use crate::diagnostics::DiagnosticSink;
use crate::format::render;
use crate::parser::parse;
use crate::Result;

/// Format one substitution file
///
/// `source_name` labels warnings and errors; it is usually the file path, or
/// something like `<stdin>` for piped input.
pub fn format_file<R: BufRead, W: Write>(
    input: R,
    output: &mut W,
    config: &Config,
    source_name: &str,
    sink: &mut dyn DiagnosticSink,
) -> Result<()> {
    let mut source = String::new();
    let mut reader = input;
    reader.read_to_string(&mut source)?;

    let document = parse(&source, source_name, sink)?;
    render(&document, output, config, sink)?;

    Ok(())
}
