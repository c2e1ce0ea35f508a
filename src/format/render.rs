//! Document rendering.
//!
//! Walks a parsed document in order, writing top-level comment lines with
//! trailing whitespace trimmed and delegating each substitution block to the
//! block layout engine.

use std::io::Write;

use crate::config::Config;
use crate::diagnostics::DiagnosticSink;
use crate::document::{DocItem, Document};
use crate::error::RenderError;
use crate::format::layout::write_block;

/// Render a whole document to `output`.
///
/// Top-level comment and blank lines pass through with trailing whitespace
/// removed; leading whitespace is kept as written.
pub fn render<W: Write>(
    document: &Document,
    output: &mut W,
    config: &Config,
    sink: &mut dyn DiagnosticSink,
) -> Result<(), RenderError> {
    for item in &document.items {
        match item {
            DocItem::Comment(line) => writeln!(output, "{}", line.trim_end())?,
            DocItem::Block(block) => write_block(output, block, config, sink)?,
        }
    }
    Ok(())
}
