//! Two-pass layout for one substitution block.
//!
//! Pass 1 computes per-column display widths (after implicit quoting of
//! unquoted values) and the wrap points needed to respect the width budget.
//! Pass 2 renders the formal row and every actual row with aligned columns,
//! re-attaching each trailing comment to its own row.

use std::io::Write;

use crate::config::Config;
use crate::diagnostics::DiagnosticSink;
use crate::document::{RowEntry, SubstitutionBlock};
use crate::error::RenderError;

/// Pre-allocated buffer of spaces for padding.
/// Using a static buffer avoids allocating a new Vec for each gap write.
const SPACES: &[u8; 256] = &[b' '; 256];

/// Write `count` spaces to output efficiently using pre-allocated buffer.
fn write_spaces<W: Write>(output: &mut W, count: usize) -> std::io::Result<()> {
    if count == 0 {
        return Ok(());
    }
    if count <= SPACES.len() {
        output.write_all(&SPACES[..count])
    } else {
        // Fall back to allocation for unusually large gaps
        output.write_all(&vec![b' '; count])
    }
}

/// Double-quote a value unless it already carries a quote at either end.
pub(crate) fn quote_value(value: &str) -> String {
    if !value.starts_with('"') && !value.ends_with('"') {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Computed layout for one block: column widths and forced line breaks.
#[derive(Debug)]
struct BlockLayout {
    /// Display width of each column, shared by the formal and actual rows
    widths: Vec<usize>,
    /// Column indices after which a line break is forced
    wrap_after: Vec<usize>,
}

/// First pass: column widths and wrap points.
///
/// Column j is as wide as the widest of the formal name and every quoted
/// actual value in that position. A row whose arity differs from the formal
/// row is a content defect, not recoverable.
fn compute_layout(
    block: &SubstitutionBlock,
    spacing: usize,
    width: usize,
) -> Result<BlockLayout, RenderError> {
    let mut widths: Vec<usize> = block
        .formal
        .value
        .iter()
        .map(|name| name.chars().count())
        .collect();
    let expected = widths.len();

    for entry in &block.actual {
        let RowEntry::Values(row) = entry else {
            continue;
        };
        if row.value.len() != expected {
            return Err(RenderError::RowLength {
                row: row.value.clone(),
                actual: row.value.len(),
                expected,
            });
        }
        for (j, value) in row.value.iter().enumerate() {
            widths[j] = widths[j].max(quote_value(value).chars().count());
        }
    }

    // Walk columns accumulating rendered width; whenever the running total
    // exceeds the budget, break after the current column and start over.
    // The seed of 10 reserves room for the "pattern { " prefix.
    let mut wrap_after = Vec::new();
    let mut total = 10;
    for (j, w) in widths.iter().enumerate() {
        total += w + spacing + 1;
        if total > width {
            wrap_after.push(j);
            total = 10;
        }
    }

    Ok(BlockLayout { widths, wrap_after })
}

/// Render one row (formal or actual) with aligned columns.
///
/// Each value is followed by `,` plus the configured spacing (except the
/// last), then padded out to its column width; at a wrap point the padding
/// is replaced by a line break re-indented under the row prefix.
fn write_row<W: Write>(
    output: &mut W,
    values: &[String],
    comment: Option<&str>,
    layout: &BlockLayout,
    prefix: &str,
    spacing: usize,
) -> std::io::Result<()> {
    write!(output, "{prefix} {{ ")?;

    let number = values.len();
    for (j, value) in values.iter().enumerate() {
        let gap = layout.widths[j].saturating_sub(value.chars().count());

        write!(output, "{value}")?;
        if j < number.saturating_sub(1) {
            write!(output, ",")?;
            write_spaces(output, spacing)?;
        }

        if layout.wrap_after.contains(&j) && j < number.saturating_sub(1) {
            writeln!(output)?;
            write_spaces(output, prefix.chars().count() + 3)?;
        } else {
            write_spaces(output, gap)?;
        }
    }

    match comment {
        Some(c) => writeln!(output, " }}  {c}"),
        None => writeln!(output, " }}"),
    }
}

/// Render one substitution block.
pub(crate) fn write_block<W: Write>(
    output: &mut W,
    block: &SubstitutionBlock,
    config: &Config,
    sink: &mut dyn DiagnosticSink,
) -> Result<(), RenderError> {
    sink.debug(&format!("   template: {:?}", block.template));
    sink.debug(&format!("   comments: {:?}", block.block_comments));
    sink.debug(&format!("   formal: {:?}", block.formal));
    sink.debug("   actual:");
    for entry in &block.actual {
        sink.debug(&format!("      {entry:?}"));
    }
    sink.debug(&format!("   eos_comment: {:?}", block.eos_comment));

    let layout = compute_layout(block, config.spacing, config.width)?;

    let template = quote_value(&block.template.value);
    match &block.template.comment {
        Some(c) => writeln!(output, "file {template} {{  {c}")?,
        None => writeln!(output, "file {template} {{")?,
    }

    // Block comments sit between `{` and `pattern`; whitespace-led ones are
    // re-indented to a fixed four spaces.
    for comment in &block.block_comments {
        if comment.starts_with(' ') {
            writeln!(output, "    {}", comment.trim_start())?;
        } else {
            writeln!(output, "{comment}")?;
        }
    }

    let formal_prefix = format!("{}pattern", " ".repeat(config.indent));
    write_row(
        output,
        &block.formal.value,
        block.formal.comment.as_deref(),
        &layout,
        &formal_prefix,
        config.spacing,
    )?;

    let row_prefix = " ".repeat(config.indent + "pattern".len());
    for entry in &block.actual {
        match entry {
            RowEntry::Comment(line) => {
                // Interspersed comment lines: whitespace-led ones get a
                // fixed twelve-space indent, the rest pass through verbatim
                if line.starts_with(' ') {
                    writeln!(output, "            {}", line.trim_start())?;
                } else {
                    writeln!(output, "{line}")?;
                }
            }
            RowEntry::Values(row) => {
                let quoted: Vec<String> = row.value.iter().map(|v| quote_value(v)).collect();
                write_row(
                    output,
                    &quoted,
                    row.comment.as_deref(),
                    &layout,
                    &row_prefix,
                    config.spacing,
                )?;
            }
        }
    }

    match &block.eos_comment {
        Some(c) => writeln!(output, "}}  {c}")?,
        None => writeln!(output, "}}")?,
    }

    Ok(())
}
