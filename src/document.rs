//! In-memory representation of a substitution file.
//!
//! The [`Document`] is the sole interface between parsing and rendering. It
//! preserves source order and carries every comment: free-standing lines,
//! per-block comments, and trailing end-of-line comments, so a fully
//! annotated, realigned file can be reconstructed from it.

/// A value optionally paired with a trailing end-of-line comment.
///
/// Used for the template filename, the formal parameter row, and each
/// actual-value row. Consumers read `value` regardless of whether a comment
/// was attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotated<T> {
    pub value: T,
    /// Trailing `#…` comment from the same line, if any
    pub comment: Option<String>,
}

impl<T> Annotated<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            comment: None,
        }
    }

    pub fn with_comment(value: T, comment: impl Into<String>) -> Self {
        Self {
            value,
            comment: Some(comment.into()),
        }
    }
}

/// One entry in the actual-rows section of a block.
///
/// Rows and interspersed comment lines share one ordered sequence so that
/// comments keep their position between rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEntry {
    /// A data row supplying values for the formal parameters
    Values(Annotated<Vec<String>>),
    /// A comment or blank line between rows, kept verbatim
    Comment(String),
}

/// One `file "…" { pattern {…} rows… }` unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionBlock {
    /// Template filename, as it appeared in the source (quotes included when
    /// the source quoted it)
    pub template: Annotated<String>,
    /// Comment/blank lines between the opening `{` and the `pattern` keyword
    pub block_comments: Vec<String>,
    /// Macro parameter names from `pattern { … }`
    pub formal: Annotated<Vec<String>>,
    /// Actual rows and interspersed comment lines, in source order
    pub actual: Vec<RowEntry>,
    /// Trailing comment on the block's closing brace
    pub eos_comment: Option<String>,
}

/// A top-level item: either a raw comment/blank line or a substitution block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocItem {
    /// Comment or blank line outside any block, kept verbatim
    Comment(String),
    Block(SubstitutionBlock),
}

/// An entire substitution file, in source order.
///
/// Built once per input by the parser, handed whole to the renderer, then
/// discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub items: Vec<DocItem>,
}
