//! Inline directive parsing for `# subtidy:` comments
//!
//! Supports in-file configuration overrides via special comments:
//! `# subtidy: --indent 4 --width 100`

use std::sync::LazyLock;

use regex::Regex;

/// Pattern to match subtidy directives
static SUBTIDY_DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*#\s*subtidy:\s*(.*)\s*$").unwrap());

/// Parsed directive options that can override config
#[derive(Debug, Default, Clone)]
pub struct DirectiveOverrides {
    pub indent: Option<usize>,
    pub spacing: Option<usize>,
    pub width: Option<usize>,
}

impl DirectiveOverrides {
    /// Check if any overrides are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indent.is_none() && self.spacing.is_none() && self.width.is_none()
    }
}

/// Check if a line contains a subtidy directive
#[must_use]
pub fn is_directive_line(line: &str) -> bool {
    SUBTIDY_DIRECTIVE_RE.is_match(line)
}

/// Parse a subtidy directive line and return option overrides
///
/// # Returns
/// * `Some(DirectiveOverrides)` if the line is a directive with known options
/// * `None` otherwise
#[must_use]
pub fn parse_directive(line: &str) -> Option<DirectiveOverrides> {
    let caps = SUBTIDY_DIRECTIVE_RE.captures(line)?;
    let args_str = caps.get(1)?.as_str();

    // Parse the arguments like CLI args
    parse_directive_args(args_str)
}

/// Parse directive arguments into overrides
fn parse_directive_args(args_str: &str) -> Option<DirectiveOverrides> {
    let mut overrides = DirectiveOverrides::default();
    let tokens: Vec<&str> = args_str.split_whitespace().collect();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i];
        match token {
            "-i" | "--indent" => {
                i += 1;
                if i < tokens.len() {
                    overrides.indent = tokens[i].parse().ok();
                }
            }
            "-s" | "--spacing" => {
                i += 1;
                if i < tokens.len() {
                    overrides.spacing = tokens[i].parse().ok();
                }
            }
            "-w" | "--width" => {
                i += 1;
                if i < tokens.len() {
                    overrides.width = tokens[i].parse().ok();
                }
            }
            _ => {
                // Unknown option, skip
            }
        }
        i += 1;
    }

    if overrides.is_empty() {
        None
    } else {
        Some(overrides)
    }
}

/// Scan input for subtidy directives and return the first found
///
/// This reads the file looking for `# subtidy:` lines.
/// Only the first directive is used (subsequent ones are ignored).
pub fn find_directive<R: std::io::BufRead>(input: &mut R) -> Option<DirectiveOverrides> {
    let mut buffer = String::new();

    while input.read_line(&mut buffer).ok()? > 0 {
        if is_directive_line(&buffer) {
            return parse_directive(&buffer);
        }
        buffer.clear();
    }

    None
}
