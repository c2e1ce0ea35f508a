//! Integration tests for subtidy
//!
//! These tests run whole inputs through the parse-and-render pipeline

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{BufReader, Cursor};

use subtidy::process::format_file;
use subtidy::{find_directive, Config, MemorySink};

fn format(input: &str, config: &Config) -> (String, MemorySink) {
    let reader = BufReader::new(Cursor::new(input.as_bytes()));
    let mut output = Vec::new();
    let mut sink = MemorySink::new();
    format_file(reader, &mut output, config, "test.substitutions", &mut sink)
        .expect("formatting should succeed");
    (String::from_utf8(output).unwrap(), sink)
}

#[test]
fn test_complete_substitution_file() {
    let input = "\
# Example
file \"db/xyz.template\" { # Comment
 pattern {X, Y , Z} # Comment
 {\"AAAA\",\"BB\",\"CC\"} # Comment
 { \"DD\" ,\"EEEE\", \"FF\" }
}
";
    let expected = "\
# Example
file \"db/xyz.template\" {  # Comment
    pattern { X,       Y,       Z    }  # Comment
            { \"AAAA\",  \"BB\",    \"CC\" }  # Comment
            { \"DD\",    \"EEEE\",  \"FF\" }
}
";
    let (result, sink) = format(input, &Config::default());
    assert_eq!(result, expected);
    assert!(sink.warnings.is_empty());
}

#[test]
fn test_formatting_is_idempotent() {
    let input = "\
# header

file a.db {  # db
  pattern { NAME, VAL }  # cols
  # mid comment
  { \"n1\", 17 }  # row
} # end
";
    let config = Config::default();
    let (first, _) = format(input, &config);
    let (second, _) = format(&first, &config);
    assert_eq!(first, second);
}

#[test]
fn test_unquoted_values_are_quoted() {
    let input = "file a.db{pattern{X}{17}}\n";
    let (result, _) = format(input, &Config::default());
    assert!(result.contains("file \"a.db\" {"));
    assert!(result.contains("{ \"17\" }"));
}

#[test]
fn test_multiple_blocks_and_top_level_comments() {
    let input = "\
# one
file a.db { pattern { X } { 1 } }
# two
file b.db { pattern { Y } { 2 } }
";
    let (result, _) = format(input, &Config::default());
    let lines: Vec<&str> = result.lines().collect();
    assert_eq!(lines[0], "# one");
    assert_eq!(lines[1], "file \"a.db\" {");
    assert_eq!(lines[4], "}");
    assert_eq!(lines[5], "# two");
    assert_eq!(lines[6], "file \"b.db\" {");
}

#[test]
fn test_stray_comma_recovery_warns_but_formats() {
    let input = "file a.db {\n  pattern { X, , Y }\n  { 1, , 2 }\n}\n";
    let (result, sink) = format(input, &Config::default());
    assert!(result.contains("pattern { X,"));
    assert_eq!(sink.warnings.len(), 2);
    assert!(sink.warnings[0].starts_with("test.substitutions:2:"));
    assert!(sink.warnings[0].contains("extra comma"));
}

#[test]
fn test_missing_comma_recovery_warns_but_formats() {
    let input = "file a.db {\n  pattern { X Y }\n  { 1, 2 }\n}\n";
    let (result, sink) = format(input, &Config::default());
    assert!(result.contains("X,"));
    assert!(result.contains("Y"));
    assert_eq!(sink.warnings.len(), 1);
    assert!(sink.warnings[0].contains("missing comma"));
}

#[test]
fn test_unterminated_quote_is_an_error() {
    let input = "file a.db {\n  pattern { X }\n  { \"oops }\n}\n";
    let reader = BufReader::new(Cursor::new(input.as_bytes()));
    let mut output = Vec::new();
    let mut sink = MemorySink::new();
    let err = format_file(
        reader,
        &mut output,
        &Config::default(),
        "bad.substitutions",
        &mut sink,
    )
    .unwrap_err();
    assert!(err.to_string().contains("value missing trailing \""));
    assert!(output.is_empty());
}

#[test]
fn test_row_arity_mismatch_is_an_error() {
    let input = "file a.db {\n  pattern { X, Y }\n  { 1 }\n}\n";
    let reader = BufReader::new(Cursor::new(input.as_bytes()));
    let mut output = Vec::new();
    let mut sink = MemorySink::new();
    let err = format_file(
        reader,
        &mut output,
        &Config::default(),
        "bad.substitutions",
        &mut sink,
    )
    .unwrap_err();
    assert!(err.to_string().contains("2 expected"));
}

#[test]
fn test_narrow_width_wraps_rows() {
    // Five 20-character macro names force a wrap at width 60
    let names: Vec<String> = (0..5).map(|i| format!("MACRO_{i:013}X")).collect();
    let input = format!(
        "file a.db {{\n  pattern {{ {} }}\n}}\n",
        names.join(", ")
    );
    let config = Config {
        width: 60,
        ..Default::default()
    };
    let (result, _) = format(&input, &config);
    let lines: Vec<&str> = result.lines().collect();
    // file line, wrapped formal row (two lines), closing brace
    assert_eq!(lines.len(), 4);
    assert!(lines[1].starts_with("    pattern { MACRO_"));
    // Continuation aligns under the opening brace of the row
    assert!(lines[2].starts_with(&" ".repeat("    pattern { ".len())));
    assert!(lines[2].contains("MACRO_0000000000003X"));
}

#[test]
fn test_custom_indent_and_spacing() {
    let input = "file a.db { pattern { X, Y } { 1, 2 } }\n";
    let config = Config {
        indent: 2,
        spacing: 1,
        ..Default::default()
    };
    let (result, _) = format(input, &config);
    assert_eq!(
        result,
        "file \"a.db\" {\n\
         \x20 pattern { X,   Y   }\n\
         \x20         { \"1\", \"2\" }\n\
         }\n"
    );
}

#[test]
fn test_directive_overrides_feed_the_config() {
    let input = "# subtidy: --spacing 1 -w 100\nfile a.db { pattern { X } { 1 } }\n";

    let overrides = find_directive(&mut input.as_bytes()).expect("directive should parse");
    assert_eq!(overrides.spacing, Some(1));
    assert_eq!(overrides.width, Some(100));

    let mut config = Config::default();
    if let Some(spacing) = overrides.spacing {
        config.spacing = spacing;
    }
    if let Some(width) = overrides.width {
        config.width = width;
    }

    let (result, _) = format(input, &config);
    // Directive comment survives as an ordinary top-level comment
    assert!(result.starts_with("# subtidy: --spacing 1 -w 100\n"));
    assert!(result.contains("pattern { X   }"));
}

#[test]
fn test_comments_survive_in_position() {
    let input = "\
# top

file a.db {  # after brace
# block comment
   # indented block comment
  pattern { X }  # formal
  # between rows
  { 1 }  # row
}  # eos
# tail
";
    let (result, _) = format(input, &Config::default());
    let expected = "\
# top

file \"a.db\" {  # after brace
# block comment
    # indented block comment
    pattern { X   }  # formal
            # between rows
            { \"1\" }  # row
}  # eos
# tail
";
    assert_eq!(result, expected);
}
