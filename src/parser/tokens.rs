//! Line-oriented tokenizer for substitution files.
//!
//! Produces a lazy token stream terminated by exactly one end-of-file token.
//! A line that is blank (after trimming trailing whitespace) or whose first
//! non-whitespace character is `#` yields a single comment token and is
//! never tokenized further; other lines are scanned left to right.
//!
//! Quoted values are located by scanning to the next `"` with no escape
//! handling; values containing an escaped quote are unsupported.

use std::fmt;

use crate::error::ParseError;

/// Token classification.
///
/// `Comment` covers blank lines as well as full-line `#…` comments;
/// `EolComment` is a `#…` suffix following content on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Comment,
    EolComment,
    File,
    Pattern,
    Name,
    OpenBrace,
    CloseBrace,
    Comma,
    Value,
    EndOfFile,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Comment => "comment",
            TokenKind::EolComment => "eol_comment",
            TokenKind::File => "file",
            TokenKind::Pattern => "pattern",
            TokenKind::Name => "name",
            TokenKind::OpenBrace => "open_brace",
            TokenKind::CloseBrace => "close_brace",
            TokenKind::Comma => "comma",
            TokenKind::Value => "value",
            TokenKind::EndOfFile => "end_of_file",
        };
        write!(f, "{name}")
    }
}

/// A token with its literal text and source position.
///
/// Structural tokens (`{`, `}`, `,`, keywords, end-of-file) carry an empty
/// literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    /// 1-based line number
    pub line: usize,
    /// Column where the token starts; full-line comments report 0
    pub col: usize,
}

impl Token {
    fn structural(kind: TokenKind, line: usize, col: usize) -> Self {
        Self {
            kind,
            literal: String::new(),
            line,
            col,
        }
    }
}

/// Lazy tokenizer over one input's text.
///
/// Non-restartable: iterate once, in stream order.
pub struct Tokenizer<'a> {
    source_name: &'a str,
    lines: std::str::Lines<'a>,
    /// Unconsumed remainder of the current line, left-trimmed
    rest: &'a str,
    /// Char length of the current line (trailing whitespace trimmed) plus one
    line_size: usize,
    line: usize,
    col: usize,
    eof_emitted: bool,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub fn new(source: &'a str, source_name: &'a str) -> Self {
        Self {
            source_name,
            lines: source.lines(),
            rest: "",
            line_size: 0,
            line: 0,
            col: 0,
            eof_emitted: false,
        }
    }

    /// Lex one token from the (non-empty) remainder of the current line.
    fn lex_token(&mut self) -> Result<Token, ParseError> {
        self.col = self.line_size - self.rest.chars().count();
        let (line, col) = (self.line, self.col);

        if self.rest.starts_with('#') {
            let literal = self.rest.to_string();
            self.rest = "";
            return Ok(Token {
                kind: TokenKind::EolComment,
                literal,
                line,
                col,
            });
        }

        if let Some(after) = self.rest.strip_prefix("file") {
            self.rest = after.trim_start();
            return Ok(Token::structural(TokenKind::File, line, col));
        }

        if let Some(after) = self.rest.strip_prefix("pattern") {
            self.rest = after.trim_start();
            return Ok(Token::structural(TokenKind::Pattern, line, col));
        }

        for (ch, kind) in [
            ('{', TokenKind::OpenBrace),
            ('}', TokenKind::CloseBrace),
            (',', TokenKind::Comma),
        ] {
            if let Some(after) = self.rest.strip_prefix(ch) {
                self.rest = after.trim_start();
                return Ok(Token::structural(kind, line, col));
            }
        }

        if self.rest.starts_with('"') {
            // Quoted value: scan to the closing quote, no escape handling
            let Some(end) = self.rest[1..].find('"') else {
                return Err(ParseError::new(
                    self.source_name,
                    line,
                    col,
                    "value missing trailing \"",
                ));
            };
            let stop = end + 2; // include both quotes
            let literal = self.rest[..stop].to_string();
            self.rest = self.rest[stop..].trim_start();
            return Ok(Token {
                kind: TokenKind::Value,
                literal,
                line,
                col,
            });
        }

        // Bare token: extends to the nearest comma, brace, or space
        let stop = self
            .rest
            .find([',', '{', '}', ' '])
            .unwrap_or(self.rest.len());
        let text = &self.rest[..stop];
        self.rest = self.rest[stop..].trim_start();

        let is_name = text
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '+' | '-' | ':'));
        Ok(Token {
            kind: if is_name {
                TokenKind::Name
            } else {
                TokenKind::Value
            },
            literal: text.to_string(),
            line,
            col,
        })
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if !self.rest.is_empty() {
                return Some(self.lex_token());
            }

            match self.lines.next() {
                Some(raw) => {
                    self.line += 1;
                    self.col = 0;
                    let stripped = raw.trim_end();
                    self.line_size = stripped.chars().count() + 1;

                    let content = stripped.trim_start();
                    if content.is_empty() || content.starts_with('#') {
                        // Full-line comment; keep leading whitespace
                        return Some(Ok(Token {
                            kind: TokenKind::Comment,
                            literal: stripped.to_string(),
                            line: self.line,
                            col: self.col,
                        }));
                    }
                    self.rest = content;
                }
                None => {
                    if self.eof_emitted {
                        return None;
                    }
                    self.eof_emitted = true;
                    return Some(Ok(Token::structural(
                        TokenKind::EndOfFile,
                        self.line,
                        self.col,
                    )));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Tokenizer::new(source, "test")
            .map(|t| t.unwrap().kind)
            .collect()
    }

    #[test]
    fn test_empty_input_yields_single_eof() {
        let tokens: Vec<_> = Tokenizer::new("", "test").map(Result::unwrap).collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::EndOfFile);
    }

    #[test]
    fn test_block_line_token_sequence() {
        assert_eq!(
            kinds("file \"db/x.template\" {\n"),
            vec![
                TokenKind::File,
                TokenKind::Value,
                TokenKind::OpenBrace,
                TokenKind::EndOfFile
            ]
        );
    }

    #[test]
    fn test_pattern_row() {
        assert_eq!(
            kinds("pattern { X, Y }\n"),
            vec![
                TokenKind::Pattern,
                TokenKind::OpenBrace,
                TokenKind::Name,
                TokenKind::Comma,
                TokenKind::Name,
                TokenKind::CloseBrace,
                TokenKind::EndOfFile
            ]
        );
    }

    #[test]
    fn test_full_line_comment_not_tokenized() {
        let tokens: Vec<_> = Tokenizer::new("  # a { b, c }  \n", "test")
            .map(Result::unwrap)
            .collect();
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        // Leading whitespace preserved, trailing trimmed
        assert_eq!(tokens[0].literal, "  # a { b, c }");
        assert_eq!(tokens[0].col, 0);
    }

    #[test]
    fn test_blank_line_is_comment_token() {
        let tokens: Vec<_> = Tokenizer::new("   \n", "test").map(Result::unwrap).collect();
        assert_eq!(tokens[0].kind, TokenKind::Comment);
        assert_eq!(tokens[0].literal, "");
    }

    #[test]
    fn test_eol_comment_after_content() {
        let tokens: Vec<_> = Tokenizer::new("} # done\n", "test")
            .map(Result::unwrap)
            .collect();
        assert_eq!(tokens[0].kind, TokenKind::CloseBrace);
        assert_eq!(tokens[1].kind, TokenKind::EolComment);
        assert_eq!(tokens[1].literal, "# done");
    }

    #[test]
    fn test_quoted_value_keeps_quotes() {
        let tokens: Vec<_> = Tokenizer::new("\"a b,{}\"\n", "test")
            .map(Result::unwrap)
            .collect();
        assert_eq!(tokens[0].kind, TokenKind::Value);
        assert_eq!(tokens[0].literal, "\"a b,{}\"");
    }

    #[test]
    fn test_unterminated_quote_reports_position() {
        let mut tokens = Tokenizer::new("pattern { X }\n{ \"A, B }\n", "f.substitutions");
        let err = tokens
            .by_ref()
            .find_map(Result::err)
            .expect("expected a parse error");
        assert_eq!(err.line, 2);
        assert_eq!(err.col, 3);
        assert_eq!(
            err.to_string(),
            "f.substitutions:2:3 value missing trailing \""
        );
    }

    #[test]
    fn test_name_alphabet() {
        let tokens: Vec<_> = Tokenizer::new("SIG-01:x+y_z\n", "test")
            .map(Result::unwrap)
            .collect();
        assert_eq!(tokens[0].kind, TokenKind::Name);
        assert_eq!(tokens[0].literal, "SIG-01:x+y_z");
    }

    #[test]
    fn test_bare_value_outside_name_alphabet() {
        let tokens: Vec<_> = Tokenizer::new("db/ioc.template\n", "test")
            .map(Result::unwrap)
            .collect();
        assert_eq!(tokens[0].kind, TokenKind::Value);
        assert_eq!(tokens[0].literal, "db/ioc.template");
    }

    #[test]
    fn test_column_tracking() {
        let tokens: Vec<_> = Tokenizer::new("  { X }\n", "test")
            .map(Result::unwrap)
            .collect();
        // Line is "  { X }" -> size 8; "{" at col 3, "X" at col 5, "}" at col 7
        assert_eq!(tokens[0].col, 3);
        assert_eq!(tokens[1].col, 5);
        assert_eq!(tokens[2].col, 7);
    }

    #[test]
    fn test_line_numbers_are_one_based() {
        let tokens: Vec<_> = Tokenizer::new("# first\n{\n", "test")
            .map(Result::unwrap)
            .collect();
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
    }
}
