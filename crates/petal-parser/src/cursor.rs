//! Scanning primitives for the template parser.
//!
//! The cursor only ever moves forward: every handler commits what it consumes
//! as soon as it recognizes grammar, so no backtracking buffer exists beyond
//! the current index.

use smol_str::SmolStr;
use text_size::TextSize;

use crate::error::{ErrorCode, ParseError, Result};
use crate::names;
use crate::parser::Parser;

/// The whitespace characters the template grammar recognizes.
pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_identifier_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

fn is_identifier_char(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphanumeric()
}

impl<'a> Parser<'a> {
    /// The unconsumed remainder of the template.
    pub(crate) fn rest(&self) -> &'a str {
        &self.template[self.index..]
    }

    pub(crate) fn at_end(&self) -> bool {
        self.index >= self.template.len()
    }

    /// The next character, without consuming it.
    pub(crate) fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Whether the template continues with `literal` at the cursor.
    pub(crate) fn match_str(&self, literal: &str) -> bool {
        self.rest().starts_with(literal)
    }

    /// Consumes `literal` if present.
    pub(crate) fn eat(&mut self, literal: &str) -> bool {
        if self.match_str(literal) {
            self.index += literal.len();
            true
        } else {
            false
        }
    }

    /// Consumes `literal` or fails with `unexpected-token` (`unexpected-eof`
    /// at end of input).
    pub(crate) fn eat_required(&mut self, literal: &str) -> Result<()> {
        if self.eat(literal) {
            Ok(())
        } else {
            Err(self.unexpected(format!("Expected {literal}")))
        }
    }

    /// Like [`Parser::eat_required`] with a custom message.
    pub(crate) fn eat_required_with(&mut self, literal: &str, message: &str) -> Result<()> {
        if self.eat(literal) {
            Ok(())
        } else {
            Err(self.unexpected(message))
        }
    }

    fn unexpected(&self, message: impl Into<String>) -> ParseError {
        let code = if self.at_end() {
            ErrorCode::UnexpectedEof
        } else {
            ErrorCode::UnexpectedToken
        };
        self.error(code, message)
    }

    /// Skips any run of whitespace.
    pub(crate) fn allow_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.index += 1;
        }
    }

    /// Requires at least one whitespace character, then skips the run.
    pub(crate) fn require_whitespace(&mut self) -> Result<()> {
        if !self.peek().is_some_and(is_whitespace) {
            return Err(self.error(ErrorCode::MissingWhitespace, "Expected whitespace"));
        }
        self.allow_whitespace();
        Ok(())
    }

    /// Consumes characters up to (not including) the literal `boundary`, or to
    /// the end of input when the boundary never occurs.
    pub(crate) fn read_until_str(&mut self, boundary: &str) -> &'a str {
        let rest = self.rest();
        let len = memchr::memmem::find(rest.as_bytes(), boundary.as_bytes()).unwrap_or(rest.len());
        self.index += len;
        &rest[..len]
    }

    /// Consumes the longest run of characters satisfying `predicate`.
    pub(crate) fn read_while(&mut self, predicate: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !predicate(*c))
            .map_or(rest.len(), |(index, _)| index);
        self.index += len;
        &rest[..len]
    }

    /// Reads an ECMAScript identifier, iterating by code point.
    ///
    /// Returns `None` without consuming anything when the cursor is not at an
    /// identifier start. Reserved words fail with `unexpected-reserved-word`
    /// unless `allow_reserved` is set.
    pub(crate) fn read_identifier(&mut self, allow_reserved: bool) -> Result<Option<SmolStr>> {
        let start = self.index;
        let rest = self.rest();
        let mut chars = rest.chars();
        let Some(first) = chars.next() else {
            return Ok(None);
        };
        if !is_identifier_start(first) {
            return Ok(None);
        }
        let mut len = first.len_utf8();
        for c in chars {
            if !is_identifier_char(c) {
                break;
            }
            len += c.len_utf8();
        }
        let word = &rest[..len];
        if !allow_reserved && names::is_reserved_word(word) {
            return Err(self.error_at(
                ErrorCode::UnexpectedReservedWord,
                format!("'{word}' is a reserved word in JavaScript and cannot be used here"),
                start,
            ));
        }
        self.index += len;
        Ok(Some(SmolStr::new(word)))
    }

    /// Builds a diagnostic at the cursor.
    pub(crate) fn error(&self, code: ErrorCode, message: impl Into<String>) -> ParseError {
        self.error_at(code, message, self.index)
    }

    /// Builds a diagnostic at an explicit offset.
    pub(crate) fn error_at(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
        index: usize,
    ) -> ParseError {
        ParseError::new(
            code,
            message,
            TextSize::from(index as u32),
            self.template,
            self.filename.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;
    use pretty_assertions::assert_eq;

    fn cursor(template: &str) -> Parser<'_> {
        Parser::new(template, ParseOptions::default())
    }

    #[test]
    fn match_and_eat() {
        let mut parser = cursor("<div>");
        assert!(parser.match_str("<"));
        assert!(parser.eat("<"));
        assert!(!parser.eat("span"));
        assert!(parser.eat("div"));
        assert_eq!(parser.peek(), Some('>'));
    }

    #[test]
    fn eat_required_distinguishes_eof() {
        let mut parser = cursor("ab");
        let error = parser.eat_required(">").unwrap_err();
        assert_eq!(error.code, ErrorCode::UnexpectedToken);
        assert_eq!(error.message, "Expected >");

        parser.eat("ab");
        let error = parser.eat_required(">").unwrap_err();
        assert_eq!(error.code, ErrorCode::UnexpectedEof);
    }

    #[test]
    fn whitespace_handling() {
        let mut parser = cursor(" \t\r\n x");
        parser.allow_whitespace();
        assert_eq!(parser.peek(), Some('x'));

        let mut parser = cursor("x");
        let error = parser.require_whitespace().unwrap_err();
        assert_eq!(error.code, ErrorCode::MissingWhitespace);
        assert_eq!(error.message, "Expected whitespace");
    }

    #[test]
    fn read_until_consumes_to_boundary() {
        let mut parser = cursor("hello-->rest");
        assert_eq!(parser.read_until_str("-->"), "hello");
        assert!(parser.match_str("-->"));

        let mut parser = cursor("no boundary");
        assert_eq!(parser.read_until_str("-->"), "no boundary");
        assert!(parser.at_end());
    }

    #[test]
    fn read_identifier_accepts_unicode() {
        let mut parser = cursor("caf\u{e9}_1 rest");
        let word = parser.read_identifier(false).unwrap();
        assert_eq!(word.as_deref(), Some("caf\u{e9}_1"));
        assert_eq!(parser.peek(), Some(' '));
    }

    #[test]
    fn read_identifier_rejects_reserved_words() {
        let mut parser = cursor("typeof x");
        let error = parser.read_identifier(false).unwrap_err();
        assert_eq!(error.code, ErrorCode::UnexpectedReservedWord);
        assert_eq!(u32::from(error.start), 0);

        let mut parser = cursor("typeof x");
        let word = parser.read_identifier(true).unwrap();
        assert_eq!(word.as_deref(), Some("typeof"));
    }

    #[test]
    fn read_identifier_stops_at_non_identifier() {
        let mut parser = cursor("<div>");
        assert_eq!(parser.read_identifier(false).unwrap(), None);
        assert_eq!(parser.peek(), Some('<'));
    }
}
