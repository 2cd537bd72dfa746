//! Parse diagnostics.
//!
//! Every failure mode the parser can hit maps to exactly one [`ErrorCode`].
//! Errors are terminal: the first one raised aborts the parse and no AST is
//! produced.

use std::fmt;

use source_map::{ByteOffset, LineCol, LineIndex};
use thiserror::Error;

/// Result alias used by every parsing operation.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// The closed set of diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Whitespace was required between two tokens.
    MissingWhitespace,
    /// Input ended in the middle of a construct.
    UnexpectedEof,
    /// A token other than the expected one was found.
    UnexpectedToken,
    /// An identifier collided with an ECMAScript reserved word.
    UnexpectedReservedWord,
    /// The embedded script failed to parse.
    ParseError,
    /// An element was still open at the end of input.
    UnclosedElement,
    /// A non-element frame was still open at the end of input.
    UnclosedBlock,
    /// A closing tag did not match any open element, or closed a void element.
    InvalidClosingTag,
    /// A tag name did not fit the tag-name grammar.
    InvalidTagName,
    /// Two attributes normalized to the same name.
    DuplicateAttribute,
    /// A directive value was not a single embedded expression.
    InvalidDirectiveValue,
    /// A top-level script block had no closing tag.
    UnclosedScript,
    /// The embedded stylesheet failed to parse.
    CssSyntaxError,
    /// A declaration in the embedded stylesheet had an empty value.
    InvalidDeclaration,
    /// More than one top-level style block.
    MultipleStyles,
    /// More than one top-level script block.
    MultipleScripts,
}

impl ErrorCode {
    /// The stable kebab-case identifier for this code.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingWhitespace => "missing-whitespace",
            ErrorCode::UnexpectedEof => "unexpected-eof",
            ErrorCode::UnexpectedToken => "unexpected-token",
            ErrorCode::UnexpectedReservedWord => "unexpected-reserved-word",
            ErrorCode::ParseError => "parse-error",
            ErrorCode::UnclosedElement => "unclosed-element",
            ErrorCode::UnclosedBlock => "unclosed-block",
            ErrorCode::InvalidClosingTag => "invalid-closing-tag",
            ErrorCode::InvalidTagName => "invalid-tag-name",
            ErrorCode::DuplicateAttribute => "duplicate-attribute",
            ErrorCode::InvalidDirectiveValue => "invalid-directive-value",
            ErrorCode::UnclosedScript => "unclosed-script",
            ErrorCode::CssSyntaxError => "css-syntax-error",
            ErrorCode::InvalidDeclaration => "invalid-declaration",
            ErrorCode::MultipleStyles => "multiple-styles",
            ErrorCode::MultipleScripts => "multiple-scripts",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fatal parse diagnostic.
///
/// Carries the full template text so callers can render the error with
/// source context; the parser itself only reports the byte offset. (The
/// text lives in `template` rather than `source`, which `thiserror`
/// reserves for error chaining.)
#[derive(Debug, Clone, Error)]
#[error("{message} ({code})")]
pub struct ParseError {
    /// Which failure mode was hit.
    pub code: ErrorCode,
    /// Human-readable description.
    pub message: String,
    /// Byte offset into `template` where the error was raised.
    pub start: ByteOffset,
    /// The template being parsed.
    pub template: String,
    /// Template filename, when one was supplied.
    pub filename: Option<String>,
}

impl ParseError {
    /// Creates a diagnostic.
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        start: ByteOffset,
        template: impl Into<String>,
        filename: Option<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            start,
            template: template.into(),
            filename,
        }
    }

    /// The line/column of [`ParseError::start`] within the template.
    pub fn line_col(&self) -> LineCol {
        LineIndex::new(&self.template)
            .line_col(self.start)
            .unwrap_or_default()
    }
}
