//! Template parser for the Petal component compiler.
//!
//! This crate turns a component template — HTML-like markup, directive
//! attributes, and embedded script/style blocks — into a position-annotated
//! AST for the code generator:
//!
//! - a hand-rolled cursor drives a recursive descent parser over the markup,
//! - top-level `<script>` bodies are parsed as ES modules through `swc`,
//! - top-level `<style>` bodies are parsed through `cssparser`,
//! - everything else (nested script/style, `<textarea>`) is raw text.
//!
//! Parsing is all-or-nothing: the first error aborts the parse and is
//! returned as a [`ParseError`] carrying a stable code and a byte offset into
//! the template.
//!
//! # Example
//!
//! ```
//! let ast = petal_parser::parse("<button on:click>Count</button>").unwrap();
//! assert_eq!(ast.html.children.len(), 1);
//!
//! let error = petal_parser::parse("<button on:click={}>Count</button>").unwrap_err();
//! assert_eq!(error.code, petal_parser::ErrorCode::InvalidDirectiveValue);
//! ```

mod ast;
mod cursor;
mod entities;
mod error;
mod names;
mod parser;
mod script;
mod style;

pub use ast::{
    Ast, Attribute, Comment, Directive, DirectiveKind, Element, ElementKind, Expression, Fragment,
    NormalAttribute, ParsedProgram, Script, Style, StyleContent, TemplateNode, Text,
};
pub use entities::decode_character_references;
pub use error::{ErrorCode, ParseError};
pub use names::{closing_tag_omitted, is_raw_text_element, is_void_element};
pub use source_map::{ByteOffset, LineCol, LineIndex, Span};
pub use style::{
    CssAtRule, CssAtRuleBody, CssBlock, CssDeclaration, CssNode, CssPrelude, CssRule, CssValue,
};

/// Options for a single parse.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Filename reported in diagnostics.
    pub filename: Option<String>,
    /// Compile for a custom element: `<slot>` parses as a plain element
    /// instead of a slot.
    pub custom_element: bool,
}

/// Parses a template with default options.
pub fn parse(template: &str) -> Result<Ast, ParseError> {
    parse_with_options(template, ParseOptions::default())
}

/// Parses a template.
///
/// On success the whole document is returned as one [`Ast`]; on failure the
/// first diagnostic is returned and no AST exists.
pub fn parse_with_options(template: &str, options: ParseOptions) -> Result<Ast, ParseError> {
    parser::Parser::new(template, options).run()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty() {
        let ast = parse("").unwrap();
        assert!(ast.html.children.is_empty());
        assert_eq!(ast.html.span, Span::default());
        assert!(ast.css.is_none());
        assert!(ast.script.is_none());
    }

    #[test]
    fn parse_simple_element() {
        let ast = parse("<div>hello</div>").unwrap();
        assert_eq!(ast.html.children.len(), 1);
    }

    #[test]
    fn parse_with_script() {
        let ast = parse("<script>let x = 1;</script><div>x</div>").unwrap();
        assert!(ast.script.is_some());
        assert_eq!(ast.html.children.len(), 1);
    }

    #[test]
    fn filename_is_carried_into_diagnostics() {
        let options = ParseOptions {
            filename: Some("widget.petal".to_string()),
            custom_element: false,
        };
        let error = parse_with_options("<div>", options).unwrap_err();
        assert_eq!(error.filename.as_deref(), Some("widget.petal"));
    }
}
