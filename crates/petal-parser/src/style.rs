//! Top-level style extraction.
//!
//! The body of a top-level `<style>` block is run through the `cssparser`
//! tokenizer to build a positioned rule/declaration tree. Every span is
//! document-absolute: the adapter adds the block's content offset to each
//! `cssparser` byte position, and converts error line/column locations back
//! to offsets through a [`LineIndex`] over the style text.

use cssparser::{
    BasicParseErrorKind, Delimiter, Delimiters, ParseErrorKind, Parser as CssParser, ParserInput,
    SourceLocation, SourcePosition, ToCss, Token,
};
use smol_str::SmolStr;
use source_map::{LineCol, LineIndex, Span};

use crate::ast::{Attribute, Style, StyleContent};
use crate::error::{ErrorCode, Result};
use crate::parser::{span, Parser};

const CLOSING_TAG: &str = "</style>";

type RuleParseError<'i> = cssparser::ParseError<'i, StyleError>;

/// A top-level node in a parsed stylesheet.
#[derive(Debug, Clone)]
pub enum CssNode {
    /// A qualified rule, `selector { declarations }`.
    Rule(CssRule),
    /// An at-rule, `@name prelude;` or `@name prelude { body }`.
    AtRule(CssAtRule),
}

impl CssNode {
    /// The span of this node.
    pub fn span(&self) -> Span {
        match self {
            CssNode::Rule(rule) => rule.span,
            CssNode::AtRule(rule) => rule.span,
        }
    }
}

/// A qualified rule.
#[derive(Debug, Clone)]
pub struct CssRule {
    /// Span from the prelude to the closing `}`.
    pub span: Span,
    /// The selector prelude.
    pub prelude: CssPrelude,
    /// The declaration block.
    pub block: CssBlock,
}

/// The raw text before a rule's block (or before an at-rule's body).
#[derive(Debug, Clone)]
pub struct CssPrelude {
    /// Span of the trimmed prelude text.
    pub span: Span,
    /// The prelude text, surrounding whitespace removed.
    pub text: String,
}

/// A `{ ... }` declaration block.
#[derive(Debug, Clone)]
pub struct CssBlock {
    /// Span including both braces.
    pub span: Span,
    /// Declarations in source order.
    pub declarations: Vec<CssDeclaration>,
}

/// A single `property: value` declaration.
#[derive(Debug, Clone)]
pub struct CssDeclaration {
    /// Span from the property name to the end of the value.
    pub span: Span,
    /// The property name.
    pub property: SmolStr,
    /// The declaration value.
    pub value: CssValue,
    /// Whether the value carried `!important`.
    pub important: bool,
}

/// A declaration value, kept as positioned raw text.
#[derive(Debug, Clone)]
pub struct CssValue {
    /// Span of the value text (excluding `!important`).
    pub span: Span,
    /// The value text.
    pub text: String,
}

/// An at-rule.
#[derive(Debug, Clone)]
pub struct CssAtRule {
    /// Span from the `@` to the end of the body (or the `;`).
    pub span: Span,
    /// The at-rule name without the `@`.
    pub name: SmolStr,
    /// The prelude between the name and the body.
    pub prelude: CssPrelude,
    /// The body, absent for statement-style at-rules such as `@import`.
    pub body: Option<CssAtRuleBody>,
}

/// The body of a block at-rule.
#[derive(Debug, Clone)]
pub enum CssAtRuleBody {
    /// Nested rules (`@media`, `@supports`, ...).
    Rules(Vec<CssNode>),
    /// A declaration list (`@font-face`, `@page`, ...).
    Declarations(Vec<CssDeclaration>),
}

/// At-rules whose block nests further rules rather than declarations.
const RULE_LIST_AT_RULES: &[&str] = &[
    "container",
    "document",
    "keyframes",
    "layer",
    "media",
    "supports",
];

pub(crate) fn read_style(
    parser: &mut Parser<'_>,
    start: usize,
    attributes: Vec<Attribute>,
) -> Result<Style> {
    let content_start = parser.index;
    let styles = parser.read_until_str(CLOSING_TAG).to_string();
    let content_end = parser.index;

    let children = parse_stylesheet(&styles, content_start)
        .map_err(|error| parser.error_at(error.code, error.message, error.offset))?;

    parser.eat_required(CLOSING_TAG)?;

    Ok(Style {
        span: span(start, parser.index),
        attributes,
        children,
        content: StyleContent {
            span: span(content_start, content_end),
            styles,
        },
    })
}

/// A stylesheet failure with a document-absolute offset.
#[derive(Debug)]
struct StyleError {
    code: ErrorCode,
    message: String,
    offset: usize,
}

/// Offset bookkeeping shared by all parsing below.
struct Sheet {
    offset: usize,
    line_index: LineIndex,
}

impl Sheet {
    fn abs(&self, position: SourcePosition) -> usize {
        self.offset + position.byte_index()
    }

    fn span(&self, start: SourcePosition, end: SourcePosition) -> Span {
        span(self.abs(start), self.abs(end))
    }

    /// Converts a cssparser line/column location (0-indexed lines, 1-indexed
    /// columns) into a document offset.
    fn location(&self, location: SourceLocation) -> usize {
        let position = LineCol::new(location.line, location.column.saturating_sub(1));
        self.line_index
            .offset(position)
            .map_or(self.offset, |offset| self.offset + u32::from(offset) as usize)
    }

    fn convert(&self, error: RuleParseError<'_>) -> StyleError {
        match error.kind {
            ParseErrorKind::Custom(style_error) => style_error,
            ParseErrorKind::Basic(basic) => StyleError {
                code: ErrorCode::CssSyntaxError,
                message: describe_basic(&basic),
                offset: self.location(error.location),
            },
        }
    }
}

fn describe_basic(kind: &BasicParseErrorKind<'_>) -> String {
    match kind {
        BasicParseErrorKind::UnexpectedToken(token) => {
            format!("Unexpected token '{}'", token.to_css_string())
        }
        BasicParseErrorKind::EndOfInput => "Unexpected end of input".to_string(),
        BasicParseErrorKind::AtRuleInvalid(name) => format!("Invalid at-rule @{name}"),
        BasicParseErrorKind::AtRuleBodyInvalid => "Invalid at-rule body".to_string(),
        BasicParseErrorKind::QualifiedRuleInvalid => "Invalid rule".to_string(),
    }
}

fn parse_stylesheet(styles: &str, offset: usize) -> Result<Vec<CssNode>, StyleError> {
    let sheet = Sheet {
        offset,
        line_index: LineIndex::new(styles),
    };
    let mut input = ParserInput::new(styles);
    let mut input = CssParser::new(&mut input);
    parse_rule_list(&mut input, &sheet).map_err(|error| sheet.convert(error))
}

fn parse_rule_list<'i>(
    input: &mut CssParser<'i, '_>,
    sheet: &Sheet,
) -> Result<Vec<CssNode>, RuleParseError<'i>> {
    let mut nodes = Vec::new();
    loop {
        skip_whitespace(input);
        if input.is_exhausted() {
            break;
        }
        nodes.push(parse_rule(input, sheet)?);
    }
    Ok(nodes)
}

fn parse_rule<'i>(
    input: &mut CssParser<'i, '_>,
    sheet: &Sheet,
) -> Result<CssNode, RuleParseError<'i>> {
    let rule_start = input.position();

    let before = input.state();
    let first = input.next()?.clone();
    if let Token::AtKeyword(name) = first {
        let name = SmolStr::new(name.as_ref());
        return parse_at_rule(input, sheet, rule_start, name);
    }
    input.reset(&before);

    let prelude = parse_prelude(input, sheet, Delimiter::CurlyBracketBlock)?;
    if prelude.text.is_empty() {
        return Err(input.new_custom_error(StyleError {
            code: ErrorCode::CssSyntaxError,
            message: "Selector is missing".to_string(),
            offset: sheet.abs(rule_start),
        }));
    }

    let block_start = input.position();
    match input.next().map(|token| token.clone()) {
        Ok(Token::CurlyBracketBlock) => {}
        Ok(other) => return Err(input.new_unexpected_token_error(other)),
        Err(error) => return Err(error.into()),
    }
    let declarations = input.parse_nested_block(|block| parse_declaration_list(block, sheet))?;
    let block_end = input.position();

    Ok(CssNode::Rule(CssRule {
        span: sheet.span(rule_start, block_end),
        prelude,
        block: CssBlock {
            span: sheet.span(block_start, block_end),
            declarations,
        },
    }))
}

fn parse_at_rule<'i>(
    input: &mut CssParser<'i, '_>,
    sheet: &Sheet,
    rule_start: SourcePosition,
    name: SmolStr,
) -> Result<CssNode, RuleParseError<'i>> {
    let prelude = parse_prelude(
        input,
        sheet,
        Delimiter::Semicolon | Delimiter::CurlyBracketBlock,
    )?;

    let body = match input.next().map(|token| token.clone()) {
        Err(_) | Ok(Token::Semicolon) => None,
        Ok(Token::CurlyBracketBlock) => {
            if RULE_LIST_AT_RULES.contains(&name.as_str()) {
                Some(CssAtRuleBody::Rules(
                    input.parse_nested_block(|block| parse_rule_list(block, sheet))?,
                ))
            } else {
                Some(CssAtRuleBody::Declarations(
                    input.parse_nested_block(|block| parse_declaration_list(block, sheet))?,
                ))
            }
        }
        Ok(other) => return Err(input.new_unexpected_token_error(other)),
    };
    let end = input.position();

    Ok(CssNode::AtRule(CssAtRule {
        span: sheet.span(rule_start, end),
        name,
        prelude,
        body,
    }))
}

fn parse_prelude<'i>(
    input: &mut CssParser<'i, '_>,
    sheet: &Sheet,
    stop: Delimiters,
) -> Result<CssPrelude, RuleParseError<'i>> {
    let start = input.position();
    input.parse_until_before(stop, |prelude| {
        while prelude.next().is_ok() {}
        Ok::<(), RuleParseError<'i>>(())
    })?;
    let raw = input.slice_from(start);
    let leading = raw.len() - raw.trim_start().len();
    let text = raw.trim().to_string();
    let text_start = sheet.abs(start) + leading;
    Ok(CssPrelude {
        span: span(text_start, text_start + text.len()),
        text,
    })
}

fn parse_declaration_list<'i>(
    input: &mut CssParser<'i, '_>,
    sheet: &Sheet,
) -> Result<Vec<CssDeclaration>, RuleParseError<'i>> {
    let mut declarations = Vec::new();
    loop {
        skip_whitespace(input);
        if input.is_exhausted() {
            break;
        }
        let declaration_start = input.position();
        let property = match input.next()?.clone() {
            Token::Ident(name) => SmolStr::new(name.as_ref()),
            Token::Semicolon => continue,
            other => return Err(input.new_unexpected_token_error(other)),
        };
        input.expect_colon()?;
        skip_whitespace(input);

        let value_start = input.position();
        input.parse_until_before(Delimiter::Semicolon, |value| {
            while value.next().is_ok() {}
            Ok::<(), RuleParseError<'i>>(())
        })?;
        let raw_value = input.slice_from(value_start);
        if !input.is_exhausted() {
            // the terminating semicolon
            let _ = input.next();
        }

        let (text, important) = split_important(raw_value);
        if text.is_empty() {
            return Err(input.new_custom_error(StyleError {
                code: ErrorCode::InvalidDeclaration,
                message: "Declaration cannot be empty".to_string(),
                offset: sheet.abs(declaration_start),
            }));
        }

        let value_abs = sheet.abs(value_start);
        let declaration_end = value_abs + raw_value.trim_end().len();
        declarations.push(CssDeclaration {
            span: span(sheet.abs(declaration_start), declaration_end),
            property,
            value: CssValue {
                span: span(value_abs, value_abs + text.len()),
                text: text.to_string(),
            },
            important,
        });
    }
    Ok(declarations)
}

/// Splits a trailing `!important` off a raw declaration value.
fn split_important(raw: &str) -> (&str, bool) {
    let trimmed = raw.trim();
    let len = trimmed.len();
    let has_keyword = len >= 9
        && trimmed.is_char_boundary(len - 9)
        && trimmed[len - 9..].eq_ignore_ascii_case("important");
    if has_keyword {
        let before = trimmed[..len - 9].trim_end();
        if let Some(value) = before.strip_suffix('!') {
            return (value.trim_end(), true);
        }
    }
    (trimmed, false)
}

fn skip_whitespace(input: &mut CssParser<'_, '_>) {
    loop {
        let state = input.state();
        let whitespace = matches!(
            input.next_including_whitespace(),
            Ok(&Token::WhiteSpace(_))
        );
        if !whitespace {
            input.reset(&state);
            return;
        }
    }
}
