//! AST types for parsed Petal templates.
//!
//! Every node carries a [`Span`] into the original template. Nodes are plain
//! owned data; nothing borrows from the source after parsing.

use smol_str::SmolStr;
use source_map::{ByteOffset, Span};
use swc_common::BytePos;
use swc_ecma_ast::{Expr, Program};
use text_size::TextSize;

use crate::style::CssNode;

/// The result of a successful parse.
#[derive(Debug, Clone)]
pub struct Ast {
    /// The template tree under a synthetic root fragment.
    pub html: Fragment,
    /// The top-level style block, if the document had one.
    pub css: Option<Style>,
    /// The top-level script block, if the document had one.
    pub script: Option<Script>,
}

/// The synthetic root holding all top-level template children.
///
/// Its span is trimmed to exclude leading and trailing whitespace; an empty
/// template gets the zero span.
#[derive(Debug, Clone, Default)]
pub struct Fragment {
    /// Span of the template content.
    pub span: Span,
    /// Top-level nodes in document order.
    pub children: Vec<TemplateNode>,
}

/// A node in the template tree.
#[derive(Debug, Clone)]
pub enum TemplateNode {
    /// An element, inline component, or slot.
    Element(Element),
    /// Literal text.
    Text(Text),
    /// An HTML comment.
    Comment(Comment),
}

impl TemplateNode {
    /// The span of this node.
    pub fn span(&self) -> Span {
        match self {
            TemplateNode::Element(node) => node.span,
            TemplateNode::Text(node) => node.span,
            TemplateNode::Comment(node) => node.span,
        }
    }
}

/// Which flavor of element a tag produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// A plain DOM element.
    Element,
    /// A component reference; the tag name starts uppercase.
    InlineComponent,
    /// A `<slot>` element (custom-element mode off).
    Slot,
}

/// An element and its parsed attributes and children.
#[derive(Debug, Clone)]
pub struct Element {
    /// Span from the opening `<` to just past the tag's end.
    pub span: Span,
    /// Element, component, or slot.
    pub kind: ElementKind,
    /// The tag name as written.
    pub name: SmolStr,
    /// Attributes and directives in source order.
    pub attributes: Vec<Attribute>,
    /// Child nodes in source order.
    pub children: Vec<TemplateNode>,
}

/// A run of literal text.
#[derive(Debug, Clone)]
pub struct Text {
    /// Span of the raw text.
    pub span: Span,
    /// The text exactly as written.
    pub raw: String,
    /// The text with character references decoded.
    pub decoded: String,
}

/// An HTML comment.
#[derive(Debug, Clone)]
pub struct Comment {
    /// Span including the `<!--` and `-->` delimiters.
    pub span: Span,
    /// The comment body.
    pub data: String,
}

/// An attribute entry on an element.
#[derive(Debug, Clone)]
pub enum Attribute {
    /// A plain attribute, `name` or `name=value`.
    Normal(NormalAttribute),
    /// A namespaced directive such as `bind:value` or `on:click`.
    Directive(Directive),
}

impl Attribute {
    /// The span of this attribute.
    pub fn span(&self) -> Span {
        match self {
            Attribute::Normal(attribute) => attribute.span,
            Attribute::Directive(directive) => directive.span,
        }
    }
}

/// A plain attribute.
#[derive(Debug, Clone)]
pub struct NormalAttribute {
    /// Span from the name to the end of the value (including a closing quote).
    pub span: Span,
    /// The attribute name as written, colon and all for unknown namespaces.
    pub name: SmolStr,
    /// Text chunks making up the value; empty for bare attributes.
    pub value: Vec<Text>,
}

/// The directive namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `use:action`
    Action,
    /// `bind:property`
    Binding,
    /// `class:name`
    Class,
    /// `on:event`
    EventHandler,
    /// `let:name`
    Let,
}

impl DirectiveKind {
    /// Maps a namespace prefix to its directive kind.
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace {
            "use" => Some(DirectiveKind::Action),
            "bind" => Some(DirectiveKind::Binding),
            "class" => Some(DirectiveKind::Class),
            "on" => Some(DirectiveKind::EventHandler),
            "let" => Some(DirectiveKind::Let),
            _ => None,
        }
    }
}

/// A directive attribute.
#[derive(Debug, Clone)]
pub struct Directive {
    /// Span of the whole directive, value included.
    pub span: Span,
    /// The directive namespace.
    pub kind: DirectiveKind,
    /// The target after the colon (event name, bound property, ...).
    pub name: SmolStr,
    /// Pipe-separated modifiers after the target.
    pub modifiers: Vec<SmolStr>,
    /// The directive expression. For valueless `bind:`/`class:` directives an
    /// identifier named after the target is synthesized here.
    pub expression: Option<Expression>,
}

/// An embedded expression, parsed (or synthesized) as an ECMAScript node.
#[derive(Debug, Clone)]
pub struct Expression {
    /// Document-absolute span of the expression.
    pub span: Span,
    /// The expression itself.
    pub node: Box<Expr>,
}

/// A top-level script block.
#[derive(Debug, Clone)]
pub struct Script {
    /// Span from the opening `<` to just past `</script>`.
    pub span: Span,
    /// The script context. Only `"default"` is produced today.
    pub context: SmolStr,
    /// The parsed module body.
    pub content: ParsedProgram,
}

/// An ECMAScript program parsed out of a script block.
///
/// The inner `swc` spans are relative to the adapter's source file; use
/// [`ParsedProgram::offset_of`] to translate any of them into a document
/// offset.
#[derive(Debug, Clone)]
pub struct ParsedProgram {
    /// Document-absolute span of the script content between the tags.
    pub span: Span,
    /// The parsed module.
    pub program: Program,
    /// Base position `swc` assigned to the (padded) source file.
    base: BytePos,
}

impl ParsedProgram {
    pub(crate) fn new(span: Span, program: Program, base: BytePos) -> Self {
        Self {
            span,
            program,
            base,
        }
    }

    /// Translates a position inside [`ParsedProgram::program`] into a
    /// document-absolute byte offset.
    pub fn offset_of(&self, pos: BytePos) -> ByteOffset {
        TextSize::from(pos.0.saturating_sub(self.base.0))
    }
}

/// A top-level style block.
#[derive(Debug, Clone)]
pub struct Style {
    /// Span from the opening `<` to just past `</style>`.
    pub span: Span,
    /// Attributes written on the `<style>` tag.
    pub attributes: Vec<Attribute>,
    /// The parsed stylesheet rules.
    pub children: Vec<CssNode>,
    /// The raw stylesheet text.
    pub content: StyleContent,
}

/// The verbatim body of a style block.
#[derive(Debug, Clone)]
pub struct StyleContent {
    /// Document-absolute span of the text between the tags.
    pub span: Span,
    /// The stylesheet text exactly as written.
    pub styles: String,
}
