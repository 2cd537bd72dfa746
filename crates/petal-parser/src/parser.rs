//! Recursive descent parser for Petal templates.
//!
//! One [`Parser`] instance owns the template text, the scan index, the arena
//! of nodes under construction, and the open-element stack (a sequence of
//! arena indices; index 0 is the root fragment and is never popped). The
//! driver loop dispatches on one character of lookahead: `<` starts a tag,
//! anything else is text. Parsing is fail-fast; the first error aborts the
//! whole parse.

use std::collections::HashSet;

use smol_str::SmolStr;
use source_map::Span;
use swc_common::BytePos;
use swc_ecma_ast::{Expr, Ident};

use crate::ast::{
    Ast, Attribute, Comment, Directive, DirectiveKind, Element, ElementKind, Expression, Fragment,
    NormalAttribute, Script, Style, TemplateNode, Text,
};
use crate::cursor::is_whitespace;
use crate::entities::decode_character_references;
use crate::error::{ErrorCode, Result};
use crate::names;
use crate::{script, style, ParseOptions};

/// Index of a node in the parse arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NodeId(usize);

/// A node under construction. `end` stays unset until the node is closed; no
/// node is touched again after it has been closed and popped.
#[derive(Debug)]
struct RawNode {
    start: usize,
    end: Option<usize>,
    kind: RawKind,
}

#[derive(Debug)]
enum RawKind {
    Fragment {
        children: Vec<NodeId>,
    },
    Element {
        kind: ElementKind,
        name: SmolStr,
        attributes: Vec<Attribute>,
        children: Vec<NodeId>,
    },
    Text {
        raw: String,
        decoded: String,
    },
    Comment {
        data: String,
    },
}

pub(crate) fn span(start: usize, end: usize) -> Span {
    Span::new(start as u32, end as u32)
}

fn swc_span(span: Span) -> swc_common::Span {
    swc_common::Span::new(BytePos(span.start.into()), BytePos(span.end.into()))
}

pub(crate) struct Parser<'a> {
    pub(crate) template: &'a str,
    pub(crate) index: usize,
    pub(crate) filename: Option<String>,
    custom_element: bool,
    nodes: Vec<RawNode>,
    stack: Vec<NodeId>,
    scripts: Vec<Script>,
    styles: Vec<Style>,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(template: &'a str, options: ParseOptions) -> Self {
        let root = RawNode {
            start: 0,
            end: None,
            kind: RawKind::Fragment {
                children: Vec::new(),
            },
        };
        Self {
            template,
            index: 0,
            filename: options.filename,
            custom_element: options.custom_element,
            nodes: vec![root],
            stack: vec![NodeId(0)],
            scripts: Vec::new(),
            styles: Vec::new(),
        }
    }

    pub(crate) fn run(mut self) -> Result<Ast> {
        while !self.at_end() {
            if self.match_str("<") {
                self.tag()?;
            } else {
                self.text();
            }
        }

        // Elements whose closing tag may be omitted close implicitly at end
        // of input.
        while self.stack.len() > 1 {
            let top = self.current();
            let omitted = match &self.nodes[top.0].kind {
                RawKind::Element { name, .. } => names::closing_tag_omitted(name, None),
                _ => false,
            };
            if !omitted {
                break;
            }
            self.close(top, self.index);
            self.stack.pop();
        }

        if self.stack.len() > 1 {
            let open = &self.nodes[self.current().0];
            return Err(match &open.kind {
                RawKind::Element { name, .. } => self.error_at(
                    ErrorCode::UnclosedElement,
                    format!("<{name}> was left open"),
                    open.start,
                ),
                _ => self.error_at(ErrorCode::UnclosedBlock, "Block was left open", open.start),
            });
        }

        if self.styles.len() > 1 {
            let second = u32::from(self.styles[1].span.start) as usize;
            return Err(self.error_at(
                ErrorCode::MultipleStyles,
                "You can only have one top-level <style> tag per component",
                second,
            ));
        }
        if self.scripts.len() > 1 {
            let second = u32::from(self.scripts[1].span.start) as usize;
            return Err(self.error_at(
                ErrorCode::MultipleScripts,
                "You can only have one top-level <script> tag per component",
                second,
            ));
        }

        Ok(self.into_ast())
    }

    // === arena & stack ===

    fn alloc(&mut self, node: RawNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn current(&self) -> NodeId {
        *self.stack.last().expect("the root fragment is never popped")
    }

    fn append_child(&mut self, child: NodeId) {
        let parent = self.current();
        self.push_child_of(parent, child);
    }

    fn push_child_of(&mut self, parent: NodeId, child: NodeId) {
        match &mut self.nodes[parent.0].kind {
            RawKind::Fragment { children } | RawKind::Element { children, .. } => {
                children.push(child);
            }
            _ => unreachable!("only fragments and elements hold children"),
        }
    }

    fn close(&mut self, id: NodeId, end: usize) {
        self.nodes[id.0].end = Some(end);
    }

    // === text handler ===

    fn text(&mut self) {
        let start = self.index;
        let raw = self.read_while(|c| c != '<').to_string();
        let node = self.alloc(RawNode {
            start,
            end: Some(self.index),
            kind: RawKind::Text {
                decoded: decode_character_references(&raw),
                raw,
            },
        });
        self.append_child(node);
    }

    // === tag handler ===

    fn tag(&mut self) -> Result<()> {
        let start = self.index;
        self.index += 1;

        if self.eat("!--") {
            let data = self.read_until_str("-->").to_string();
            self.eat_required_with("-->", "Expected closing comment tag (\"-->\").")?;
            let comment = self.alloc(RawNode {
                start,
                end: Some(self.index),
                kind: RawKind::Comment { data },
            });
            self.append_child(comment);
            return Ok(());
        }

        let is_closing_tag = self.eat("/");
        let name = self.read_tag_name()?;

        let kind = if name.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
            ElementKind::InlineComponent
        } else if name == "slot" && !self.custom_element {
            ElementKind::Slot
        } else {
            ElementKind::Element
        };

        self.allow_whitespace();

        if is_closing_tag {
            if names::is_void_element(&name) {
                return Err(self.error(
                    ErrorCode::InvalidClosingTag,
                    format!("<{name}> does not require a closing tag, and is therefore invalid"),
                ));
            }
            self.eat_required(">")?;

            // Pop open elements until the matching one; popped intermediates
            // close at this tag's `<`.
            loop {
                let top = self.current();
                let found = match &self.nodes[top.0].kind {
                    RawKind::Element {
                        name: open_name, ..
                    } => Some(*open_name == name),
                    _ => None,
                };
                match found {
                    Some(true) => {
                        self.close(top, self.index);
                        self.stack.pop();
                        return Ok(());
                    }
                    Some(false) => {
                        self.close(top, start);
                        self.stack.pop();
                    }
                    None => {
                        return Err(self.error_at(
                            ErrorCode::InvalidClosingTag,
                            format!("</{name}> attempted to close an element that was not open"),
                            start,
                        ));
                    }
                }
            }
        }

        // A new sibling can implicitly close the current element (<p><p>, <li><li>, ...).
        let top = self.current();
        let implicitly_closed = match &self.nodes[top.0].kind {
            RawKind::Element {
                name: open_name, ..
            } => names::closing_tag_omitted(open_name, Some(&name)),
            _ => false,
        };
        if implicitly_closed {
            self.close(top, start);
            self.stack.pop();
        }

        let mut attributes = Vec::new();
        let mut unique_names: HashSet<String> = HashSet::new();
        while let Some(attribute) = self.read_attribute(&mut unique_names)? {
            attributes.push(attribute);
            self.allow_whitespace();
        }

        // Top-level script/style blocks leave the tree entirely.
        if (name == "script" || name == "style") && self.stack.len() == 1 {
            self.eat_required(">")?;
            if name == "script" {
                let block = script::read_script(self, start)?;
                self.scripts.push(block);
            } else {
                let block = style::read_style(self, start, attributes)?;
                self.styles.push(block);
            }
            return Ok(());
        }

        let element = self.alloc(RawNode {
            start,
            end: None,
            kind: RawKind::Element {
                kind,
                name: name.clone(),
                attributes,
                children: Vec::new(),
            },
        });
        self.append_child(element);

        let self_closing = self.eat("/") || names::is_void_element(&name);
        self.eat_required(">")?;

        if self_closing {
            self.close(element, self.index);
        } else if name == "textarea" {
            let chunks = self.read_sequence(|parser| parser.match_str("</textarea>"))?;
            for chunk in chunks {
                let child = self.alloc(RawNode {
                    start: u32::from(chunk.span.start) as usize,
                    end: Some(u32::from(chunk.span.end) as usize),
                    kind: RawKind::Text {
                        raw: chunk.raw,
                        decoded: chunk.decoded,
                    },
                });
                self.push_child_of(element, child);
            }
            self.eat("</textarea>");
            self.close(element, self.index);
        } else if name == "script" || name == "style" {
            // Nested raw text: one verbatim chunk up to the literal closing tag.
            let closing_tag = format!("</{name}>");
            let text_start = self.index;
            let data = self.read_until_str(&closing_tag).to_string();
            let child = self.alloc(RawNode {
                start: text_start,
                end: Some(self.index),
                kind: RawKind::Text {
                    raw: data.clone(),
                    decoded: data,
                },
            });
            self.push_child_of(element, child);
            self.eat_required(&closing_tag)?;
            self.close(element, self.index);
        } else {
            self.stack.push(element);
        }

        Ok(())
    }

    fn read_tag_name(&mut self) -> Result<SmolStr> {
        let start = self.index;
        let name = self.read_while(|c| !is_whitespace(c) && c != '/' && c != '>');
        if !is_valid_tag_name(name) {
            return Err(self.error_at(ErrorCode::InvalidTagName, "Expected valid tag name", start));
        }
        Ok(SmolStr::new(name))
    }

    // === attributes ===

    fn read_attribute(
        &mut self,
        unique_names: &mut HashSet<String>,
    ) -> Result<Option<Attribute>> {
        let start = self.index;
        let name =
            self.read_while(|c| !is_whitespace(c) && !matches!(c, '=' | '/' | '>' | '"' | '\''));
        if name.is_empty() {
            return Ok(None);
        }
        let mut end = self.index;
        self.allow_whitespace();

        let directive = name
            .find(':')
            .and_then(|at| DirectiveKind::from_namespace(&name[..at]).map(|kind| (at, kind)));

        let mut value = Vec::new();
        if self.eat("=") {
            self.allow_whitespace();
            value = self.read_attribute_value()?;
            end = self.index;
            // Another attribute may only follow after whitespace.
            if !self.at_end() && !self.match_str(">") && !self.match_str("/") {
                self.require_whitespace()?;
            }
        } else if self.peek().is_some_and(|c| c == '"' || c == '\'') {
            return Err(self.error(ErrorCode::UnexpectedToken, "Expected '='"));
        }

        if let Some((colon_index, kind)) = directive {
            let mut parts = name[colon_index + 1..].split('|');
            let directive_name = SmolStr::new(parts.next().unwrap_or(""));
            let modifiers: Vec<SmolStr> = parts.map(SmolStr::new).collect();

            if kind == DirectiveKind::Binding && directive_name != "this" {
                self.check_unique(unique_names, &directive_name, start)?;
            } else if kind != DirectiveKind::EventHandler {
                self.check_unique(unique_names, name, start)?;
            }

            if let Some(first) = value.first() {
                // The sequence reader only yields text chunks while expression
                // interpolation is disabled, so any supplied value is rejected.
                return Err(self.error_at(
                    ErrorCode::InvalidDirectiveValue,
                    "Directive value must be a JavaScript expression enclosed in curly braces",
                    u32::from(first.span.start) as usize,
                ));
            }

            let expression = matches!(kind, DirectiveKind::Binding | DirectiveKind::Class)
                .then(|| {
                    let identifier_span = span(start + colon_index + 1, end);
                    Expression {
                        span: identifier_span,
                        node: Box::new(Expr::Ident(Ident::new_no_ctxt(
                            directive_name.as_str().into(),
                            swc_span(identifier_span),
                        ))),
                    }
                });

            return Ok(Some(Attribute::Directive(Directive {
                span: span(start, end),
                kind,
                name: directive_name,
                modifiers,
                expression,
            })));
        }

        self.check_unique(unique_names, name, start)?;

        Ok(Some(Attribute::Normal(NormalAttribute {
            span: span(start, end),
            name: SmolStr::new(name),
            value,
        })))
    }

    fn check_unique(
        &self,
        unique_names: &mut HashSet<String>,
        name: &str,
        start: usize,
    ) -> Result<()> {
        if !unique_names.insert(name.to_string()) {
            return Err(self.error_at(
                ErrorCode::DuplicateAttribute,
                "Attributes defined on an element need to be unique",
                start,
            ));
        }
        Ok(())
    }

    fn read_attribute_value(&mut self) -> Result<Vec<Text>> {
        let quote = if self.eat("'") {
            Some('\'')
        } else if self.eat("\"") {
            Some('"')
        } else {
            None
        };

        let chunks = match quote {
            Some(mark) => self.read_sequence(move |parser| parser.peek() == Some(mark))?,
            None => self.read_sequence(|parser| {
                parser.match_str("/>")
                    || parser.peek().is_some_and(|c| {
                        is_whitespace(c) || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`')
                    })
            })?,
        };

        if quote.is_some() {
            self.index += 1;
        }
        Ok(chunks)
    }

    // === sequence reader ===

    /// Reads characters into a pending chunk until `done` holds, then flushes
    /// the chunk (decoding character references). Running out of input before
    /// the boundary is an error.
    fn read_sequence(&mut self, done: impl Fn(&Parser<'a>) -> bool) -> Result<Vec<Text>> {
        let chunk_start = self.index;
        let mut raw = String::new();
        let mut chunks = Vec::new();

        while let Some(c) = self.peek() {
            if done(self) {
                if !raw.is_empty() {
                    chunks.push(Text {
                        span: span(chunk_start, self.index),
                        decoded: decode_character_references(&raw),
                        raw,
                    });
                }
                return Ok(chunks);
            }
            raw.push(c);
            self.index += c.len_utf8();
        }

        Err(self.error(ErrorCode::UnexpectedEof, "Unexpected end of file"))
    }

    // === finish ===

    fn into_ast(self) -> Ast {
        let Parser {
            nodes,
            mut scripts,
            mut styles,
            ..
        } = self;

        let mut built: Vec<Option<TemplateNode>> = Vec::new();
        built.resize_with(nodes.len(), || None);

        // Children are always allocated after their parent, so a reverse walk
        // finishes every child before the node that owns it.
        let mut root_children = Vec::new();
        for (id, raw) in nodes.into_iter().enumerate().rev() {
            let node_span = span(raw.start, raw.end.unwrap_or(raw.start));
            match raw.kind {
                RawKind::Fragment { children } => {
                    if id == 0 {
                        root_children = children;
                    }
                }
                RawKind::Element {
                    kind,
                    name,
                    attributes,
                    children,
                } => {
                    let children = children
                        .into_iter()
                        .map(|child| built[child.0].take().expect("child finished before parent"))
                        .collect();
                    built[id] = Some(TemplateNode::Element(Element {
                        span: node_span,
                        kind,
                        name,
                        attributes,
                        children,
                    }));
                }
                RawKind::Text { raw, decoded } => {
                    built[id] = Some(TemplateNode::Text(Text {
                        span: node_span,
                        raw,
                        decoded,
                    }));
                }
                RawKind::Comment { data } => {
                    built[id] = Some(TemplateNode::Comment(Comment {
                        span: node_span,
                        data,
                    }));
                }
            }
        }

        let mut children: Vec<TemplateNode> = root_children
            .into_iter()
            .map(|child| built[child.0].take().expect("child finished before parent"))
            .collect();
        let fragment_span = trim_fragment(&mut children);

        Ast {
            html: Fragment {
                span: fragment_span,
                children,
            },
            css: styles.pop(),
            script: scripts.pop(),
        }
    }
}

/// Tag names: optional leading `!`, one or more ASCII letters, at most one
/// `:`, then ASCII alphanumerics and hyphens.
fn is_valid_tag_name(name: &str) -> bool {
    let rest = name.strip_prefix('!').unwrap_or(name);
    let mut chars = rest.chars();
    if !chars.next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    let mut in_tail = false;
    for c in chars {
        if !in_tail && c.is_ascii_alphabetic() {
            continue;
        }
        if !in_tail && c == ':' {
            in_tail = true;
            continue;
        }
        if c.is_ascii_alphanumeric() || c == '-' {
            in_tail = true;
            continue;
        }
        return false;
    }
    true
}

/// Removes leading/trailing whitespace-only text children and trims the
/// boundary text nodes in place, so every remaining child lies inside the
/// returned fragment span. An empty fragment spans `[0, 0)`.
fn trim_fragment(children: &mut Vec<TemplateNode>) -> Span {
    while let Some(TemplateNode::Text(text)) = children.first_mut() {
        let removed = text.raw.len() - text.raw.trim_start_matches(is_whitespace).len();
        if removed == 0 {
            break;
        }
        if removed == text.raw.len() {
            children.remove(0);
            continue;
        }
        text.raw.replace_range(..removed, "");
        text.decoded = text.decoded.trim_start_matches(is_whitespace).to_string();
        text.span.start += text_size::TextSize::from(removed as u32);
        break;
    }

    while let Some(TemplateNode::Text(text)) = children.last_mut() {
        let removed = text.raw.len() - text.raw.trim_end_matches(is_whitespace).len();
        if removed == 0 {
            break;
        }
        if removed == text.raw.len() {
            children.pop();
            continue;
        }
        let keep = text.raw.len() - removed;
        text.raw.truncate(keep);
        text.decoded = text.decoded.trim_end_matches(is_whitespace).to_string();
        text.span.end -= text_size::TextSize::from(removed as u32);
        break;
    }

    match (children.first(), children.last()) {
        (Some(first), Some(last)) => Span::new(first.span().start, last.span().end),
        _ => Span::default(),
    }
}
