//! Top-level script/style extraction and document-level rules.

use petal_parser::{parse, CssAtRuleBody, CssNode, ErrorCode, Span, TemplateNode};
use pretty_assertions::assert_eq;
use swc_ecma_ast::Program;

#[test]
fn script_blocks_are_extracted() {
    let ast = parse("<script>export let name;</script><h1>hi</h1>").unwrap();

    let script = ast.script.as_ref().unwrap();
    assert_eq!(script.span, Span::new(0u32, 33u32));
    assert_eq!(script.context.as_str(), "default");
    assert_eq!(script.content.span, Span::new(8u32, 24u32));

    let Program::Module(module) = &script.content.program else {
        panic!("expected a module");
    };
    assert_eq!(module.body.len(), 1);

    // The script leaves the template tree entirely.
    assert_eq!(ast.html.children.len(), 1);
    assert_eq!(ast.html.span, Span::new(33u32, 44u32));
}

#[test]
fn script_positions_map_to_document_offsets() {
    let ast = parse("<script>export let name;</script>").unwrap();
    let script = ast.script.unwrap();

    let Program::Module(module) = &script.content.program else {
        panic!("expected a module");
    };
    // `export` starts right after the opening tag.
    assert_eq!(u32::from(script.content.offset_of(module.span.lo)), 8);
}

#[test]
fn script_syntax_errors_become_parse_errors() {
    let error = parse("<script>let x = ;</script>").unwrap_err();
    assert_eq!(error.code, ErrorCode::ParseError);
    assert!(!error.message.is_empty());
    // Positioned inside the script content, not at the tag.
    assert!(u32::from(error.start) >= 8);
    assert!(u32::from(error.start) <= 17);
}

#[test]
fn unclosed_script_fails() {
    let error = parse("<script>let x = 1;").unwrap_err();
    assert_eq!(error.code, ErrorCode::UnclosedScript);
    assert_eq!(error.message, "Expected closing '</script>' tag");
    assert_eq!(u32::from(error.start), 8);
}

#[test]
fn second_script_block_fails() {
    let error = parse("<script>let a = 1;</script><script>let b = 2;</script>").unwrap_err();
    assert_eq!(error.code, ErrorCode::MultipleScripts);
    assert_eq!(
        error.message,
        "You can only have one top-level <script> tag per component"
    );
    assert_eq!(u32::from(error.start), 27);
}

#[test]
fn style_blocks_are_extracted_with_absolute_spans() {
    let ast = parse("<style>p { color: red; }</style>").unwrap();
    let style = ast.css.as_ref().unwrap();

    assert_eq!(style.span, Span::new(0u32, 32u32));
    assert_eq!(style.content.span, Span::new(7u32, 24u32));
    assert_eq!(style.content.styles, "p { color: red; }");
    assert_eq!(style.children.len(), 1);

    let CssNode::Rule(rule) = &style.children[0] else {
        panic!("expected a qualified rule");
    };
    assert_eq!(rule.prelude.text, "p");
    assert_eq!(rule.prelude.span, Span::new(7u32, 8u32));

    let declaration = &rule.block.declarations[0];
    assert_eq!(declaration.property.as_str(), "color");
    assert_eq!(declaration.value.text, "red");
    assert_eq!(declaration.value.span, Span::new(18u32, 21u32));
}

#[test]
fn empty_declarations_are_rejected() {
    let error = parse("<style>p { color: }</style>").unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidDeclaration);
    assert_eq!(error.message, "Declaration cannot be empty");
    assert_eq!(u32::from(error.start), 11);
}

#[test]
fn stylesheet_syntax_errors_are_rewrapped() {
    let error = parse("<style>p { color red; }</style>").unwrap_err();
    assert_eq!(error.code, ErrorCode::CssSyntaxError);
}

#[test]
fn second_style_block_fails_at_its_opening_angle() {
    let error = parse("<style>a{top:0}</style><style>b{top:0}</style>").unwrap_err();
    assert_eq!(error.code, ErrorCode::MultipleStyles);
    assert_eq!(
        error.message,
        "You can only have one top-level <style> tag per component"
    );
    assert_eq!(u32::from(error.start), 23);
}

#[test]
fn unterminated_style_fails() {
    let error = parse("<style>p{}").unwrap_err();
    assert_eq!(error.code, ErrorCode::UnexpectedEof);
    assert_eq!(error.message, "Expected </style>");
}

#[test]
fn style_tag_attributes_are_kept() {
    let ast = parse("<style media=\"screen\">p{top:0}</style>").unwrap();
    let style = ast.css.unwrap();
    assert_eq!(style.attributes.len(), 1);
    assert_eq!(style.attributes[0].span(), Span::new(7u32, 21u32));
}

#[test]
fn at_rules_nest() {
    let ast = parse("<style>@media screen { p { top: 0 } }</style>").unwrap();
    let style = ast.css.unwrap();
    let CssNode::AtRule(media) = &style.children[0] else {
        panic!("expected an at-rule");
    };
    assert_eq!(media.name.as_str(), "media");
    assert_eq!(media.prelude.text, "screen");
    match &media.body {
        Some(CssAtRuleBody::Rules(rules)) => assert_eq!(rules.len(), 1),
        other => panic!("expected nested rules, got {other:?}"),
    }
}

#[test]
fn only_top_level_blocks_are_extracted() {
    let ast = parse("<div><style>x{}</style></div><style>p{top:0}</style>").unwrap();

    let style = ast.css.as_ref().unwrap();
    assert_eq!(u32::from(style.span.start), 29);

    let TemplateNode::Element(div) = &ast.html.children[0] else {
        panic!("expected an element");
    };
    let TemplateNode::Element(nested) = &div.children[0] else {
        panic!("expected an element");
    };
    assert_eq!(nested.name.as_str(), "style");
}

#[test]
fn a_complete_component_parses() {
    let source = "\
<script>
    export let count;
</script>

<div class=\"counter\">
    <button on:click>+</button>
</div>

<style>
    .counter { display: flex; }
</style>
";
    let ast = parse(source).unwrap();

    assert!(ast.script.is_some());
    let style = ast.css.as_ref().unwrap();
    let CssNode::Rule(rule) = &style.children[0] else {
        panic!("expected a qualified rule");
    };
    assert_eq!(rule.prelude.text, ".counter");

    assert_eq!(ast.html.children.len(), 1);
    let TemplateNode::Element(div) = &ast.html.children[0] else {
        panic!("expected an element");
    };
    assert_eq!(div.name.as_str(), "div");

    for child in &ast.html.children {
        assert!(ast.html.span.contains_span(child.span()));
    }
}
