//! Top-level script extraction.
//!
//! The body of a top-level `<script>` block is handed to the swc ECMAScript
//! parser as a module. The source is left-padded with spaces so swc's
//! positions line up with document offsets; syntax errors come back as
//! `parse-error` diagnostics pointing into the template.

use swc_common::{sync::Lrc, BytePos, FileName, SourceMap, Spanned};
use swc_ecma_ast::Program;
use swc_ecma_parser::{lexer::Lexer, Parser as EsParser, StringInput, Syntax};

use crate::ast::{ParsedProgram, Script};
use crate::error::{ErrorCode, Result};
use crate::parser::{span, Parser};

const CLOSING_TAG: &str = "</script>";

pub(crate) fn read_script(parser: &mut Parser<'_>, start: usize) -> Result<Script> {
    let content_start = parser.index;
    let rest = &parser.template[content_start..];
    let Some(found) = memchr::memmem::find(rest.as_bytes(), CLOSING_TAG.as_bytes()) else {
        return Err(parser.error(
            ErrorCode::UnclosedScript,
            format!("Expected closing '{CLOSING_TAG}' tag"),
        ));
    };
    let content_end = content_start + found;

    let mut padded = " ".repeat(content_start);
    padded.push_str(&parser.template[content_start..content_end]);
    parser.index = content_end + CLOSING_TAG.len();

    let (program, base) = parse_module(&padded)
        .map_err(|error| parser.error_at(ErrorCode::ParseError, error.message, error.offset))?;

    Ok(Script {
        span: span(start, parser.index),
        context: "default".into(),
        content: ParsedProgram::new(span(content_start, content_end), program, base),
    })
}

#[derive(Debug)]
struct EsError {
    message: String,
    offset: usize,
}

fn parse_module(source: &str) -> Result<(Program, BytePos), EsError> {
    let cm: Lrc<SourceMap> = Default::default();
    let fm = cm.new_source_file(Lrc::new(FileName::Anon), source.to_string());
    let base = fm.start_pos;

    let lexer = Lexer::new(
        Syntax::Es(Default::default()),
        Default::default(),
        StringInput::from(&*fm),
        None,
    );
    let mut es_parser = EsParser::new_from(lexer);

    let module = es_parser
        .parse_module()
        .map_err(|error| convert(error, base))?;
    // swc buffers recoverable errors instead of failing the parse.
    if let Some(error) = es_parser.take_errors().into_iter().next() {
        return Err(convert(error, base));
    }

    Ok((Program::Module(module), base))
}

fn convert(error: swc_ecma_parser::error::Error, base: BytePos) -> EsError {
    let offset = error.span().lo.0.saturating_sub(base.0) as usize;
    let kind = error.into_kind();
    let msg = kind.msg();
    EsError {
        message: strip_location_suffix(&msg).to_string(),
        offset,
    }
}

/// Drops a trailing ` (line:col)` position hint from a foreign-parser message.
fn strip_location_suffix(message: &str) -> &str {
    let Some(index) = message.rfind(" (") else {
        return message;
    };
    let Some(inner) = message[index + 2..].strip_suffix(')') else {
        return message;
    };
    let Some((line, col)) = inner.split_once(':') else {
        return message;
    };
    let numeric = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
    if numeric(line) && numeric(col) {
        &message[..index]
    } else {
        message
    }
}
