//! Static name tables consumed by the template grammar.

/// HTML void elements: no children, no closing tag, optional trailing `/`.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Returns true if `name` is an HTML void element.
pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS
        .iter()
        .any(|void| name.eq_ignore_ascii_case(void))
}

/// Elements whose body is captured verbatim up to the literal closing tag
/// instead of being parsed recursively.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea"];

/// Returns true if `name` is a raw-text element.
pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

/// HTML optional-end-tag pairings: an open `current` element is implicitly
/// closed when a sibling `next` tag begins.
const OMITTED_CLOSERS: &[(&str, &[&str])] = &[
    ("li", &["li"]),
    ("dt", &["dt", "dd"]),
    ("dd", &["dt", "dd"]),
    (
        "p",
        &[
            "address",
            "article",
            "aside",
            "blockquote",
            "div",
            "dl",
            "fieldset",
            "footer",
            "form",
            "h1",
            "h2",
            "h3",
            "h4",
            "h5",
            "h6",
            "header",
            "hgroup",
            "hr",
            "main",
            "menu",
            "nav",
            "ol",
            "p",
            "pre",
            "section",
            "table",
            "ul",
        ],
    ),
    ("rt", &["rt", "rp"]),
    ("rp", &["rt", "rp"]),
    ("optgroup", &["optgroup"]),
    ("option", &["option", "optgroup"]),
    ("thead", &["tbody", "tfoot"]),
    ("tbody", &["tbody", "tfoot"]),
    ("tfoot", &["tbody"]),
    ("tr", &["tr", "tbody"]),
    ("td", &["td", "th", "tr"]),
    ("th", &["td", "th", "tr"]),
];

/// Returns true if an open `current` element's closing tag may be omitted:
/// either a disallowed sibling `next` tag starts directly inside it, or the
/// input ends (`next` is `None`) while it is still open.
pub fn closing_tag_omitted(current: &str, next: Option<&str>) -> bool {
    OMITTED_CLOSERS
        .iter()
        .find(|(name, _)| *name == current)
        .is_some_and(|(_, disallowed)| match next {
            Some(next) => disallowed.contains(&next),
            None => true,
        })
}

/// ECMAScript reserved words. Identifiers read from the template may not
/// shadow these.
const RESERVED_WORDS: &[&str] = &[
    "arguments",
    "await",
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "eval",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "implements",
    "import",
    "in",
    "instanceof",
    "interface",
    "let",
    "new",
    "null",
    "package",
    "private",
    "protected",
    "public",
    "return",
    "static",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
    "yield",
];

/// Returns true if `word` is reserved in ECMAScript.
pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_WORDS.binary_search(&word).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_words_are_sorted() {
        assert!(RESERVED_WORDS.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn void_elements() {
        assert!(is_void_element("img"));
        assert!(is_void_element("BR"));
        assert!(!is_void_element("div"));
        assert!(!is_void_element("textarea"));
    }

    #[test]
    fn raw_text_elements() {
        assert!(is_raw_text_element("script"));
        assert!(is_raw_text_element("textarea"));
        assert!(!is_raw_text_element("pre"));
    }

    #[test]
    fn omitted_closing_tags() {
        assert!(closing_tag_omitted("p", Some("p")));
        assert!(closing_tag_omitted("li", Some("li")));
        assert!(closing_tag_omitted("td", Some("tr")));
        assert!(!closing_tag_omitted("p", Some("span")));
        assert!(!closing_tag_omitted("div", Some("div")));
    }

    #[test]
    fn omitted_closing_tags_at_end_of_input() {
        assert!(closing_tag_omitted("p", None));
        assert!(closing_tag_omitted("li", None));
        assert!(!closing_tag_omitted("div", None));
    }

    #[test]
    fn reserved_words() {
        assert!(is_reserved_word("typeof"));
        assert!(is_reserved_word("await"));
        assert!(!is_reserved_word("count"));
    }
}
