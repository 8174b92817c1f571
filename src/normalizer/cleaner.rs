use regex::Regex;
use std::sync::LazyLock;

/// Attribute text inside a tag; quoted values may contain `>`.
const ATTRS: &str = r#"(?:[^>"']|"[^"]*"|'[^']*')*"#;

/// Elements dropped together with their contents, matching the parser.
/// One regex each: the regex crate has no backreferences.
static BLOCK_REGEXES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "noscript", "template"]
        .iter()
        .map(|name| {
            Regex::new(&format!(r"(?is)<{name}\b{ATTRS}>.*?</{name}\s*>")).unwrap()
        })
        .collect()
});

static COMMENT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"<[A-Za-z/!?]{ATTRS}>")).unwrap());

/// Regex tag stripper. Lossier than the parser on unbalanced markup, but it
/// never fails: a stray `<` without a closing `>` is simply kept as text.
pub fn strip_tags(html: &str) -> String {
    // Hidden blocks go first so their bodies never leak into the text
    let mut text = html.to_string();
    for block in BLOCK_REGEXES.iter() {
        text = block.replace_all(&text, "").into_owned();
    }
    let text = COMMENT_REGEX.replace_all(&text, "");
    let text = TAG_REGEX.replace_all(&text, " ");

    html_escape::decode_html_entities(&text).into_owned()
}
