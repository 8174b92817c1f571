use crate::normalizer::{
    MarkupStrategy, TextNormalizer, WhitespaceMode, normalize, normalize_batch,
};

const WELL_FORMED: [&str; 8] = [
    "<p>Hello&nbsp;World</p>",
    "<div><p>你好，世界！</p><p>这是一个完整的句子。</p></div>",
    r#"<html><head><title>标题</title><style>p { color: red; }</style></head><body><p>正文&ldquo;引用&rdquo;</p><script>var x = 1;</script></body></html>"#,
    "<ul><li>one</li><li>two</li></ul>\n\t<p>three &amp; four</p>",
    "<p>第一段\u{3000}全角空格</p>\r\n<p>第二段</p>",
    "<noscript>请启用脚本</noscript><p>正文内容。</p>",
    "<template><p>模板内容</p></template><p>正文。</p>",
    r#"<p><a title="a>b" href="/x">链接</a>正文。</p>"#,
];

#[test]
fn test_spaced_nbsp_example() {
    assert_eq!(
        normalize("<p>Hello&nbsp;World</p>", WhitespaceMode::Spaced),
        "Hello World"
    );
}

#[test]
fn test_compact_strips_markup_and_whitespace() {
    assert_eq!(
        normalize(
            "<div>你好，世界！\n  这是一个完整的句子。</div>",
            WhitespaceMode::Compact
        ),
        "你好，世界！这是一个完整的句子。"
    );
}

#[test]
fn test_empty_and_null_input() {
    let normalizer = TextNormalizer::new(WhitespaceMode::Compact);
    assert_eq!(normalizer.normalize(""), "");
    assert_eq!(normalizer.normalize(" \n\t"), "");
    assert_eq!(normalizer.normalize_opt(None), "");
    assert_eq!(normalizer.normalize_opt(Some("<p>文本</p>")), "文本");
}

#[test]
fn test_markup_only_input_is_empty() {
    assert_eq!(normalize("<div><br/><img src=\"a.png\"></div>", WhitespaceMode::Spaced), "");
}

#[test]
fn test_parser_and_regex_agree_on_well_formed_html() {
    for mode in [WhitespaceMode::Spaced, WhitespaceMode::Compact] {
        let parser = TextNormalizer::new(mode);
        let regex = TextNormalizer::new(mode).with_strategy(MarkupStrategy::Regex);
        for html in WELL_FORMED {
            assert_eq!(parser.normalize(html), regex.normalize(html), "input: {html}");
        }
    }
}

#[test]
fn test_normalize_is_idempotent_on_samples() {
    for mode in [WhitespaceMode::Spaced, WhitespaceMode::Compact] {
        for html in WELL_FORMED {
            let once = normalize(html, mode);
            assert_eq!(normalize(&once, mode), once, "input: {html}");
        }
    }
}

#[test]
fn test_parser_and_regex_drop_hidden_blocks() {
    for strategy in [MarkupStrategy::Parser, MarkupStrategy::Regex] {
        let normalizer = TextNormalizer::new(WhitespaceMode::Spaced).with_strategy(strategy);
        assert_eq!(normalizer.normalize(WELL_FORMED[5]), "正文内容。");
        assert_eq!(normalizer.normalize(WELL_FORMED[6]), "正文。");
        assert_eq!(normalizer.normalize(WELL_FORMED[7]), "链接 正文。");
    }
}

#[test]
fn test_entity_encoded_markup_is_idempotent() {
    for strategy in [MarkupStrategy::Parser, MarkupStrategy::Regex] {
        for mode in [WhitespaceMode::Spaced, WhitespaceMode::Compact] {
            let normalizer = TextNormalizer::new(mode).with_strategy(strategy);
            for raw in [
                "&lt;b&gt;粗体&lt;/b&gt;正文",
                "&amp;lt;p&amp;gt;两层编码&amp;lt;/p&amp;gt;",
                "<p>&lt;script&gt;alert(1)&lt;/script&gt;正文</p>",
            ] {
                let once = normalizer.normalize(raw);
                assert_eq!(normalizer.normalize(&once), once, "input: {raw}");
            }
        }
    }
    assert_eq!(
        normalize("&lt;b&gt;粗体&lt;/b&gt;正文", WhitespaceMode::Spaced),
        "粗体 正文"
    );
}

#[test]
fn test_spaced_output_has_no_double_spaces() {
    let text = "a\u{00A0}\u{00A0}b\u{3000}\u{3000}c\r\n\r\nd\t\te  f";
    let out = normalize(text, WhitespaceMode::Spaced);
    assert_eq!(out, "a b c d e f");
    assert!(!out.contains("  "));
    assert!(!out.starts_with(' ') && !out.ends_with(' '));
}

#[test]
fn test_malformed_markup_never_fails() {
    for html in ["<p>Unclosed<div>tags", "<<<>>>", "</p></div>text", "<script>no end", "<"] {
        for strategy in [MarkupStrategy::Parser, MarkupStrategy::Regex] {
            let normalizer = TextNormalizer::new(WhitespaceMode::Spaced).with_strategy(strategy);
            let _ = normalizer.normalize(html);
        }
    }
}

#[test]
fn test_normalize_batch_preserves_order() {
    let docs = ["<b>一</b>", "", "<i>三</i>"];
    assert_eq!(
        normalize_batch(docs, WhitespaceMode::Compact),
        vec!["一".to_string(), String::new(), "三".to_string()]
    );
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_normalize_idempotent(
            text in "[a-z中文，。<>&;/ \t\r\n\u{00A0}\u{3000}]{0,64}",
            compact in any::<bool>(),
        ) {
            let mode = if compact { WhitespaceMode::Compact } else { WhitespaceMode::Spaced };
            let once = normalize(&text, mode);
            prop_assert_eq!(normalize(&once, mode), once);
        }

        #[test]
        fn test_spaced_collapse(
            words in proptest::collection::vec("[a-z中文]{1,8}", 0..8),
            gaps in proptest::collection::vec("[ \t\r\n\u{00A0}\u{3000}]{1,4}", 8),
        ) {
            let mut text = String::new();
            for (word, gap) in words.iter().zip(gaps.iter()) {
                text.push_str(gap);
                text.push_str(word);
            }
            let out = normalize(&text, WhitespaceMode::Spaced);
            prop_assert!(!out.contains("  "));
            prop_assert!(!out.starts_with(' '));
            prop_assert!(!out.ends_with(' '));
            prop_assert_eq!(out, words.join(" "));
        }

        #[test]
        fn test_normalize_never_panics(html in ".*") {
            let _ = normalize(&html, WhitespaceMode::Compact);
            let _ = TextNormalizer::new(WhitespaceMode::Spaced)
                .with_strategy(MarkupStrategy::Regex)
                .normalize(&html);
        }
    }
}
