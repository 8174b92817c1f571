/// CJK Unified Ideographs, U+4E00..=U+9FFF.
pub fn is_cjk_ideograph(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

/// Ideographs plus CJK symbols/punctuation (U+3000..=U+303F) and the
/// full-width ASCII forms (U+FF01..=U+FF5E).
pub fn is_chinese_text_char(c: char) -> bool {
    is_cjk_ideograph(c) || ('\u{3000}'..='\u{303F}').contains(&c) || ('\u{FF01}'..='\u{FF5E}').contains(&c)
}

/// Share of characters that belong to Chinese text, in `[0, 1]`.
///
/// Empty text scores `0.0`.
pub fn chinese_ratio(text: &str) -> f64 {
    let mut total = 0usize;
    let mut chinese = 0usize;
    for c in text.chars() {
        total += 1;
        if is_chinese_text_char(c) {
            chinese += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    chinese as f64 / total as f64
}
