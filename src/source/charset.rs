use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::source::SourceError;

/// mysqldump writes `/*!40101 SET NAMES utf8mb4 */;` near the top.
static SET_NAMES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)SET\s+NAMES\s+['"`]?([A-Za-z0-9_-]+)"#).unwrap());

const SNIFF_LEN: usize = 4096;

/// Decode a dump file to UTF-8.
///
/// Order: byte-order mark, declared `SET NAMES`, then chardetng's guess.
pub fn decode_dump(bytes: &[u8]) -> Result<String, SourceError> {
    let encoding = detect_encoding(bytes);
    debug!(encoding = encoding.name(), "decoding dump");

    let (decoded, _encoding, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(SourceError::Charset(format!(
            "failed to decode dump with encoding: {}",
            encoding.name()
        )));
    }

    Ok(decoded.into_owned())
}

fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    // 1. BOM
    if let Some((encoding, _bom_len)) = Encoding::for_bom(bytes) {
        return encoding;
    }

    // 2. Declared connection charset
    let search_bytes = &bytes[..bytes.len().min(SNIFF_LEN)];
    let search_str = String::from_utf8_lossy(search_bytes);
    if let Some(captures) = SET_NAMES_REGEX.captures(&search_str)
        && let Some(name) = captures.get(1)
        && let Some(encoding) = mysql_charset_to_encoding(name.as_str())
    {
        return encoding;
    }

    // 3. Heuristic detection
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(search_bytes, bytes.len() <= SNIFF_LEN);
    detector.guess(None, true)
}

/// MySQL charset names are not WHATWG labels; map the ones that differ.
fn mysql_charset_to_encoding(name: &str) -> Option<&'static Encoding> {
    let name = name.to_lowercase();
    match name.as_str() {
        "utf8" | "utf8mb3" | "utf8mb4" => Some(encoding_rs::UTF_8),
        "gb18030" => Some(encoding_rs::GB18030),
        "gbk" | "gb2312" => Some(encoding_rs::GBK),
        "big5" => Some(encoding_rs::BIG5),
        "latin1" => Some(encoding_rs::WINDOWS_1252),
        "sjis" | "cp932" => Some(encoding_rs::SHIFT_JIS),
        other => Encoding::for_label(other.as_bytes()),
    }
}
