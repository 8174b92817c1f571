//! Row source over a MySQL dump file.
//!
//! `INSERT INTO \`table\` VALUES (...),(...);` statements are read with a
//! small state machine. Quoted content may hold commas, parentheses,
//! semicolons and escaped quotes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::pipeline::Record;
use crate::source::{MemoryRowSource, RowSource, SourceError, charset};

const INSERT_PREFIX: &str = "INSERT INTO";
const MAX_LOGGED_MALFORMED: usize = 5;

/// Where the wanted columns sit in each tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    pub table: String,
    pub id_index: usize,
    pub content_index: usize,
}

impl DumpOptions {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id_index: 0,
            content_index: 1,
        }
    }
}

/// Tuples from one dump, split into usable records and rejects.
#[derive(Debug, Default)]
pub struct ParsedDump {
    pub records: Vec<Record>,
    pub malformed: usize,
}

#[derive(Debug)]
pub struct DumpRowSource {
    path: PathBuf,
    rows: MemoryRowSource,
    malformed: usize,
}

impl DumpRowSource {
    #[instrument(skip_all, fields(table = %options.table))]
    pub async fn open(path: impl AsRef<Path>, options: &DumpOptions) -> Result<Self, SourceError> {
        let path = path.as_ref().to_path_buf();
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| SourceError::io(&path, e))?;
        let text = charset::decode_dump(&bytes)?;

        let parsed = parse_dump(&text, options)?;
        info!(
            path = %path.display(),
            records = parsed.records.len(),
            malformed = parsed.malformed,
            "loaded dump"
        );

        Ok(Self {
            path,
            rows: MemoryRowSource::new(parsed.records),
            malformed: parsed.malformed,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Tuples skipped because the id or content column was unusable.
    pub fn malformed(&self) -> usize {
        self.malformed
    }
}

#[async_trait]
impl RowSource for DumpRowSource {
    async fn next_batch(&self, after_id: i64, limit: usize) -> Result<Vec<Record>, SourceError> {
        Ok(self.rows.page(after_id, limit).to_vec())
    }
}

/// Extract the wanted table's records from dump text.
pub fn parse_dump(text: &str, options: &DumpOptions) -> Result<ParsedDump, SourceError> {
    let mut parsed = ParsedDump::default();
    let mut rest = text;

    while let Some(start) = rest.find(INSERT_PREFIX) {
        let statement = &rest[start + INSERT_PREFIX.len()..];
        let (table, after_table) = read_table_name(statement);
        let Some(values_at) = find_keyword(after_table, "VALUES") else {
            rest = after_table;
            continue;
        };
        let values = &after_table[values_at + "VALUES".len()..];

        let scan = scan_values(values).map_err(|reason| {
            SourceError::Dump(format!("{} in INSERT for table {}", reason, table))
        })?;

        if table.eq_ignore_ascii_case(&options.table) {
            for tuple in scan.tuples {
                match tuple_to_record(tuple, options) {
                    Some(record) => parsed.records.push(record),
                    None => {
                        parsed.malformed += 1;
                        if parsed.malformed <= MAX_LOGGED_MALFORMED {
                            warn!(table = %table, "skipping tuple with unusable id or content");
                        }
                    }
                }
            }
        }

        rest = &values[scan.consumed..];
    }

    Ok(parsed)
}

fn read_table_name(statement: &str) -> (String, &str) {
    let trimmed = statement.trim_start();
    if let Some(quoted) = trimmed.strip_prefix('`') {
        let end = quoted.find('`').unwrap_or(quoted.len());
        let rest = quoted.get(end + 1..).unwrap_or("");
        return (quoted[..end].to_string(), rest);
    }

    let end = trimmed
        .find(|c: char| c.is_whitespace() || c == '(')
        .unwrap_or(trimmed.len());
    (trimmed[..end].to_string(), &trimmed[end..])
}

fn find_keyword(haystack: &str, keyword: &str) -> Option<usize> {
    haystack
        .char_indices()
        .find(|(i, _)| {
            haystack
                .get(*i..*i + keyword.len())
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(keyword))
        })
        .map(|(i, _)| i)
}

/// One field of a tuple. `None` is SQL `NULL`.
type Field = Option<String>;

struct ValuesScan {
    tuples: Vec<Vec<Field>>,
    /// Bytes read, up to and including the terminating `;`.
    consumed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between tuples, waiting for `(` or the statement's `;`.
    BetweenTuples,
    /// Inside a tuple, before a field starts.
    FieldStart,
    Unquoted,
    Quoted,
    /// After a backslash inside a quoted field.
    Escaped,
    /// After a quote closing a quoted field (or the first half of `''`).
    AfterQuote,
}

fn scan_values(values: &str) -> Result<ValuesScan, &'static str> {
    let mut tuples = Vec::new();
    let mut fields: Vec<Field> = Vec::new();
    let mut buf = String::new();
    let mut state = State::BetweenTuples;

    for (i, c) in values.char_indices() {
        state = match (state, c) {
            (State::BetweenTuples, '(') => State::FieldStart,
            (State::BetweenTuples, ';') => {
                return Ok(ValuesScan {
                    tuples,
                    consumed: i + 1,
                });
            }
            (State::BetweenTuples, _) => State::BetweenTuples,

            (State::FieldStart, '\'') => State::Quoted,
            (State::FieldStart, ',') => {
                fields.push(unquoted_field(&mut buf));
                State::FieldStart
            }
            (State::FieldStart, ')') => {
                if !fields.is_empty() {
                    fields.push(unquoted_field(&mut buf));
                }
                tuples.push(std::mem::take(&mut fields));
                State::BetweenTuples
            }
            (State::FieldStart, c) if c.is_whitespace() => State::FieldStart,
            (State::FieldStart, c) => {
                buf.push(c);
                State::Unquoted
            }

            (State::Unquoted, ',') => {
                fields.push(unquoted_field(&mut buf));
                State::FieldStart
            }
            (State::Unquoted, ')') => {
                fields.push(unquoted_field(&mut buf));
                tuples.push(std::mem::take(&mut fields));
                State::BetweenTuples
            }
            (State::Unquoted, c) => {
                buf.push(c);
                State::Unquoted
            }

            (State::Quoted, '\\') => State::Escaped,
            (State::Quoted, '\'') => State::AfterQuote,
            (State::Quoted, c) => {
                buf.push(c);
                State::Quoted
            }

            (State::Escaped, c) => {
                buf.push(unescape(c));
                State::Quoted
            }

            (State::AfterQuote, '\'') => {
                buf.push('\'');
                State::Quoted
            }
            (State::AfterQuote, ',') => {
                fields.push(Some(std::mem::take(&mut buf)));
                State::FieldStart
            }
            (State::AfterQuote, ')') => {
                fields.push(Some(std::mem::take(&mut buf)));
                tuples.push(std::mem::take(&mut fields));
                State::BetweenTuples
            }
            // Stray characters between a closing quote and the separator
            (State::AfterQuote, _) => State::AfterQuote,
        };
    }

    match state {
        State::Quoted | State::Escaped => Err("unterminated quoted field"),
        State::BetweenTuples => Ok(ValuesScan {
            tuples,
            consumed: values.len(),
        }),
        _ => Err("unterminated tuple"),
    }
}

fn unquoted_field(buf: &mut String) -> Field {
    let token = std::mem::take(buf);
    let token = token.trim();
    if token.eq_ignore_ascii_case("NULL") {
        None
    } else {
        Some(token.to_string())
    }
}

/// MySQL string escapes; unknown ones stand for the character itself.
fn unescape(c: char) -> char {
    match c {
        '0' => '\0',
        'b' => '\u{08}',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'Z' => '\u{1A}',
        // \' \" \\ \% \_ and anything else
        other => other,
    }
}

fn tuple_to_record(mut tuple: Vec<Field>, options: &DumpOptions) -> Option<Record> {
    if options.content_index >= tuple.len() || options.id_index >= tuple.len() {
        return None;
    }
    let id = tuple[options.id_index].as_deref()?.trim().parse::<i64>().ok()?;
    let content = tuple.swap_remove(options.content_index);
    Some(Record {
        id,
        raw_content: content,
    })
}
