//! Splitting a whole journal into entries.
//!
//! A journal is read line by line. A non-indented line starts a block and
//! the indented lines under it belong to that block. Blank lines and
//! column-0 comment lines end the current block. Each block is then handed
//! to the entry point that matches its first character, and errors are
//! moved back to journal coordinates.

use ledgerscan_core::Entry;

use crate::error::{ParseError, ParseErrorKind};
use crate::grammar::COMMENT_CHARS;
use crate::{Span, Spanned};

/// Result of parsing a journal.
#[derive(Debug, Default)]
pub struct JournalResult {
    /// Successfully parsed entries, in source order.
    pub entries: Vec<Spanned<Entry>>,
    /// `include` paths, recorded but not resolved.
    pub includes: Vec<(String, Span)>,
    /// Errors for blocks that failed to parse.
    pub errors: Vec<ParseError>,
}

impl JournalResult {
    /// Check if any block failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// A run of lines forming one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block<'a> {
    text: &'a str,
    start: usize,
    /// 1-based line of the first line
    line: usize,
}

fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

/// Split `source` into blocks, reporting indented lines that belong to no
/// block.
fn split(source: &str) -> (Vec<Block<'_>>, Vec<ParseError>) {
    let mut blocks = Vec::new();
    let mut errors = Vec::new();
    // (start offset, end offset, first line)
    let mut current: Option<(usize, usize, usize)> = None;
    let mut offset = 0;

    for (idx, raw) in source.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let start = offset;
        offset += raw.len();
        let content = raw.trim_end_matches(['\n', '\r']);

        if content.trim().is_empty() {
            blocks.extend(current.take().map(|(s, e, l)| block(source, s, e, l)));
            continue;
        }

        if is_indented(content) {
            if let Some((_, end, _)) = current.as_mut() {
                *end = offset;
            } else if !content.trim_start().starts_with(';') {
                errors.push(
                    ParseError::new(
                        ParseErrorKind::InvalidIndentation,
                        Span::new(start, start + content.len()),
                    )
                    .with_line(line_no),
                );
            }
            continue;
        }

        blocks.extend(current.take().map(|(s, e, l)| block(source, s, e, l)));
        if content.starts_with(|c: char| COMMENT_CHARS.contains(c)) {
            continue;
        }
        current = Some((start, offset, line_no));
    }
    blocks.extend(current.take().map(|(s, e, l)| block(source, s, e, l)));

    (blocks, errors)
}

fn block(source: &str, start: usize, end: usize, line: usize) -> Block<'_> {
    Block {
        text: &source[start..end],
        start,
        line,
    }
}

/// Parse a journal.
///
/// Every block is parsed independently; a failing block adds one error and
/// parsing carries on with the next.
///
/// # Example
///
/// ```
/// use ledgerscan_parser::parse_journal;
///
/// let source = "\
/// account Assets:Cash ; type:asset
///
/// 2024/01/15 * Coffee Shop
///   Expenses:Coffee  $4.50
///   Assets:Cash
/// ";
/// let result = parse_journal(source);
/// assert!(result.errors.is_empty());
/// assert_eq!(result.entries.len(), 2);
/// ```
pub fn parse_journal(source: &str) -> JournalResult {
    parse(source, None)
}

/// Parse a journal read from `path`.
///
/// Same as [`parse_journal`], but transactions carry `source_file` and errors
/// carry `file`.
pub fn parse_journal_file(path: &str, source: &str) -> JournalResult {
    parse(source, Some(path))
}

fn parse(source: &str, file: Option<&str>) -> JournalResult {
    let (blocks, split_errors) = split(source);
    let mut result = JournalResult {
        errors: split_errors,
        ..JournalResult::default()
    };

    for block in blocks {
        let span = Span::new(block.start, block.start + block.text.len());
        match dispatch(block, file) {
            Ok(Parsed::Entry(entry)) => result.entries.push(Spanned::new(entry, span)),
            Ok(Parsed::Include(path)) => result.includes.push((path, span)),
            Err(err) => {
                let line = block.line + line_offset(block.text, err.span.start);
                result.errors.push(err.shifted(block.start).with_line(line));
            }
        }
    }

    if let Some(file) = file {
        for err in &mut result.errors {
            err.file = Some(file.to_string());
        }
    }

    result.errors.sort_by_key(|e| e.span.start);
    tracing::debug!(
        "parsed journal: {} entries, {} includes, {} errors",
        result.entries.len(),
        result.includes.len(),
        result.errors.len()
    );
    result
}

enum Parsed {
    Entry(Entry),
    Include(String),
}

/// Newlines in `text` before byte `pos`.
fn line_offset(text: &str, pos: usize) -> usize {
    text.get(..pos).map_or(0, |before| before.matches('\n').count())
}

fn dispatch(block: Block<'_>, file: Option<&str>) -> Result<Parsed, ParseError> {
    let text = block.text;
    let first_line = text.lines().next().unwrap_or_default();
    tracing::trace!("line {}: {:?}", block.line, first_line);

    if let Some(rest) = keyword(first_line, "include") {
        return Ok(Parsed::Include(rest.to_string()));
    }
    if keyword(first_line, "account").is_some() {
        return crate::parse_account_declaration(text).map(|a| Parsed::Entry(Entry::Account(a)));
    }

    let txn = match first_line.chars().next() {
        Some(c) if c.is_ascii_digit() => crate::parse_regular_transaction(text)?,
        Some('=') => crate::parse_automated_transaction(text)?,
        Some('~') => crate::parse_periodic_transaction(text)?,
        _ => {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedInput(first_line.trim().to_string()),
                Span::new(0, first_line.len()),
            ))
        }
    };
    Ok(Parsed::Entry(Entry::Transaction(
        txn.with_source(file.map(str::to_string), block.line),
    )))
}

/// The trimmed text after `word` when the line starts with `word` and
/// whitespace.
fn keyword<'a>(line: &'a str, word: &str) -> Option<&'a str> {
    line.strip_prefix(word)
        .filter(|rest| rest.starts_with([' ', '\t']))
        .map(str::trim)
}
