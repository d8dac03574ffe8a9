//! Parse error types.
//!
//! Every failed entry point produces one [`ParseError`] whose
//! [`ParseErrorKind`] names the reason. The grammar fills in the span only.
//! Callers that know more (the journal splitter, an include resolver) add the
//! line, file and import chain with the `with_*` builders.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Span;

/// Why an entity could not be parsed.
///
/// The accounting reasons (`Unbalanced`, `MultipleNilAmounts`,
/// `MultiCurrencyMissingAmount`) and the include reasons are never produced
/// by this crate. They exist so validation passes and include resolvers
/// layered on top report through the same type.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "text")]
pub enum ParseErrorKind {
    /// Transaction does not start with a valid date.
    #[error("missing or invalid date")]
    MissingDate,
    /// Regular transaction header has no payee.
    #[error("missing payee")]
    MissingPayee,
    /// Automated transaction header has no predicate after `=`.
    #[error("missing predicate after '='")]
    MissingPredicate,
    /// Periodic transaction header has no period after `~`.
    #[error("missing period after '~'")]
    MissingPeriod,
    /// A posting or note line is not indented.
    #[error("posting lines must be indented")]
    InvalidIndentation,
    /// Fewer postings than the transaction kind requires.
    #[error("not enough postings")]
    InsufficientPostings,
    /// Account and amount separated by a single space.
    #[error("account and amount must be separated by two spaces or a tab")]
    InsufficientSpacing,
    /// Input does not match the grammar.
    #[error("parse error")]
    ParseError,
    /// Postings do not sum to zero.
    #[error("transaction does not balance")]
    Unbalanced,
    /// More than one posting has an elided amount.
    #[error("more than one posting without an amount")]
    MultipleNilAmounts,
    /// An elided amount cannot be inferred across currencies.
    #[error("cannot infer a missing amount across several currencies")]
    MultiCurrencyMissingAmount,
    /// `type:` names no known account class.
    #[error("invalid account type")]
    InvalidAccountType,
    /// Text left over after the longest match.
    #[error("unexpected input '{0}'")]
    UnexpectedInput(String),
    /// An include refers back to a file already being read.
    #[error("circular include")]
    CircularInclude,
    /// An included file does not exist.
    #[error("included file not found")]
    IncludeNotFound,
    /// An included file lies outside the journal's base directory.
    #[error("included file is outside the base directory")]
    IncludeOutsideBase,
}

impl ParseErrorKind {
    /// Stable `snake_case` name of the reason.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingDate => "missing_date",
            Self::MissingPayee => "missing_payee",
            Self::MissingPredicate => "missing_predicate",
            Self::MissingPeriod => "missing_period",
            Self::InvalidIndentation => "invalid_indentation",
            Self::InsufficientPostings => "insufficient_postings",
            Self::InsufficientSpacing => "insufficient_spacing",
            Self::ParseError => "parse_error",
            Self::Unbalanced => "unbalanced",
            Self::MultipleNilAmounts => "multiple_nil_amounts",
            Self::MultiCurrencyMissingAmount => "multi_currency_missing_amount",
            Self::InvalidAccountType => "invalid_account_type",
            Self::UnexpectedInput(_) => "unexpected_input",
            Self::CircularInclude => "circular_include",
            Self::IncludeNotFound => "include_not_found",
            Self::IncludeOutsideBase => "include_outside_base",
        }
    }
}

/// One `file:line` step of an include chain, outermost first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFrame {
    /// File containing the include
    pub file: String,
    /// 1-based line of the include
    pub line: usize,
}

impl ImportFrame {
    /// Create a frame.
    #[must_use]
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// A parse error with location information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The span where the error occurred.
    pub span: Span,
    /// 1-based line, set by callers.
    pub line: Option<usize>,
    /// Source file, set by callers.
    pub file: Option<String>,
    /// Include chain that led to `file`, set by callers.
    pub import_chain: Vec<ImportFrame>,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            line: None,
            file: None,
            import_chain: Vec::new(),
        }
    }

    /// Attach a line number.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Attach a source file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attach the include chain.
    #[must_use]
    pub fn with_import_chain(mut self, chain: Vec<ImportFrame>) -> Self {
        self.import_chain = chain;
        self
    }

    /// Move the span by `offset` bytes.
    #[must_use]
    pub fn shifted(mut self, offset: usize) -> Self {
        self.span = self.span.shift(offset);
        self
    }

    /// Get the span of this error.
    #[must_use]
    pub const fn span(&self) -> (usize, usize) {
        (self.span.start, self.span.end)
    }

    /// Get a numeric code for the error kind.
    #[must_use]
    pub const fn kind_code(&self) -> u32 {
        match &self.kind {
            ParseErrorKind::MissingDate => 1,
            ParseErrorKind::MissingPayee => 2,
            ParseErrorKind::MissingPredicate => 3,
            ParseErrorKind::MissingPeriod => 4,
            ParseErrorKind::InvalidIndentation => 5,
            ParseErrorKind::InsufficientPostings => 6,
            ParseErrorKind::InsufficientSpacing => 7,
            ParseErrorKind::ParseError => 8,
            ParseErrorKind::Unbalanced => 9,
            ParseErrorKind::MultipleNilAmounts => 10,
            ParseErrorKind::MultiCurrencyMissingAmount => 11,
            ParseErrorKind::InvalidAccountType => 12,
            ParseErrorKind::UnexpectedInput(_) => 13,
            ParseErrorKind::CircularInclude => 14,
            ParseErrorKind::IncludeNotFound => 15,
            ParseErrorKind::IncludeOutsideBase => 16,
        }
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Get a short label for the error.
    #[must_use]
    pub const fn label(&self) -> &str {
        match &self.kind {
            ParseErrorKind::MissingDate => "expected a date",
            ParseErrorKind::MissingPayee => "expected a payee",
            ParseErrorKind::MissingPredicate => "expected a predicate",
            ParseErrorKind::MissingPeriod => "expected a period expression",
            ParseErrorKind::InvalidIndentation => "indent this line",
            ParseErrorKind::InsufficientPostings => "transaction ends here",
            ParseErrorKind::InsufficientSpacing => "use two spaces before the amount",
            ParseErrorKind::InvalidAccountType => "unknown account type",
            ParseErrorKind::UnexpectedInput(_) => "unexpected input",
            ParseErrorKind::Unbalanced
            | ParseErrorKind::MultipleNilAmounts
            | ParseErrorKind::MultiCurrencyMissingAmount => "in this transaction",
            ParseErrorKind::CircularInclude
            | ParseErrorKind::IncludeNotFound
            | ParseErrorKind::IncludeOutsideBase => "in this include",
            ParseErrorKind::ParseError => "parse error",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file, self.line) {
            (Some(file), Some(line)) => write!(f, "{file}:{line}: ")?,
            (Some(file), None) => write!(f, "{file}: ")?,
            (None, Some(line)) => write!(f, "line {line}: ")?,
            (None, None) => {}
        }
        write!(f, "{}", self.kind)?;
        for frame in self.import_chain.iter().rev() {
            write!(f, "\n  included from {}:{}", frame.file, frame.line)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_new() {
        let err = ParseError::new(ParseErrorKind::MissingPayee, Span::new(0, 10));
        assert_eq!(err.span(), (0, 10));
        assert!(err.line.is_none());
        assert!(err.file.is_none());
        assert!(err.import_chain.is_empty());
    }

    #[test]
    fn test_builders() {
        let err = ParseError::new(ParseErrorKind::InsufficientPostings, Span::new(0, 4))
            .with_line(12)
            .with_file("main.ledger")
            .with_import_chain(vec![ImportFrame::new("root.ledger", 3)]);
        assert_eq!(err.line, Some(12));
        assert_eq!(err.file.as_deref(), Some("main.ledger"));
        assert_eq!(
            err.to_string(),
            "main.ledger:12: not enough postings\n  included from root.ledger:3"
        );
    }

    #[test]
    fn test_display_without_context() {
        let err = ParseError::new(
            ParseErrorKind::UnexpectedInput("@@".to_string()),
            Span::new(0, 2),
        );
        assert_eq!(err.to_string(), "unexpected input '@@'");
    }

    #[test]
    fn test_shifted() {
        let err = ParseError::new(ParseErrorKind::MissingDate, Span::new(1, 3)).shifted(100);
        assert_eq!(err.span(), (101, 103));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ParseErrorKind::MissingDate.as_str(), "missing_date");
        assert_eq!(
            ParseErrorKind::MultiCurrencyMissingAmount.as_str(),
            "multi_currency_missing_amount"
        );
        assert_eq!(
            ParseErrorKind::UnexpectedInput(String::new()).as_str(),
            "unexpected_input"
        );
    }

    #[test]
    fn test_kind_codes_are_distinct() {
        let kinds = [
            ParseErrorKind::MissingDate,
            ParseErrorKind::MissingPayee,
            ParseErrorKind::MissingPredicate,
            ParseErrorKind::MissingPeriod,
            ParseErrorKind::InvalidIndentation,
            ParseErrorKind::InsufficientPostings,
            ParseErrorKind::InsufficientSpacing,
            ParseErrorKind::ParseError,
            ParseErrorKind::Unbalanced,
            ParseErrorKind::MultipleNilAmounts,
            ParseErrorKind::MultiCurrencyMissingAmount,
            ParseErrorKind::InvalidAccountType,
            ParseErrorKind::UnexpectedInput(String::new()),
            ParseErrorKind::CircularInclude,
            ParseErrorKind::IncludeNotFound,
            ParseErrorKind::IncludeOutsideBase,
        ];
        let mut codes: Vec<u32> = kinds
            .into_iter()
            .map(|k| ParseError::new(k, Span::default()).kind_code())
            .collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 16);
    }
}
