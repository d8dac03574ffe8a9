//! Runs grammar parsers over a whole input and classifies failures.
//!
//! [`complete`] is the uniform wrapper used by every single-entity entry
//! point. Transactions go through [`transaction`], which on failure
//! re-parses the input in stages to find out which part went wrong.

use chumsky::prelude::*;
use ledgerscan_core::{Posting, Transaction, TransactionKind};

use crate::error::{ParseError, ParseErrorKind};
use crate::grammar::{self, ParserExtra, ParserInput};
use crate::reduce::{self, TxnField};
use crate::{Span, Spanned};

/// Run `parser` and require it to consume all of `input`.
///
/// On failure `reason` receives the unmatched fragment (the rest of the line
/// at the furthest point the grammar reached, trimmed) and picks the error
/// kind. The error span covers that fragment.
pub fn complete<'a, T>(
    parser: impl Parser<'a, ParserInput<'a>, T, ParserExtra<'a>>,
    input: &'a str,
    reason: impl FnOnce(&'a str) -> ParseErrorKind,
) -> Result<T, ParseError> {
    parser
        .then_ignore(end())
        .parse(input)
        .into_result()
        .map_err(|errs| {
            let start = errs.iter().map(|e| e.span().start).max().unwrap_or(0);
            failure(input, start, reason)
        })
}

/// The rest of the line starting at byte `start`.
fn fragment_at(input: &str, start: usize) -> &str {
    input
        .get(start..)
        .and_then(|rest| rest.lines().next())
        .unwrap_or_default()
}

/// Build the error for a failure at byte `start`.
///
/// A failure at the very end of the input has no fragment of its own, so the
/// last non-blank line is reported instead.
fn failure<'a>(
    input: &'a str,
    start: usize,
    reason: impl FnOnce(&'a str) -> ParseErrorKind,
) -> ParseError {
    let fragment = fragment_at(input, start);
    let (start, fragment) = if fragment.trim().is_empty() {
        input
            .lines()
            .rev()
            .find(|l| !l.trim().is_empty())
            .map_or((start, fragment), |l| (offset_of(input, l), l))
    } else {
        (start, fragment)
    };
    let kind = reason(fragment.trim());
    tracing::debug!(
        "parse failed at byte {}: {} {:?}",
        start,
        kind.as_str(),
        fragment
    );
    ParseError::new(kind, Span::new(start, start + fragment.len()))
}

/// Byte offset of a subslice of `input`.
fn offset_of(input: &str, slice: &str) -> usize {
    (slice.as_ptr() as usize).saturating_sub(input.as_ptr() as usize)
}

/// Reason for an `unexpected_input` failure.
pub fn unexpected(fragment: &str) -> ParseErrorKind {
    ParseErrorKind::UnexpectedInput(fragment.to_string())
}

/// Parse a transaction of the given kind.
pub fn transaction(input: &str, kind: TransactionKind) -> Result<Transaction, ParseError> {
    let fields = grammar::transaction(kind)
        .then_ignore(end())
        .parse(input)
        .into_result()
        .map_err(|_| diagnose(input, kind))?;
    check_spacing(fields.iter().filter_map(|field| match field {
        TxnField::Posting(posting) => Some(posting),
        _ => None,
    }))?;
    Ok(reduce::assemble_transaction(fields))
}

/// Work out why a transaction failed to parse.
///
/// Stages: the header, then as many posting groups as match, then whatever
/// is left.
fn diagnose(input: &str, kind: TransactionKind) -> ParseError {
    let header = grammar::header(kind)
        .then(any().repeated().to_slice())
        .parse(input)
        .into_result();
    let Ok((_, rest)) = header else {
        let reason = match kind {
            TransactionKind::Regular if starts_with_date(input) => ParseErrorKind::MissingPayee,
            TransactionKind::Regular => ParseErrorKind::MissingDate,
            TransactionKind::Automated => ParseErrorKind::MissingPredicate,
            TransactionKind::Periodic => ParseErrorKind::MissingPeriod,
        };
        return failure(input, 0, |_| reason);
    };

    let body = grammar::posting_group()
        .repeated()
        .count()
        .then(any().repeated().to_slice())
        .parse(rest)
        .into_output();
    let Some((groups, leftover)) = body else {
        return failure(input, 0, |_| ParseErrorKind::ParseError);
    };
    tracing::trace!("{} posting groups before {:?}", groups, leftover);

    let Some(line) = leftover.lines().find(|l| !l.trim().is_empty()) else {
        let reason = if groups < kind.min_postings() {
            ParseErrorKind::InsufficientPostings
        } else {
            ParseErrorKind::ParseError
        };
        return failure(input, 0, |_| reason);
    };

    let start = offset_of(input, line);
    let reason = if !line.starts_with([' ', '\t']) {
        ParseErrorKind::InvalidIndentation
    } else if grammar::posting_line()
        .then_ignore(end())
        .parse(line)
        .into_output()
        .is_some_and(|p| p.amount.is_none() && ends_in_amount(&p.account))
    {
        ParseErrorKind::InsufficientSpacing
    } else {
        unexpected(line.trim())
    };
    failure(input, start, |_| reason)
}

fn starts_with_date(input: &str) -> bool {
    grammar::date()
        .then(any().repeated())
        .parse(input)
        .into_result()
        .is_ok()
}

/// Reject postings whose account swallowed an amount.
///
/// `  Expenses:Food $5` parses as the account `Expenses:Food $5` with no
/// amount, because a single space is part of an account name. The error
/// covers the account span recorded by the grammar.
pub fn check_spacing<'p>(
    postings: impl IntoIterator<Item = &'p Spanned<Posting>>,
) -> Result<(), ParseError> {
    match postings
        .into_iter()
        .find(|p| p.value.is_elided() && ends_in_amount(&p.value.account))
    {
        Some(posting) => Err(ParseError::new(
            ParseErrorKind::InsufficientSpacing,
            posting.span,
        )),
        None => Ok(()),
    }
}

/// Whether the last one or two space-separated tokens of an account name
/// read as an amount.
///
/// A bare integer does not count (`Assets:Savings 2024` is a fine name), nor
/// does a lowercase code (`Books Vol 2`).
fn ends_in_amount(account: &str) -> bool {
    let tokens: Vec<&str> = account.split(' ').collect();
    let n = tokens.len();
    (1..=2)
        .filter(|k| n > *k)
        .any(|k| looks_like_amount(&tokens[n - k..].join(" ")))
}

fn looks_like_amount(text: &str) -> bool {
    grammar::amount()
        .then_ignore(end())
        .parse(text)
        .into_output()
        .is_some_and(|a| match a.currency() {
            Some(code) => !code.chars().any(|c| c.is_ascii_lowercase()),
            None => a.scale() > 0,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_requires_full_input() {
        let err = complete(grammar::date(), "2024-01-15 extra", unexpected).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedInput("extra".to_string()));
        assert_eq!(err.span(), (10, 16));
    }

    #[test]
    fn test_complete_success() {
        assert!(complete(grammar::date(), "2024-01-15", unexpected).is_ok());
    }

    #[test]
    fn test_failure_at_end_reports_last_line() {
        let err = complete(grammar::amount(), "$", unexpected).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnexpectedInput("$".to_string()));
        assert_eq!(err.span(), (0, 1));
    }

    #[test]
    fn test_ends_in_amount() {
        assert!(ends_in_amount("Expenses:Food $5"));
        assert!(ends_in_amount("Expenses:Food 5 EUR"));
        assert!(ends_in_amount("Expenses:Food 4.50"));
        assert!(!ends_in_amount("Assets:Savings 2024"));
        assert!(!ends_in_amount("Expenses:Books Vol 2"));
        assert!(!ends_in_amount("Assets:Bank Checking"));
        assert!(!ends_in_amount("$5"));
    }

    #[test]
    fn test_check_spacing() {
        let postings = vec![
            Spanned::new(Posting::auto("Assets:Cash"), Span::new(2, 13)),
            Spanned::new(Posting::auto("Expenses:Food $5"), Span::new(16, 32)),
        ];
        let err = check_spacing(&postings).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InsufficientSpacing);
        assert_eq!(err.span(), (16, 32));
    }

    #[test]
    fn test_spacing_error_points_at_posting_not_payee() {
        let input = "2024/01/15 Expenses:Food $5\n  Expenses:Food $5\n  B\n";
        let err = transaction(input, TransactionKind::Regular).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InsufficientSpacing);
        assert_eq!(err.span(), (30, 46));
    }

    fn reason(input: &str, kind: TransactionKind) -> ParseErrorKind {
        diagnose(input, kind).kind
    }

    #[test]
    fn test_diagnose_header_stage() {
        use TransactionKind::{Automated, Periodic, Regular};

        assert_eq!(reason("Shop\n  A  $1\n  B\n", Regular), ParseErrorKind::MissingDate);
        assert_eq!(
            reason("2024/01/15\n  A  $1\n  B\n", Regular),
            ParseErrorKind::MissingPayee
        );
        assert_eq!(
            reason("2024/01/15 *\n  A  $1\n  B\n", Regular),
            ParseErrorKind::MissingPayee
        );
        assert_eq!(
            reason("2024/01/15 * \n  A  $1\n  B\n", Regular),
            ParseErrorKind::MissingPayee
        );
        assert_eq!(reason("=\n  A  1\n", Automated), ParseErrorKind::MissingPredicate);
        assert_eq!(reason("~  \n  A  1\n", Periodic), ParseErrorKind::MissingPeriod);
    }

    #[test]
    fn test_diagnose_body_stage() {
        assert_eq!(
            reason("2024/01/15 Shop\n  A  $1\n", TransactionKind::Regular),
            ParseErrorKind::InsufficientPostings
        );
        assert_eq!(
            reason("2024/01/15 Shop\nA  $1\n  B\n", TransactionKind::Regular),
            ParseErrorKind::InvalidIndentation
        );
    }

    #[test]
    fn test_diagnose_leftover_fragment() {
        let input = "2024/01/15 Shop\n  A  $1\n  B  $1 @@\n";
        let err = diagnose(input, TransactionKind::Regular);
        assert_eq!(
            err.kind,
            ParseErrorKind::UnexpectedInput("B  $1 @@".to_string())
        );
        assert_eq!(err.span(), (24, 34));
    }
}
