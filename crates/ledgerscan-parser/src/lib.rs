//! Ledger journal parser using chumsky parser combinators.
//!
//! This crate recognizes the plaintext journal dialect of ledger-style
//! bookkeeping tools and turns it into the typed entities of
//! [`ledgerscan_core`].
//!
//! There is one entry point per entity. Each entry point must consume its
//! whole input and returns either the entity or a [`ParseError`] whose
//! [`ParseErrorKind`] says why it failed. [`parse_journal`] splits a complete
//! journal into blocks and runs the matching entry point on each.
//!
//! # Example
//!
//! ```
//! use ledgerscan_parser::parse_regular_transaction;
//! use ledgerscan_core::{CurrencyPosition, TransactionState};
//! use rust_decimal_macros::dec;
//!
//! let source = "2024/01/15 * (100) Coffee Shop ; morning
//!   Expenses:Coffee  $4.50
//!   Assets:Cash
//! ";
//!
//! let txn = parse_regular_transaction(source).unwrap();
//! assert_eq!(txn.state, TransactionState::Cleared);
//! assert_eq!(txn.code, "100");
//! assert_eq!(txn.payee.as_deref(), Some("Coffee Shop"));
//!
//! let amount = txn.postings[0].amount.as_ref().unwrap();
//! assert_eq!(amount.value, dec!(4.50));
//! assert_eq!(amount.currency_position(), Some(CurrencyPosition::Leading));
//! assert!(txn.postings[1].amount.is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod grammar;
pub mod harness;
pub mod journal;
pub mod reduce;
mod span;

pub use error::{ImportFrame, ParseError, ParseErrorKind};
pub use journal::{parse_journal, parse_journal_file, JournalResult};
pub use span::{Span, Spanned};

use chrono::NaiveDate;
use chumsky::Parser;
use ledgerscan_core::{AccountDeclaration, Amount, Note, Posting, Transaction, TransactionKind};

/// Parse an `account NAME ; type:TYPE` declaration.
///
/// An unknown type word fails with [`ParseErrorKind::InvalidAccountType`];
/// any other mismatch with [`ParseErrorKind::ParseError`].
pub fn parse_account_declaration(input: &str) -> Result<AccountDeclaration, ParseError> {
    let raw = harness::complete(grammar::account_declaration(), input, |_| {
        ParseErrorKind::ParseError
    })?;
    reduce::account_declaration(raw)
}

/// Parse a date: `2024-01-15`, `2024/01/15` or `2024.01.15`.
pub fn parse_date(input: &str) -> Result<NaiveDate, ParseError> {
    harness::complete(grammar::date(), input, |_| ParseErrorKind::MissingDate)
}

/// Parse an amount such as `$4.50`, `-$5`, `100 EUR` or `1,234.56`.
///
/// Surrounding spaces and tabs are allowed.
pub fn parse_amount(input: &str) -> Result<Amount, ParseError> {
    let parser = grammar::ws()
        .ignore_then(grammar::amount())
        .then_ignore(grammar::ws());
    harness::complete(parser, input, harness::unexpected)
}

/// Parse a single note line: `; :tag:`, `; Key: value` or `; text`.
pub fn parse_note(input: &str) -> Result<Note, ParseError> {
    harness::complete(grammar::note_line(), input, harness::unexpected)
}

/// Parse a single indented posting line, without notes.
pub fn parse_posting(input: &str) -> Result<Posting, ParseError> {
    let indented = input.starts_with([' ', '\t']);
    let line = harness::complete(grammar::posting_line(), input, |fragment| {
        if indented {
            harness::unexpected(fragment)
        } else {
            ParseErrorKind::InvalidIndentation
        }
    })?;
    let span = line.account_span;
    let posting = Spanned::new(reduce::assemble_posting(Vec::new(), line), span);
    harness::check_spacing([&posting])?;
    Ok(posting.into_inner())
}

/// Parse a dated transaction with at least two postings.
pub fn parse_regular_transaction(input: &str) -> Result<Transaction, ParseError> {
    harness::transaction(input, TransactionKind::Regular)
}

/// Parse an `= predicate` transaction with at least one posting.
pub fn parse_automated_transaction(input: &str) -> Result<Transaction, ParseError> {
    harness::transaction(input, TransactionKind::Automated)
}

/// Parse a `~ period` transaction with at least one posting.
pub fn parse_periodic_transaction(input: &str) -> Result<Transaction, ParseError> {
    harness::transaction(input, TransactionKind::Periodic)
}

/// Parse a transaction of any kind, chosen by its first non-blank character.
pub fn parse_transaction(input: &str) -> Result<Transaction, ParseError> {
    let kind = match input.trim_start().chars().next() {
        Some('=') => TransactionKind::Automated,
        Some('~') => TransactionKind::Periodic,
        _ => TransactionKind::Regular,
    };
    harness::transaction(input, kind)
}
