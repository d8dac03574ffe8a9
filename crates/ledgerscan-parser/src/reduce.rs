//! Semantic reducers: fold grammar matches into typed records.
//!
//! Nothing here looks at input text. The grammar hands over already
//! delimited pieces and the functions below decide what they mean.

use std::str::FromStr;

use chrono::NaiveDate;
use ledgerscan_core::{
    AccountDeclaration, AccountType, Amount, Currency, Note, Posting, Transaction,
    TransactionState,
};
use rust_decimal::Decimal;

use crate::error::{ParseError, ParseErrorKind};
use crate::{Span, Spanned};

/// The pieces of a matched amount before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAmount<'a> {
    /// A `-` appeared before the currency or the number
    pub negative: bool,
    /// Integer digits, possibly with `,` group separators
    pub integer: &'a str,
    /// Digits after the `.`, if any
    pub fraction: Option<&'a str>,
    /// Currency and the side it was written on
    pub currency: Option<Currency>,
}

/// Normalize a matched amount into an exact signed decimal.
///
/// Returns `None` when the digits do not fit in a [`Decimal`].
pub fn amount(raw: RawAmount<'_>) -> Option<Amount> {
    let mut digits: String = raw.integer.chars().filter(|c| *c != ',').collect();
    if let Some(fraction) = raw.fraction {
        digits.push('.');
        digits.push_str(fraction);
    }
    let magnitude = Decimal::from_str_exact(&digits).ok()?;
    let value = if raw.negative { -magnitude } else { magnitude };
    Some(Amount {
        value,
        currency: raw.currency,
    })
}

/// Decide whether the value of a `Key: value` note is metadata.
///
/// Prose such as `; Note: remember the receipt` has the shape of metadata.
/// A value whose first character is an ASCII lowercase letter is treated as
/// prose. Empty values and values starting with anything else (digits,
/// capitals, symbols, non-ASCII letters) are metadata.
pub fn looks_like_metadata(value: &str) -> bool {
    !matches!(value.trim().chars().next(), Some(c) if c.is_ascii_lowercase())
}

/// Turn a `Key: value` match into metadata or, failing the policy above,
/// a comment carrying the whole note text.
pub fn classify_note(key: &str, value: &str) -> Note {
    if looks_like_metadata(value) {
        Note::Metadata {
            key: key.to_string(),
            value: value.trim().to_string(),
        }
    } else {
        Note::Comment(format!("{key}:{value}").trim().to_string())
    }
}

/// A posting line before its notes are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingLine {
    /// Account name as matched, single internal spaces kept
    pub account: String,
    /// Where the account name sits in the parsed input
    pub account_span: Span,
    /// Explicit amount
    pub amount: Option<Amount>,
    /// Inline `;` comment
    pub comment: Option<String>,
}

/// Build a posting from its line and the notes written above it.
///
/// Metadata keys are overwritten in order, tags and comments appended in
/// order.
pub fn assemble_posting(notes: Vec<Note>, line: PostingLine) -> Posting {
    let mut posting = Posting {
        account: line.account.trim().to_string(),
        amount: line.amount,
        comment: line.comment,
        ..Posting::default()
    };
    for note in notes {
        posting.attach(note);
    }
    posting
}

/// One matched piece of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxnField {
    /// Primary date
    Date(NaiveDate),
    /// `=date`
    AuxDate(NaiveDate),
    /// `*` or `!`
    State(TransactionState),
    /// `(code)`
    Code(String),
    /// Payee text
    Payee(String),
    /// Header comment
    Comment(String),
    /// `= predicate`
    Predicate(String),
    /// `~ period`
    Period(String),
    /// A complete posting, spanned by its account name
    Posting(Spanned<Posting>),
}

/// Fold matched fields into a transaction, then derive its kind.
pub fn assemble_transaction(fields: impl IntoIterator<Item = TxnField>) -> Transaction {
    let mut txn = fields
        .into_iter()
        .fold(Transaction::default(), |mut txn, field| {
            match field {
                TxnField::Date(date) => txn.date = Some(date),
                TxnField::AuxDate(date) => txn.aux_date = Some(date),
                TxnField::State(state) => txn.state = state,
                TxnField::Code(code) => txn.code = code,
                TxnField::Payee(payee) => txn.payee = Some(payee),
                TxnField::Comment(comment) => txn.comment = Some(comment),
                TxnField::Predicate(predicate) => txn.predicate = Some(predicate),
                TxnField::Period(period) => txn.period = Some(period),
                TxnField::Posting(posting) => txn.postings.push(posting.into_inner()),
            }
            txn
        });
    txn.infer_kind();
    txn
}

/// An account declaration before its type token is checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAccount<'a> {
    /// Trimmed account name
    pub name: String,
    /// The word after `type:`
    pub type_word: &'a str,
    /// Where the type word sits in the input
    pub type_span: Span,
}

/// Resolve the type word of a matched declaration.
pub fn account_declaration(raw: RawAccount<'_>) -> Result<AccountDeclaration, ParseError> {
    AccountType::from_str(raw.type_word)
        .map(|account_type| AccountDeclaration::new(raw.name, account_type))
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidAccountType, raw.type_span))
}
