//! Entity types produced from a ledger journal.
//!
//! A journal is made of two kinds of top-level entries:
//!
//! - [`AccountDeclaration`] - `account Assets:Cash ; type:asset`
//! - [`Transaction`] - a regular, automated (`=`) or periodic (`~`) block
//!   of [`Posting`]s
//!
//! [`Note`] is the intermediate form of a `;` line inside a transaction body.
//! Notes are folded into the posting that follows them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Amount;

/// Posting metadata: `Key: value` notes, unique keys, last write wins.
pub type Metadata = HashMap<String, String>;

/// A posting within a transaction.
///
/// When `amount` is `None` the amount is elided and left for a balancing
/// pass to infer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Posting {
    /// The account name, trimmed, internal single spaces preserved
    pub account: String,
    /// The amount, if written
    pub amount: Option<Amount>,
    /// Metadata from preceding `Key: value` notes
    pub metadata: Metadata,
    /// Tags from preceding `:tag:` notes, in source order
    pub tags: Vec<String>,
    /// Comments from preceding note lines, in source order
    pub comments: Vec<String>,
    /// Inline comment written on the posting line itself
    pub comment: Option<String>,
}

impl Posting {
    /// Create a posting with an explicit amount.
    #[must_use]
    pub fn new(account: impl Into<String>, amount: Amount) -> Self {
        Self {
            account: account.into(),
            amount: Some(amount),
            ..Self::default()
        }
    }

    /// Create a posting whose amount is elided.
    #[must_use]
    pub fn auto(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            ..Self::default()
        }
    }

    /// Set the inline comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Check if the amount is elided.
    #[must_use]
    pub const fn is_elided(&self) -> bool {
        self.amount.is_none()
    }

    /// Fold one note into this posting.
    pub fn attach(&mut self, note: Note) {
        match note {
            Note::Tags(tags) => self.tags.extend(tags),
            Note::Metadata { key, value } => {
                self.metadata.insert(key, value);
            }
            Note::Comment(text) => self.comments.push(text),
        }
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  {}", self.account)?;
        if let Some(amount) = &self.amount {
            write!(f, "  {amount}")?;
        }
        if let Some(comment) = &self.comment {
            write!(f, "  ; {comment}")?;
        }
        Ok(())
    }
}

/// A `;` line inside a transaction body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Note {
    /// `:food:travel:`
    Tags(Vec<String>),
    /// `Receipt: 1234`
    Metadata {
        /// The capitalized key
        key: String,
        /// The trimmed value (may be empty)
        value: String,
    },
    /// Anything else
    Comment(String),
}

/// Clearing state of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionState {
    /// `*`
    Cleared,
    /// `!`
    Pending,
    /// No flag
    #[default]
    Uncleared,
}

impl TransactionState {
    /// Map a state flag character to a state.
    #[must_use]
    pub const fn from_flag(flag: char) -> Option<Self> {
        match flag {
            '*' => Some(Self::Cleared),
            '!' => Some(Self::Pending),
            _ => None,
        }
    }

    /// The flag character, `None` for uncleared.
    #[must_use]
    pub const fn flag(self) -> Option<char> {
        match self {
            Self::Cleared => Some('*'),
            Self::Pending => Some('!'),
            Self::Uncleared => None,
        }
    }
}

/// Which header shape a transaction was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Dated transaction
    #[default]
    Regular,
    /// `= predicate`
    Automated,
    /// `~ period`
    Periodic,
}

impl TransactionKind {
    /// Minimum number of postings the body must contain.
    #[must_use]
    pub const fn min_postings(self) -> usize {
        match self {
            Self::Regular => 2,
            Self::Automated | Self::Periodic => 1,
        }
    }
}

/// A transaction of any kind.
///
/// Only the fields belonging to the transaction's [`TransactionKind`] are
/// set: `date`, `aux_date` and `payee` for regular transactions, `predicate`
/// for automated ones, `period` for periodic ones.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Derived from which header fields are present
    pub kind: TransactionKind,
    /// Primary date
    pub date: Option<NaiveDate>,
    /// Auxiliary (effective) date after `=`
    pub aux_date: Option<NaiveDate>,
    /// Clearing state
    pub state: TransactionState,
    /// Code written in parentheses, empty when absent
    pub code: String,
    /// Payee text
    pub payee: Option<String>,
    /// Inline header comment
    pub comment: Option<String>,
    /// Automated transaction predicate, verbatim
    pub predicate: Option<String>,
    /// Periodic transaction period expression, verbatim
    pub period: Option<String>,
    /// Postings in source order
    pub postings: Vec<Posting>,
    /// File the transaction was read from, set by callers
    pub source_file: Option<String>,
    /// 1-based line of the header, set by callers
    pub source_line: Option<usize>,
}

impl Transaction {
    /// Create a regular transaction.
    #[must_use]
    pub fn new(date: NaiveDate, payee: impl Into<String>) -> Self {
        Self {
            date: Some(date),
            payee: Some(payee.into()),
            ..Self::default()
        }
    }

    /// Set the state.
    #[must_use]
    pub const fn with_state(mut self, state: TransactionState) -> Self {
        self.state = state;
        self
    }

    /// Add a posting.
    #[must_use]
    pub fn with_posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }

    /// Set the source location.
    #[must_use]
    pub fn with_source(mut self, file: Option<String>, line: usize) -> Self {
        self.source_file = file;
        self.source_line = Some(line);
        self
    }

    /// Recompute [`Transaction::kind`] from the header fields.
    ///
    /// A predicate wins over a period; with neither the transaction is regular.
    pub fn infer_kind(&mut self) {
        self.kind = if self.predicate.is_some() {
            TransactionKind::Automated
        } else if self.period.is_some() {
            TransactionKind::Periodic
        } else {
            TransactionKind::Regular
        };
    }

    /// Count postings with an elided amount.
    #[must_use]
    pub fn elided_postings(&self) -> usize {
        self.postings.iter().filter(|p| p.is_elided()).count()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TransactionKind::Automated => {
                write!(f, "= {}", self.predicate.as_deref().unwrap_or_default())?;
            }
            TransactionKind::Periodic => {
                write!(f, "~ {}", self.period.as_deref().unwrap_or_default())?;
            }
            TransactionKind::Regular => {
                if let Some(date) = self.date {
                    write!(f, "{}", date.format("%Y/%m/%d"))?;
                }
                if let Some(aux) = self.aux_date {
                    write!(f, "={}", aux.format("%Y/%m/%d"))?;
                }
                if let Some(flag) = self.state.flag() {
                    write!(f, " {flag}")?;
                }
                if !self.code.is_empty() {
                    write!(f, " ({})", self.code)?;
                }
                if let Some(payee) = &self.payee {
                    write!(f, " {payee}")?;
                }
            }
        }
        if let Some(comment) = &self.comment {
            write!(f, "  ; {comment}")?;
        }
        for posting in &self.postings {
            write!(f, "\n{posting}")?;
        }
        Ok(())
    }
}

/// The five account classes an `account` declaration may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// `type:expense`
    Expense,
    /// `type:revenue`
    Revenue,
    /// `type:asset`
    Asset,
    /// `type:liability`
    Liability,
    /// `type:equity`
    Equity,
}

impl AccountType {
    /// The token used after `type:`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Revenue => "revenue",
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
        }
    }
}

/// Error returned when a `type:` token names no known account class.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown account type '{0}'")]
pub struct UnknownAccountType(pub String);

impl FromStr for AccountType {
    type Err = UnknownAccountType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(Self::Expense),
            "revenue" => Ok(Self::Revenue),
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            other => Err(UnknownAccountType(other.to_string())),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An `account` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDeclaration {
    /// Trimmed account name
    pub name: String,
    /// Declared class
    pub account_type: AccountType,
    /// Reserved, never filled by the parser
    pub aliases: Vec<String>,
    /// Reserved, never filled by the parser
    pub assertions: Vec<String>,
}

impl AccountDeclaration {
    /// Create a declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            name: name.into(),
            account_type,
            aliases: Vec::new(),
            assertions: Vec::new(),
        }
    }
}

impl fmt::Display for AccountDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account {} ; type:{}", self.name, self.account_type)
    }
}

/// A top-level journal entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "lowercase")]
pub enum Entry {
    /// An `account` declaration
    Account(AccountDeclaration),
    /// A transaction of any kind
    Transaction(Transaction),
}

impl Entry {
    /// Get the entry type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Account(_) => "account",
            Self::Transaction(_) => "transaction",
        }
    }

    /// Get the transaction, if this entry is one.
    #[must_use]
    pub const fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            Self::Transaction(t) => Some(t),
            Self::Account(_) => None,
        }
    }

    /// Get the account declaration, if this entry is one.
    #[must_use]
    pub const fn as_account(&self) -> Option<&AccountDeclaration> {
        match self {
            Self::Account(a) => Some(a),
            Self::Transaction(_) => None,
        }
    }
}

impl From<AccountDeclaration> for Entry {
    fn from(a: AccountDeclaration) -> Self {
        Self::Account(a)
    }
}

impl From<Transaction> for Entry {
    fn from(t: Transaction) -> Self {
        Self::Transaction(t)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Account(a) => write!(f, "{a}"),
            Self::Transaction(t) => write!(f, "{t}"),
        }
    }
}
