//! Core types for ledgerscan
//!
//! This crate provides the entities recognized in a ledger journal:
//!
//! - [`Amount`] - A signed decimal with an optional [`Currency`]
//! - [`Posting`] - One account line of a transaction
//! - [`Transaction`] - Regular, automated or periodic transaction
//! - [`AccountDeclaration`] - An `account` line with its [`AccountType`]
//! - [`Note`] - A tag, metadata or comment line preceding a posting
//! - [`Entry`] - A top-level journal entry
//!
//! # Example
//!
//! ```
//! use ledgerscan_core::{Amount, Posting, Transaction, TransactionState};
//! use rust_decimal_macros::dec;
//! use chrono::NaiveDate;
//!
//! let txn = Transaction::new(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(), "Coffee Shop")
//!     .with_state(TransactionState::Cleared)
//!     .with_posting(Posting::new("Expenses:Coffee", Amount::leading(dec!(4.50), "$")))
//!     .with_posting(Posting::auto("Assets:Cash"));
//!
//! assert_eq!(txn.postings.len(), 2);
//! assert_eq!(txn.elided_postings(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod amount;
pub mod entry;

pub use amount::{Amount, Currency, CurrencyPosition};
pub use entry::{
    AccountDeclaration, AccountType, Entry, Metadata, Note, Posting, Transaction, TransactionKind,
    TransactionState, UnknownAccountType,
};

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
