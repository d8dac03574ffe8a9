//! Ledger journal command-line tools.
//!
//! - `ledgerscan-check`: parse a journal and report every block that fails
//!
//! # Example Usage
//!
//! ```bash
//! ledgerscan-check household.ledger
//! ledgerscan-check household.ledger --format json
//! ledgerscan-check household.ledger --dump
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod report;
