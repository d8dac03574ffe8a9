//! Property-based tests for ledgerscan-parser.
//!
//! These tests verify invariants hold for arbitrary inputs using proptest.
//!
//! Run with: cargo test -p ledgerscan-parser --test `property_tests`

use std::collections::HashMap;

use ledgerscan_core::{CurrencyPosition, Note};
use ledgerscan_parser::{parse_amount, parse_note, parse_posting, parse_regular_transaction};
use proptest::prelude::*;
use rust_decimal::Decimal;

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_decimal() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000i64, 0u32..5u32).prop_map(|(n, scale)| Decimal::new(n, scale))
}

fn arb_currency() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("$".to_string()),
        Just("€".to_string()),
        Just("£".to_string()),
        Just("USD".to_string()),
        Just("EUR".to_string()),
        Just("AAPL".to_string()),
    ]
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Leading,
    Trailing,
    Bare,
}

fn arb_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![Just(Shape::Leading), Just(Shape::Trailing), Just(Shape::Bare)]
}

fn arb_words() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,8}", 1..6).prop_map(|words| words.join(" "))
}

fn arb_padding() -> impl Strategy<Value = String> {
    "[ \t]{0,4}"
}

fn arb_account() -> impl Strategy<Value = String> {
    prop::collection::vec("[A-Z][a-z]{1,8}", 1..4).prop_map(|parts| parts.join(":"))
}

fn arb_note() -> impl Strategy<Value = Note> {
    prop_oneof![
        prop::collection::vec("[a-z]{1,6}", 1..4).prop_map(Note::Tags),
        arb_words().prop_map(Note::Comment),
        (
            prop_oneof![Just("Receipt"), Just("Project"), Just("Ref")],
            "[0-9]{1,5}"
        )
            .prop_map(|(key, value)| Note::Metadata {
                key: key.to_string(),
                value
            }),
    ]
}

/// Insert `,` every three digits of an integer part.
fn group_thousands(integer: &str) -> String {
    let mut out = String::new();
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Write `value` the way a journal author would.
fn format_amount(value: Decimal, currency: &str, shape: Shape, grouped: bool) -> String {
    let sign = if value.is_sign_negative() && !value.is_zero() {
        "-"
    } else {
        ""
    };
    let magnitude = value.abs().to_string();
    let number = match magnitude.split_once('.') {
        Some((int, frac)) if grouped => format!("{}.{frac}", group_thousands(int)),
        None if grouped => group_thousands(&magnitude),
        _ => magnitude,
    };
    let sep = if currency.chars().all(|c| c.is_ascii_alphabetic()) {
        " "
    } else {
        ""
    };
    match shape {
        Shape::Leading => format!("{sign}{currency}{sep}{number}"),
        Shape::Trailing => format!("{sign}{number}{sep}{currency}"),
        Shape::Bare => format!("{sign}{number}"),
    }
}

fn note_line(note: &Note) -> String {
    match note {
        Note::Tags(tags) => format!("    ; :{}:", tags.join(":")),
        Note::Metadata { key, value } => format!("    ; {key}: {value}"),
        Note::Comment(text) => format!("    ; {text}"),
    }
}

// ============================================================================
// Amount Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Any written amount parses back to exactly the same decimal.
    #[test]
    fn prop_amount_value_is_exact(
        value in arb_decimal(),
        currency in arb_currency(),
        shape in arb_shape(),
        grouped in any::<bool>(),
    ) {
        let text = format_amount(value, &currency, shape, grouped);
        let amount = parse_amount(&text).unwrap();

        prop_assert_eq!(amount.value, value, "text: {}", text);
        prop_assert_eq!(amount.scale(), value.scale());
        match shape {
            Shape::Bare => {
                prop_assert_eq!(amount.currency(), None);
                prop_assert_eq!(amount.currency_position(), None);
            }
            Shape::Leading => {
                prop_assert_eq!(amount.currency(), Some(currency.as_str()));
                prop_assert_eq!(amount.currency_position(), Some(CurrencyPosition::Leading));
            }
            Shape::Trailing => {
                prop_assert_eq!(amount.currency(), Some(currency.as_str()));
                prop_assert_eq!(amount.currency_position(), Some(CurrencyPosition::Trailing));
            }
        }
    }

    /// Grouping separators never change the value.
    #[test]
    fn prop_grouping_is_transparent(value in arb_decimal()) {
        let plain = parse_amount(&format_amount(value, "", Shape::Bare, false)).unwrap();
        let grouped = parse_amount(&format_amount(value, "", Shape::Bare, true)).unwrap();
        prop_assert_eq!(plain.value, grouped.value);
    }
}

// ============================================================================
// Trimming Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Comment text is trimmed, and trimming twice changes nothing.
    #[test]
    fn prop_comment_trim_idempotent(
        text in arb_words(),
        before in arb_padding(),
        after in arb_padding(),
    ) {
        let note = parse_note(&format!(";{before}{text}{after}")).unwrap();
        prop_assert_eq!(&note, &Note::Comment(text.clone()));

        let Note::Comment(once) = note else { unreachable!() };
        let twice = parse_note(&format!("; {once}")).unwrap();
        prop_assert_eq!(twice, Note::Comment(once));
    }

    /// Account names lose surrounding blanks and keep internal single spaces.
    #[test]
    fn prop_account_trimmed(
        account in arb_account(),
        suffix in "( [A-Z][a-z]{1,6})?",
        indent in "[ \t]{1,4}",
        trailing in " {0,3}",
    ) {
        let name = format!("{account}{suffix}");
        let posting = parse_posting(&format!("{indent}{name}{trailing}")).unwrap();
        prop_assert_eq!(posting.account, name);
    }
}

// ============================================================================
// Ordering Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Notes attach to the next posting: tags and comments in order, metadata
    /// with the last value per key.
    #[test]
    fn prop_note_order_preserved(
        notes in prop::collection::vec(arb_note(), 0..8),
        accounts in prop::collection::vec(arb_account(), 2..5),
    ) {
        let mut source = String::from("2024/01/15 * Payee\n");
        for line in notes.iter().map(note_line) {
            source.push_str(&line);
            source.push('\n');
        }
        for (i, account) in accounts.iter().enumerate() {
            if i == 0 {
                source.push_str(&format!("    {account}  $1.00\n"));
            } else {
                source.push_str(&format!("    {account}\n"));
            }
        }

        let txn = parse_regular_transaction(&source).unwrap();
        prop_assert_eq!(txn.postings.len(), accounts.len());

        let names: Vec<&str> = txn.postings.iter().map(|p| p.account.as_str()).collect();
        let expected_names: Vec<&str> = accounts.iter().map(String::as_str).collect();
        prop_assert_eq!(names, expected_names);

        let mut tags = Vec::new();
        let mut comments = Vec::new();
        let mut metadata = HashMap::new();
        for note in notes {
            match note {
                Note::Tags(t) => tags.extend(t),
                Note::Comment(c) => comments.push(c),
                Note::Metadata { key, value } => {
                    metadata.insert(key, value);
                }
            }
        }

        let first = &txn.postings[0];
        prop_assert_eq!(&first.tags, &tags);
        prop_assert_eq!(&first.comments, &comments);
        prop_assert_eq!(&first.metadata, &metadata);

        for posting in &txn.postings[1..] {
            prop_assert!(posting.tags.is_empty());
            prop_assert!(posting.comments.is_empty());
            prop_assert!(posting.metadata.is_empty());
        }
    }
}
