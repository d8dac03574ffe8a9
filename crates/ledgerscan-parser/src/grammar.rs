//! Grammar for the ledger journal dialect, built from chumsky combinators.
//!
//! # Organization
//!
//! 1. **Primitives** - whitespace, line ends, digit runs
//! 2. **Amounts** - leading-currency, trailing-currency and bare numbers
//! 3. **Notes & Postings** - `;` lines and indented account lines
//! 4. **Headers** - regular, automated (`=`) and periodic (`~`)
//! 5. **Declarations** - `account ... ; type:...`
//!
//! Parsers here only recognize text. Turning matches into records is left to
//! [`crate::reduce`], and none of these parsers insist on end of input; the
//! entry points in [`crate::harness`] add that.

use chumsky::prelude::*;
use ledgerscan_core::{Amount, Currency, Note, Posting, TransactionKind, TransactionState};

use chrono::NaiveDate;

use crate::reduce::{self, PostingLine, RawAccount, RawAmount, TxnField};
use crate::{Span, Spanned};

/// Input type of every grammar parser.
pub type ParserInput<'a> = &'a str;
/// Error type of every grammar parser.
pub type ParserExtra<'a> = extra::Err<Rich<'a, char>>;

const DIGITS: &str = "0123456789";

/// Single-character currency symbols.
pub const CURRENCY_SYMBOLS: &str = "$€£¥₹";

/// Characters that start a full-line comment at column 0.
pub const COMMENT_CHARS: &str = ";#%|*";

/// Convert a `SimpleSpan` to our Span type.
const fn to_span(s: SimpleSpan) -> Span {
    Span::new(s.start, s.end)
}

// ============================================================================
// Primitives
// ============================================================================

/// Parse optional whitespace (spaces and tabs only).
pub(crate) fn ws<'a>() -> impl Parser<'a, ParserInput<'a>, (), ParserExtra<'a>> + Clone {
    one_of(" \t").repeated().ignored()
}

/// Parse required whitespace.
pub(crate) fn ws1<'a>() -> impl Parser<'a, ParserInput<'a>, (), ParserExtra<'a>> + Clone {
    one_of(" \t").repeated().at_least(1).ignored()
}

/// Parse a newline.
fn newline<'a>() -> impl Parser<'a, ParserInput<'a>, (), ParserExtra<'a>> + Clone {
    just('\n')
        .ignored()
        .or(just('\r').ignore_then(just('\n')).ignored())
}

/// Parse a line terminator, or nothing at end of input.
fn line_end<'a>() -> impl Parser<'a, ParserInput<'a>, (), ParserExtra<'a>> + Clone {
    newline().or(end())
}

/// Everything up to the line terminator.
fn rest_of_line<'a>() -> impl Parser<'a, ParserInput<'a>, &'a str, ParserExtra<'a>> + Clone {
    none_of("\r\n").repeated().to_slice()
}

/// Text up to one of `stop` (or the line end), trimmed, must not be blank.
fn text_until<'a>(
    stop: &'static str,
    what: &'static str,
) -> impl Parser<'a, ParserInput<'a>, String, ParserExtra<'a>> + Clone {
    none_of(stop)
        .repeated()
        .at_least(1)
        .to_slice()
        .try_map(move |s: &str, span| {
            let s = s.trim();
            if s.is_empty() {
                Err(Rich::custom(span, format!("expected {what}")))
            } else {
                Ok(s.to_string())
            }
        })
}

/// A `;` comment to end of line, trimmed, `None` when empty.
fn inline_comment<'a>() -> impl Parser<'a, ParserInput<'a>, Option<String>, ParserExtra<'a>> + Clone
{
    just(';')
        .repeated()
        .at_least(1)
        .ignore_then(rest_of_line())
        .map(|s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        })
}

/// Parse digits.
fn digits<'a>() -> impl Parser<'a, ParserInput<'a>, &'a str, ParserExtra<'a>> + Clone {
    one_of(DIGITS).repeated().at_least(1).to_slice()
}

/// Whitespace after a header token, or the line end left for the next parser.
fn token_end<'a>() -> impl Parser<'a, ParserInput<'a>, (), ParserExtra<'a>> + Clone {
    ws1().or(line_end().rewind())
}

/// Trailing blank space and blank lines after a multi-line entity.
fn trailing_blank<'a>() -> impl Parser<'a, ParserInput<'a>, (), ParserExtra<'a>> + Clone {
    one_of(" \t\r\n").repeated().ignored()
}

// ============================================================================
// Dates
// ============================================================================

/// Parse a date: `YYYY-MM-DD`, `YYYY/MM/DD` or `YYYY.MM.DD`.
pub fn date<'a>() -> impl Parser<'a, ParserInput<'a>, NaiveDate, ParserExtra<'a>> + Clone {
    digits()
        .then_ignore(one_of("-/."))
        .then(digits())
        .then_ignore(one_of("-/."))
        .then(digits())
        .try_map(|((year, month), day): ((&str, &str), &str), span| {
            let y: i32 = year
                .parse()
                .map_err(|_| Rich::custom(span, "invalid year"))?;
            let m: u32 = month
                .parse()
                .map_err(|_| Rich::custom(span, "invalid month"))?;
            let d: u32 = day.parse().map_err(|_| Rich::custom(span, "invalid day"))?;
            NaiveDate::from_ymd_opt(y, m, d).ok_or_else(|| Rich::custom(span, "invalid date"))
        })
}

// ============================================================================
// Amounts
// ============================================================================

/// An optional minus sign.
fn sign<'a>() -> impl Parser<'a, ParserInput<'a>, bool, ParserExtra<'a>> + Clone {
    just('-').or_not().map(|s| s.is_some())
}

/// Integer digits with optional `,` groups of exactly three, then an
/// optional fraction.
fn number<'a>(
) -> impl Parser<'a, ParserInput<'a>, (&'a str, Option<&'a str>), ParserExtra<'a>> + Clone {
    let integer = digits()
        .then(
            just(',')
                .then(one_of(DIGITS).repeated().exactly(3))
                .repeated(),
        )
        .to_slice();
    let fraction = just('.').ignore_then(digits()).or_not();
    integer.then(fraction)
}

/// A currency symbol or a letter-only code, kept as written.
pub(crate) fn currency<'a>() -> impl Parser<'a, ParserInput<'a>, &'a str, ParserExtra<'a>> + Clone
{
    choice((
        one_of(CURRENCY_SYMBOLS).to_slice(),
        any()
            .filter(|c: &char| c.is_ascii_alphabetic())
            .repeated()
            .at_least(1)
            .to_slice(),
    ))
}

/// Parse an amount.
///
/// Alternatives are tried in order: leading currency (`$4.50`, `-$5`,
/// `USD 10`), trailing currency (`100 EUR`, `5€`), bare number (`1,234.56`).
/// A `-` may sit before the currency or the number in either currency shape.
pub fn amount<'a>() -> impl Parser<'a, ParserInput<'a>, Amount, ParserExtra<'a>> + Clone {
    let leading = sign()
        .then(currency())
        .then_ignore(ws())
        .then(sign())
        .then(number())
        .map(|(((neg_cur, symbol), neg_num), (integer, fraction))| RawAmount {
            negative: neg_cur || neg_num,
            integer,
            fraction,
            currency: Some(Currency::leading(symbol)),
        });

    let trailing = sign()
        .then(number())
        .then_ignore(ws())
        .then(sign())
        .then(currency())
        .map(|(((neg_num, (integer, fraction)), neg_cur), symbol)| RawAmount {
            negative: neg_num || neg_cur,
            integer,
            fraction,
            currency: Some(Currency::trailing(symbol)),
        });

    let bare = sign()
        .then(number())
        .map(|(negative, (integer, fraction))| RawAmount {
            negative,
            integer,
            fraction,
            currency: None,
        });

    choice((leading, trailing, bare)).try_map(|raw, span| {
        reduce::amount(raw).ok_or_else(|| Rich::custom(span, "amount out of range"))
    })
}

// ============================================================================
// Notes & Postings
// ============================================================================

/// `:a:` or `:a:b:` filling the rest of the line.
fn tags<'a>() -> impl Parser<'a, ParserInput<'a>, Note, ParserExtra<'a>> + Clone {
    let name = none_of(": \t\r\n").repeated().at_least(1).to_slice();
    just(':')
        .ignore_then(
            name.then_ignore(just(':'))
                .map(str::to_string)
                .repeated()
                .at_least(1)
                .collect::<Vec<_>>(),
        )
        .then_ignore(ws())
        .then_ignore(line_end().rewind())
        .map(Note::Tags)
}

/// `Key: value`, classified by [`reduce::classify_note`].
fn metadata<'a>() -> impl Parser<'a, ParserInput<'a>, Note, ParserExtra<'a>> + Clone {
    let key = any()
        .filter(|c: &char| c.is_ascii_uppercase())
        .then(
            any()
                .filter(|c: &char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
                .repeated(),
        )
        .to_slice();
    key.then_ignore(just(':'))
        .then(rest_of_line())
        .map(|(key, value)| reduce::classify_note(key, value))
}

/// Parse a note line: `; :tag:`, `; Key: value` or `; free text`.
pub fn note_line<'a>() -> impl Parser<'a, ParserInput<'a>, Note, ParserExtra<'a>> + Clone {
    let comment = rest_of_line().map(|s: &str| Note::Comment(s.trim().to_string()));
    ws().ignore_then(just(';'))
        .ignore_then(just(' ').or_not())
        .ignore_then(choice((tags(), metadata(), comment)))
        .then_ignore(line_end())
}

/// Parse an account name: tokens joined by single spaces.
///
/// Two spaces or a tab end the name.
pub(crate) fn account<'a>() -> impl Parser<'a, ParserInput<'a>, &'a str, ParserExtra<'a>> + Clone {
    let token = none_of(" \t\r\n;").repeated().at_least(1);
    token
        .clone()
        .then(just(' ').then(token).repeated())
        .to_slice()
}

/// Two or more spaces, or any run containing a tab.
fn amount_separator<'a>() -> impl Parser<'a, ParserInput<'a>, (), ParserExtra<'a>> + Clone {
    one_of(" \t")
        .repeated()
        .at_least(1)
        .to_slice()
        .filter(|s: &&str| s.len() >= 2 || s.contains('\t'))
        .ignored()
}

/// Parse one indented posting line, without preceding notes.
pub fn posting_line<'a>() -> impl Parser<'a, ParserInput<'a>, PostingLine, ParserExtra<'a>> + Clone
{
    ws1()
        .ignore_then(account().map_with(|a: &str, e| (a, to_span(e.span()))))
        .then(amount_separator().ignore_then(amount()).or_not())
        .then_ignore(ws())
        .then(inline_comment().or_not().map(Option::flatten))
        .then_ignore(line_end())
        .map(|(((account, account_span), amount), comment)| PostingLine {
            account: account.to_string(),
            account_span,
            amount,
            comment,
        })
}

/// Notes followed by the posting they belong to, spanned by its account.
pub fn posting_group<'a>(
) -> impl Parser<'a, ParserInput<'a>, Spanned<Posting>, ParserExtra<'a>> + Clone {
    note_line()
        .repeated()
        .collect::<Vec<_>>()
        .then(posting_line())
        .map(|(notes, line)| {
            let span = line.account_span;
            Spanned::new(reduce::assemble_posting(notes, line), span)
        })
}

/// At least `min` posting groups.
pub fn body<'a>(
    min: usize,
) -> impl Parser<'a, ParserInput<'a>, Vec<Spanned<Posting>>, ParserExtra<'a>> + Clone {
    posting_group().repeated().at_least(min).collect()
}

// ============================================================================
// Headers
// ============================================================================

/// `date[=aux] [*|!] [(code)] payee [; comment]`
fn regular_header<'a>(
) -> impl Parser<'a, ParserInput<'a>, Vec<TxnField>, ParserExtra<'a>> + Clone {
    let state = one_of("*!")
        .then_ignore(token_end())
        .map(|flag| TransactionState::from_flag(flag).unwrap_or_default());
    let code = just('(')
        .ignore_then(
            any()
                .filter(|c: &char| c.is_alphanumeric())
                .repeated()
                .at_least(1)
                .to_slice(),
        )
        .then_ignore(just(')'))
        .then_ignore(token_end());

    date()
        .then(just('=').ignore_then(date()).or_not())
        .then_ignore(ws1())
        .then(state.or_not())
        .then(code.or_not())
        .then(text_until(";\r\n", "payee"))
        .then(inline_comment().or_not().map(Option::flatten))
        .then_ignore(line_end())
        .map(|(((((date, aux), state), code), payee), comment)| {
            let mut fields = vec![TxnField::Date(date)];
            fields.extend(aux.map(TxnField::AuxDate));
            fields.extend(state.map(TxnField::State));
            fields.extend(code.map(|c: &str| TxnField::Code(c.to_string())));
            fields.push(TxnField::Payee(payee));
            fields.extend(comment.map(TxnField::Comment));
            fields
        })
}

/// `= predicate`
fn automated_header<'a>(
) -> impl Parser<'a, ParserInput<'a>, Vec<TxnField>, ParserExtra<'a>> + Clone {
    ws().ignore_then(just('='))
        .ignore_then(ws())
        .ignore_then(text_until("\r\n", "predicate"))
        .then_ignore(line_end())
        .map(|predicate| vec![TxnField::Predicate(predicate)])
}

/// `~ period`
fn periodic_header<'a>() -> impl Parser<'a, ParserInput<'a>, Vec<TxnField>, ParserExtra<'a>> + Clone
{
    ws().ignore_then(just('~'))
        .ignore_then(ws())
        .ignore_then(text_until("\r\n", "period"))
        .then_ignore(line_end())
        .map(|period| vec![TxnField::Period(period)])
}

/// The header parser for a transaction kind.
pub fn header<'a>(
    kind: TransactionKind,
) -> Boxed<'a, 'a, ParserInput<'a>, Vec<TxnField>, ParserExtra<'a>> {
    match kind {
        TransactionKind::Regular => regular_header().boxed(),
        TransactionKind::Automated => automated_header().boxed(),
        TransactionKind::Periodic => periodic_header().boxed(),
    }
}

/// Parse a whole transaction of the given kind into its ordered fields.
pub fn transaction<'a>(
    kind: TransactionKind,
) -> impl Parser<'a, ParserInput<'a>, Vec<TxnField>, ParserExtra<'a>> + Clone {
    header(kind)
        .then(body(kind.min_postings()))
        .then_ignore(trailing_blank())
        .map(|(mut fields, postings)| {
            fields.extend(postings.into_iter().map(TxnField::Posting));
            fields
        })
}

// ============================================================================
// Declarations
// ============================================================================

/// `account NAME ;; type:WORD`
pub fn account_declaration<'a>(
) -> impl Parser<'a, ParserInput<'a>, RawAccount<'a>, ParserExtra<'a>> + Clone {
    let word = any()
        .filter(|c: &char| c.is_alphanumeric() || matches!(c, '_' | '-'))
        .repeated()
        .at_least(1)
        .to_slice();

    just("account")
        .ignore_then(ws1())
        .ignore_then(text_until(";\r\n", "account name"))
        .then_ignore(just(';').repeated().at_least(1))
        .then_ignore(ws())
        .then_ignore(just("type:"))
        .then_ignore(ws())
        .then(word.map_with(|w: &str, e| (w, to_span(e.span()))))
        .then_ignore(ws())
        .then_ignore(newline().or_not())
        .then_ignore(trailing_blank())
        .map(|(name, (type_word, type_span))| RawAccount {
            name,
            type_word,
            type_span,
        })
}
