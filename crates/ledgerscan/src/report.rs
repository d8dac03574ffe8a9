//! Error reporting with source-annotated diagnostics.
//!
//! Uses ariadne for pretty-printed error messages with source context.

use ariadne::{ColorGenerator, Config, Label, Report, ReportKind, Source};
use ledgerscan_parser::ParseError;
use std::io::Write;

/// Report parse errors to the given writer.
///
/// Returns the number of errors reported.
pub fn report_parse_errors<W: Write>(
    errors: &[ParseError],
    path: &str,
    source: &str,
    writer: &mut W,
) -> std::io::Result<usize> {
    let mut colors = ColorGenerator::new();

    for error in errors {
        let color = colors.next();
        let (start, end) = clamp(error.span(), source.len());

        let mut report = Report::build(ReportKind::Error, (path, start..end))
            .with_code(format!("P{:04}", error.kind_code()))
            .with_message(error.message())
            .with_label(
                Label::new((path, start..end))
                    .with_message(error.label())
                    .with_color(color),
            )
            .with_config(Config::default().with_compact(false));
        for frame in error.import_chain.iter().rev() {
            report = report.with_note(format!("included from {}:{}", frame.file, frame.line));
        }
        report
            .finish()
            .write((path, Source::from(source)), &mut *writer)?;
    }

    Ok(errors.len())
}

/// Keep a span inside the source so ariadne can always place it.
fn clamp((start, end): (usize, usize), len: usize) -> (usize, usize) {
    let start = start.min(len);
    (start, end.clamp(start, len))
}

/// Print a summary of errors.
pub fn print_summary<W: Write>(
    errors: usize,
    entries: usize,
    writer: &mut W,
) -> std::io::Result<()> {
    let entry_text = if entries == 1 { "entry" } else { "entries" };
    if errors == 0 {
        writeln!(
            writer,
            "\x1b[32m\u{2713}\x1b[0m No errors found ({entries} {entry_text})"
        )
    } else {
        let error_text = if errors == 1 { "error" } else { "errors" };
        writeln!(
            writer,
            "\x1b[31m\u{2717}\x1b[0m {errors} {error_text} ({entries} {entry_text} parsed)"
        )
    }
}
