//! Implementation of the ledgerscan-check command.

use crate::report;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ledgerscan_core::Entry;
use ledgerscan_parser::{parse_journal_file, ParseError, Spanned};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

/// Output format for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output for IDE/tooling integration
    Json,
}

/// A diagnostic message in JSON format.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    /// Source file path
    pub file: String,
    /// Line number (1-based)
    pub line: usize,
    /// Column number (1-based)
    pub column: usize,
    /// End line number (1-based)
    pub end_line: usize,
    /// End column number (1-based)
    pub end_column: usize,
    /// Error code (e.g., "P0006")
    pub code: String,
    /// Stable reason name (e.g., "insufficient_postings")
    pub reason: String,
    /// Error message
    pub message: String,
    /// Include chain, outermost first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included_from: Vec<String>,
}

/// JSON output structure.
#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    /// List of diagnostics
    pub diagnostics: Vec<JsonDiagnostic>,
    /// Total error count
    pub error_count: usize,
    /// Number of entries parsed
    pub entry_count: usize,
    /// Parsed entries, with `--dump`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<&'a [Spanned<Entry>]>,
}

/// What a check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Blocks that failed to parse
    pub error_count: usize,
    /// Blocks parsed into entries
    pub entry_count: usize,
}

impl CheckOutcome {
    /// Exit code for this outcome.
    pub fn exit_code(self) -> ExitCode {
        if self.error_count > 0 {
            ExitCode::from(1)
        } else {
            ExitCode::SUCCESS
        }
    }
}

/// Convert a byte offset to (line, column) in 1-based indexing.
fn byte_offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, ch) in source.char_indices() {
        if i >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

fn json_diagnostic(file: &str, source: &str, error: &ParseError) -> JsonDiagnostic {
    let (line, column) = byte_offset_to_line_col(source, error.span.start);
    let (end_line, end_column) = byte_offset_to_line_col(source, error.span.end);
    JsonDiagnostic {
        file: error.file.clone().unwrap_or_else(|| file.to_string()),
        line: error.line.unwrap_or(line),
        column,
        end_line,
        end_column,
        code: format!("P{:04}", error.kind_code()),
        reason: error.kind.as_str().to_string(),
        message: error.message(),
        included_from: error
            .import_chain
            .iter()
            .map(|frame| format!("{}:{}", frame.file, frame.line))
            .collect(),
    }
}

/// Parse ledger journals and report errors.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The journal file to check
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format (text or json)
    #[arg(long, short = 'f', value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print the parsed entries as JSON
    #[arg(long)]
    pub dump: bool,

    /// Show verbose output including timing information
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output (just use exit code)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Check the journal named by `args`, writing the report to `out`.
///
/// Fails only when the file cannot be read or the report cannot be written;
/// parse errors are counted in the outcome.
pub fn run<W: Write>(args: &Args, out: &mut W) -> Result<CheckOutcome> {
    let start = std::time::Instant::now();
    let file = &args.file;

    if args.verbose && !args.quiet {
        eprintln!("Parsing {}...", file.display());
    }

    let source = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let path = file.display().to_string();
    let result = parse_journal_file(&path, &source);

    let outcome = CheckOutcome {
        error_count: result.errors.len(),
        entry_count: result.entries.len(),
    };
    tracing::debug!(
        "{}: {} entries, {} includes, {} errors",
        path,
        outcome.entry_count,
        result.includes.len(),
        outcome.error_count
    );

    if args.quiet {
        return Ok(outcome);
    }

    match args.format {
        OutputFormat::Json => {
            let output = JsonOutput {
                diagnostics: result
                    .errors
                    .iter()
                    .map(|e| json_diagnostic(&path, &source, e))
                    .collect(),
                error_count: outcome.error_count,
                entry_count: outcome.entry_count,
                entries: args.dump.then_some(result.entries.as_slice()),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&output)?)?;
        }
        OutputFormat::Text => {
            report::report_parse_errors(&result.errors, &path, &source, out)?;
            if args.dump {
                writeln!(out, "{}", serde_json::to_string_pretty(&result.entries)?)?;
            }
            if args.verbose {
                writeln!(
                    out,
                    "\nChecked in {:.2}ms",
                    start.elapsed().as_secs_f64() * 1000.0
                )?;
            }
            report::print_summary(outcome.error_count, outcome.entry_count, out)?;
        }
    }

    Ok(outcome)
}

/// Main entry point for the check command.
pub fn main() -> ExitCode {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr)
            .init();
    }

    let mut stdout = io::stdout().lock();
    match run(&args, &mut stdout) {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_offset_to_line_col() {
        let source = "ab\ncd\n";
        assert_eq!(byte_offset_to_line_col(source, 0), (1, 1));
        assert_eq!(byte_offset_to_line_col(source, 1), (1, 2));
        assert_eq!(byte_offset_to_line_col(source, 3), (2, 1));
        assert_eq!(byte_offset_to_line_col(source, 100), (3, 1));
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["ledgerscan-check", "main.ledger"]).unwrap();
        assert_eq!(args.file, PathBuf::from("main.ledger"));
        assert_eq!(args.format, OutputFormat::Text);
        assert!(!args.dump);
        assert!(!args.verbose);
        assert!(!args.quiet);
    }

    #[test]
    fn test_args_flags() {
        let args = Args::try_parse_from([
            "ledgerscan-check",
            "main.ledger",
            "--format",
            "json",
            "--dump",
            "-q",
        ])
        .unwrap();
        assert_eq!(args.format, OutputFormat::Json);
        assert!(args.dump);
        assert!(args.quiet);
    }

    #[test]
    fn test_args_require_file() {
        assert!(Args::try_parse_from(["ledgerscan-check"]).is_err());
    }
}
