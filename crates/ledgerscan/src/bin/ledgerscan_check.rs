//! ledgerscan-check - Parse a ledger journal and report errors.

fn main() -> std::process::ExitCode {
    ledgerscan::cmd::check::main()
}
