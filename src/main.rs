//! emberdb CLI entry point
//!
//! Parses arguments and dispatches to the CLI module, prints errors to
//! stderr and exits non-zero on failure. No configuration or storage work
//! happens here.

use emberdb::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
