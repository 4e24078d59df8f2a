//! chunkshuf CLI entry point
//!
//! Delegates everything to `cli::run`, reports failures and exits
//! non-zero.

use chunkshuf::cli;

fn main() {
    if let Err(e) = cli::run() {
        let _ = cli::write_error(e.code_str(), e.message());
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}
