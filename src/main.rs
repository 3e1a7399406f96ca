use std::path::PathBuf;
use std::process::exit;

use opt65816::driver::{run, verbosity_level};
use opt65816::error::OptError;

const HELP: &str = "\
opt65816 - peephole optimizer for 65816 assembly emitted by 816-tcc

usage:
  opt65816 [filename]
  <stdin> | opt65816

options:
  -h, --help     print this message and exit
  --version      print the version and exit

With no filename, reads from stdin. Output is always written to stdout.";

/// Parses the at-most-one positional filename argument. `-h`/`--help` and
/// `--version` exit the process directly; more than one positional
/// argument is a real `OptError::Usage`, not a cosmetic message, so it
/// flows through the same error path as every other failure.
fn parse_args(args: &[String]) -> Result<Option<String>, OptError> {
    let prog = args.first().map(String::as_str).unwrap_or("opt65816").to_string();
    let mut positional: Option<String> = None;

    for arg in &args[1..] {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{HELP}");
                exit(0);
            }
            "--version" => {
                println!("opt65816 {}", env!("CARGO_PKG_VERSION"));
                exit(0);
            }
            _ if positional.is_some() => return Err(OptError::Usage { prog }),
            other => positional = Some(other.to_string()),
        }
    }

    Ok(positional)
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    env_logger::Builder::new().filter_level(verbosity_level()).format_timestamp(None).init();

    let positional = match parse_args(&args) {
        Ok(positional) => positional,
        // The usage message is the one diagnostic that goes to stdout,
        // not stderr (spec.md §6).
        Err(err @ OptError::Usage { .. }) => {
            println!("{err}");
            exit(err.exit_code());
        }
        Err(err) => {
            eprintln!("opt65816: {err}");
            exit(err.exit_code());
        }
    };

    let input_path = positional.map(PathBuf::from);
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    if let Err(err) = run(input_path.as_deref(), &mut handle) {
        eprintln!("opt65816: {err}");
        exit(err.exit_code());
    }
}
