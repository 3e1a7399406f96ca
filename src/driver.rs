//! Orchestrates one end-to-end run: read input, collect the `.bss`
//! symbol set, rewrite to a fixpoint, write output (spec.md §6,
//! SPEC_FULL.md §6).

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;

use crate::bss::collect_bss_names;
use crate::error::OptError;
use crate::line::read_lines;
use crate::rewriter::optimize;

const BANNER: &str = "______________[ASM CODE]_________________";

/// Runs the optimizer against `input_path` (or stdin, when `None`),
/// writing the rewritten program to `out`.
pub fn run(input_path: Option<&Path>, out: &mut impl Write) -> Result<(), OptError> {
    let lines = match input_path {
        Some(path) => {
            let file = File::open(path).map_err(|source| OptError::OpenFailed {
                path: path.to_path_buf(),
                source,
            })?;
            read_lines(BufReader::new(file))?
        }
        None => read_lines(io::stdin().lock())?,
    };

    log::debug!("read {} line(s)", lines.len());

    let bss = collect_bss_names(&lines);
    log::debug!("collected {} bss symbol(s)", bss.len());
    if log::log_enabled!(log::Level::Trace) {
        for name in &bss {
            log::trace!("bss symbol: {name}");
        }
        for line in &lines {
            log::trace!("trimmed input: {line}");
        }
    }

    let (rewritten, opted) = optimize(&lines, &bss);
    log::info!("{opted} rule(s) fired across all passes");

    if log::log_enabled!(log::Level::Info) {
        writeln!(out, "{BANNER}").map_err(|e| OptError::InternalError(e.to_string()))?;
    }
    for line in &rewritten {
        writeln!(out, "{line}").map_err(|e| OptError::InternalError(e.to_string()))?;
    }

    Ok(())
}

/// Reads the verbosity level from `OPT_65816_VERBOSE`, falling back to
/// the historical `OPT_816_QUIET` alias, and returns the `log::LevelFilter`
/// it maps to. Any unrecognised non-empty value is treated as level 0
/// and logged once at startup (SPEC_FULL.md §6).
pub fn verbosity_level() -> log::LevelFilter {
    let raw = std::env::var("OPT_65816_VERBOSE")
        .or_else(|_| std::env::var("OPT_816_QUIET"))
        .unwrap_or_default();

    match raw.as_str() {
        "" | "0" => log::LevelFilter::Off,
        "1" => log::LevelFilter::Info,
        "2" => log::LevelFilter::Trace,
        other => {
            eprintln!("opt65816: warning: OPT_65816_VERBOSE={other:?} is not a recognised level, treating as 0");
            log::LevelFilter::Off
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_end_to_end_on_minimal_input() {
        let mut out = Vec::new();
        let tmp = std::env::temp_dir().join("opt65816_driver_test_minimal.asm");
        std::fs::write(&tmp, "sta.b tcc__r0\nlda.b tcc__r0\n").unwrap();

        run(Some(&tmp), &mut out).unwrap();
        let _ = std::fs::remove_file(&tmp);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("sta.b tcc__r0"));
    }

    #[test]
    fn surfaces_open_failure_for_missing_file() {
        let mut out = Vec::new();
        let missing = std::env::temp_dir().join("opt65816_does_not_exist.asm");
        let err = run(Some(&missing), &mut out).unwrap_err();
        assert!(matches!(err, OptError::OpenFailed { .. }));
    }

    #[test]
    fn unset_verbosity_is_off() {
        std::env::remove_var("OPT_65816_VERBOSE");
        std::env::remove_var("OPT_816_QUIET");
        assert_eq!(verbosity_level(), log::LevelFilter::Off);
    }
}
