use std::path::PathBuf;

use thiserror::Error;

/// Error taxonomy for the optimizer driver.
///
/// Every variant maps to `EXIT_FAILURE` at the process boundary; none is
/// recoverable, since the tool is an offline batch utility.
#[derive(Debug, Error)]
pub enum OptError {
    /// More than one positional argument was given.
    #[error("usage:\n  - {prog} <filename>\n  - <stdin> | {prog}")]
    Usage { prog: String },

    /// The input file could not be opened.
    #[error("{path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input line exceeded `MAX_LINE_LEN` bytes.
    #[error("line {line_no} exceeds maximum length of {max} bytes ({len} bytes)")]
    InputFormat {
        line_no: usize,
        len: usize,
        max: usize,
    },

    /// Regex compilation or allocation failure; should be unreachable for
    /// the fixed pattern set, but kept for parity with the source's
    /// taxonomy.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl OptError {
    pub fn exit_code(&self) -> i32 {
        1
    }
}
