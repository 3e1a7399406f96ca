use std::io::BufRead;

use crate::error::OptError;

/// Lines longer than this are a format error (spec.md §4.1). The original
/// C implementation used a 2048-byte `fgets` buffer; that bound was an
/// artifact of a fixed stack buffer, not a semantic requirement, so this
/// port uses the larger, explicitly-stated bound instead.
pub const MAX_LINE_LEN: usize = 4096;

/// Reads `source` line by line, stripping `;`-comments and surrounding
/// ASCII whitespace. Empty-after-trim lines are retained, matching the
/// source implementation's behaviour. Returns the lines in file order.
///
/// The comment check runs on the untrimmed line, before whitespace
/// trimming, matching `optimizer.c`'s `tidyFile` (which tests the raw
/// `fgets` buffer with `startWith(buf, COMMENT)` before ever calling
/// `trimWhiteSpace`). A line like `"  ; x"` therefore does *not* start
/// with `;` and is retained as a trimmed data line, not dropped as a
/// comment; only a line whose first character (before trimming) is `;`
/// is a comment.
pub fn read_lines(source: impl BufRead) -> Result<Vec<String>, OptError> {
    let mut lines = Vec::new();

    for (idx, raw) in source.lines().enumerate() {
        let raw = raw.map_err(|e| OptError::InternalError(e.to_string()))?;

        if raw.len() > MAX_LINE_LEN {
            return Err(OptError::InputFormat {
                line_no: idx + 1,
                len: raw.len(),
                max: MAX_LINE_LEN,
            });
        }

        if raw.starts_with(';') {
            continue;
        }

        let trimmed = raw.trim_matches(|c: char| c.is_ascii_whitespace());
        lines.push(trimmed.to_string());
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_comments_and_trims() {
        let input = "  lda #5  \n; a full-line comment\nsta.b tcc__r0\n";
        let lines = read_lines(input.as_bytes()).unwrap();
        assert_eq!(lines, vec!["lda #5".to_string(), "sta.b tcc__r0".to_string()]);
    }

    #[test]
    fn retains_blank_lines() {
        let input = "lda #1\n\nsta.b tcc__r0\n";
        let lines = read_lines(input.as_bytes()).unwrap();
        assert_eq!(lines, vec!["lda #1", "", "sta.b tcc__r0"]);
    }

    #[test]
    fn rejects_overlong_lines() {
        let input = format!("{}\n", "a".repeat(MAX_LINE_LEN + 1));
        let err = read_lines(input.as_bytes()).unwrap_err();
        assert!(matches!(err, OptError::InputFormat { .. }));
    }

    #[test]
    fn never_emits_comment_lines() {
        let input = "; comment\nnop\n";
        let lines = read_lines(input.as_bytes()).unwrap();
        assert!(lines.iter().all(|l| !l.starts_with(';')));
    }

    #[test]
    fn indented_semicolon_is_data_not_a_comment() {
        let input = "  ; x\n";
        let lines = read_lines(input.as_bytes()).unwrap();
        assert_eq!(lines, vec!["; x".to_string()]);
    }
}
