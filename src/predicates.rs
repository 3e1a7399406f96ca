//! Pure string tests shared by the rule catalogue, plus the handful of
//! fixed regex patterns the spec names explicitly. Everything else in the
//! rule catalogue is matched with plain `str` methods, mirroring the
//! source implementation's preference for manual parsing over regex.

use once_cell::sync::Lazy;
use regex::Regex;

pub fn starts_with(line: &str, prefix: &str) -> bool {
    !line.is_empty() && line.starts_with(prefix)
}

pub fn ends_with(line: &str, suffix: &str) -> bool {
    line.len() >= suffix.len() && line.ends_with(suffix)
}

pub fn equals(a: &str, b: &str) -> bool {
    a == b
}

pub fn contains(line: &str, sub: &str) -> bool {
    line.contains(sub)
}

/// True iff `line` touches the accumulator register, per spec.md §4.3.
///
/// The source's literal `!startWith(pha) || !startWith(sta)` is always
/// true; this follows the evident intent (`&&`) so that `pha`/`sta` do
/// not themselves count as accumulator-changing.
pub fn changes_accu(line: &str) -> bool {
    if line.len() > 2 {
        let bytes = line.as_bytes();
        if bytes[2] == b'a' && !line.starts_with("pha") && !line.starts_with("sta") {
            return true;
        }
        if line.len() == 5 && line.ends_with(" a") {
            return true;
        }
    }
    false
}

/// True iff `line` is a label definition or alters control flow (jumps,
/// branches, relative labels).
pub fn is_control(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    if line.ends_with(':') {
        return true;
    }
    line.starts_with('j') || line.starts_with('b') || line.starts_with('-') || line.starts_with('+')
}

/// `st([axyz])\.b tcc__([rf][0-9]*h?)$`
pub static STORE_AXYZ: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^st([axyz])\.b tcc__([rf][0-9]*h?)$").unwrap());

/// `st([xy])\.b tcc__([rf][0-9]*h?)$`
pub static STORE_XY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^st([xy])\.b tcc__([rf][0-9]*h?)$").unwrap());

/// `sta\.b tcc__([rf][0-9]*h?)$`
pub static STORE_A: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^sta\.b tcc__([rf][0-9]*h?)$").unwrap());

/// `ld([xy])\.b tcc__([rf][0-9]*h?)$`
pub static LOAD_XY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ld([xy])\.b tcc__([rf][0-9]*h?)$").unwrap());

/// `lda\.b tcc__([rf][0-9]*)$` — no trailing `h` capture, per spec.md §4.3.
pub static LOAD_A_PREG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^lda\.b tcc__([rf][0-9]*)$").unwrap());

/// `lda\.l (.*),x$`
pub static LOAD_L_INDEXED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^lda\.l (.*),x$").unwrap());

/// `sta (.*),s$`
pub static STORE_STACK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^sta (.*),s$").unwrap());

/// `adc #(.*)$`
pub static ADC_IMM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^adc #(.*)$").unwrap());

/// `sta\.b (tcc__[fr][0-9]+)$`
pub static STORE_B_PREG: Lazy<Regex> = Lazy::new(|| Regex::new(r"^sta\.b (tcc__[fr][0-9]+)$").unwrap());
