//! Group B: rules dispatched when `T[i]` starts with `ld` (spec.md §4.4,
//! R19-R31).

use std::collections::HashSet;

use crate::predicates::{is_control, LOAD_L_INDEXED};

use super::{get, RuleEffect};

/// R19: `ldx #0` / indexed load shortening.
pub(crate) fn r19(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    if t[i] != "ldx #0" {
        return None;
    }
    let caps = LOAD_L_INDEXED.captures(get(t, i, 1))?;
    let sym = caps.get(1)?.as_str().to_string();

    if !get(t, i, 3).ends_with(",x") {
        return Some(RuleEffect::counted(2, vec![format!("lda.l {sym}")]));
    }
    let stripped = get(t, i, 3).strip_suffix(",x").unwrap_or(get(t, i, 3)).to_string();
    Some(RuleEffect::counted(4, vec![format!("lda.l {sym}"), t[i + 2].clone(), stripped]))
}

/// R20: fuse a 32-bit literal assembled from two 16-bit halves into a
/// single long store.
pub(crate) fn r20(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let a_str = t[i].strip_prefix("lda.w #")?;
    if get(t, i, 1) != "sta.b tcc__r9" {
        return None;
    }
    let b_str = get(t, i, 2).strip_prefix("lda.w #")?;
    if get(t, i, 3) != "sta.b tcc__r9h" {
        return None;
    }
    if get(t, i, 4) != "sep #$20" {
        return None;
    }
    let l5 = get(t, i, 5);
    if !l5.starts_with("lda.b ") {
        return None;
    }
    if get(t, i, 6) != "sta.b [tcc__r9]" {
        return None;
    }
    if get(t, i, 7) != "rep #$20" {
        return None;
    }

    // The original source interprets both halves as decimal (`atol`); a
    // non-decimal literal (e.g. hex `$xx`) leaves this rule unfired.
    let a: i64 = a_str.parse().ok()?;
    let b: i64 = b_str.parse().ok()?;
    let k = b * 65536 + a;

    Some(RuleEffect::counted(
        8,
        vec!["sep #$20".to_string(), l5.to_string(), format!("sta.l {k}"), "rep #$20".to_string()],
    ))
}

/// R21: zero-store peephole (`lda.w #0` -> `stz`).
pub(crate) fn r21(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    if t[i] != "lda.w #0" {
        return None;
    }
    let l1 = get(t, i, 1);
    if l1.starts_with("sta.b ") && get(t, i, 2).starts_with("lda") {
        return Some(RuleEffect::counted(2, vec![l1.replacen("sta.", "stz.", 1)]));
    }
    None
}

/// R22: 8-bit narrow store.
///
/// The antecedent checks `T[i+4]` against two mutually exclusive literals
/// (`== "rep #$20"` and `starts_with("lda")`), a condition that can never
/// be satisfied. This mirrors the same contradiction in the original C
/// source's `USECASE #41` check; the rule is kept for catalogue parity
/// but never fires.
pub(crate) fn r22(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    if !t[i].starts_with("lda.w #") {
        return None;
    }
    let l4 = get(t, i, 4);
    if get(t, i, 1) == "sep #$20" && get(t, i, 2).starts_with("sta ") && l4 == "rep #$20" && l4.starts_with("lda") {
        let emitted = t[i].replacen("lda.w", "lda.b", 1);
        return Some(RuleEffect::counted(
            4,
            vec!["sep #$20".to_string(), emitted, get(t, i, 2).to_string(), get(t, i, 3).to_string()],
        ));
    }
    None
}

/// R23: dead initial load.
pub(crate) fn r23(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    if !t[i].starts_with("lda.b") {
        return None;
    }
    let l1 = get(t, i, 1);
    if !is_control(l1) && !l1.contains('a') && get(t, i, 2).starts_with("lda.b") {
        return Some(RuleEffect::counted(3, vec![t[i + 1].clone(), t[i + 2].clone()]));
    }
    None
}

/// R24: preg-high saved and restored around unrelated code.
pub(crate) fn r24(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let l0 = &t[i];
    if !(l0.starts_with("lda ") && l0.ends_with(",s")) {
        return None;
    }
    let l1 = get(t, i, 1);
    if !(l1.starts_with("sta.b tcc__r") && l1.ends_with('h')) {
        return None;
    }

    let loc = &l0[4..];
    let reg = &l1[6..];

    let n = t.len();
    let mut j = i + 2;
    while j < n.saturating_sub(2) && !is_control(&t[j]) && !t[j].contains(reg) {
        j += 1;
    }

    if j + 1 < n && t[j] == format!("lda.b {reg}") && t[j + 1] == format!("sta {loc}") {
        let emit = t[i..j].to_vec();
        let consumed = j + 2 - i;
        return Some(RuleEffect::counted(consumed, emit));
    }
    None
}

/// R25: reorder a 32-bit copy for subsequent coalescing. Does not count
/// toward `opted` (it is a preparatory swap, not a reduction).
pub(crate) fn r25(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    if !t[i].starts_with("lda") {
        return None;
    }
    let l1 = get(t, i, 1);
    if !l1.starts_with("sta.b tcc__r") {
        return None;
    }
    let reg = &l1[6..];
    if reg.ends_with('h') {
        return None;
    }
    let l2 = get(t, i, 2);
    if !l2.starts_with("lda") || l2.ends_with(reg) {
        return None;
    }
    let l3 = get(t, i, 3);
    if !(l3.starts_with("sta.b tcc__r") && l3.ends_with('h')) {
        return None;
    }
    if !get(t, i, 4).ends_with(reg) {
        return None;
    }
    Some(RuleEffect::uncounted(
        4,
        vec![t[i + 2].clone(), t[i + 3].clone(), t[i].clone(), t[i + 1].clone()],
    ))
}

/// Shared shape for the six compare-lowering templates (R26-R31): a
/// `long long` comparison lowered by the codegen into a ones-based
/// subtract-and-test sequence, collapsed into a direct `cmp` provided the
/// sequence isn't itself followed by `tya` (spec.md §4.4 R26-R31).
///
/// `sbc_prefix` selects the subtrahend form (immediate, word immediate, or
/// a forwarded pseudo-register); `beq_first` selects which of the two
/// branch orderings the codegen may emit for the comparison's polarity.
fn compare_lowering(
    t: &[String],
    i: usize,
    sbc_prefix: &str,
    cmp: impl Fn(&str) -> String,
    beq_first: bool,
) -> Option<RuleEffect> {
    if t[i] != "ldx #1" {
        return None;
    }
    if !get(t, i, 1).starts_with("lda.b tcc__") {
        return None;
    }
    if get(t, i, 2) != "sec" {
        return None;
    }
    let l3 = get(t, i, 3);
    if !l3.starts_with(sbc_prefix) {
        return None;
    }
    let ins = &l3[sbc_prefix.len()..];
    if get(t, i, 4) != "tay" {
        return None;
    }

    let (first_branch, second_branch) = if beq_first { ("beq +", "bne +") } else { ("bne +", "beq +") };
    if get(t, i, 5) != first_branch {
        return None;
    }
    if get(t, i, 6) != "dex" {
        return None;
    }
    if get(t, i, 7) != "+" {
        return None;
    }
    if !get(t, i, 8).starts_with("stx.b tcc__") {
        return None;
    }
    if get(t, i, 9) != "txa" {
        return None;
    }
    if get(t, i, 10) != second_branch {
        return None;
    }
    if !get(t, i, 11).starts_with("brl ") {
        return None;
    }
    if get(t, i, 12) != "+" {
        return None;
    }
    if get(t, i, 13) == "tya" {
        return None;
    }

    Some(RuleEffect::counted(
        13,
        vec![
            get(t, i, 1).to_string(),
            cmp(ins),
            first_branch.to_string(),
            get(t, i, 11).to_string(),
            "+".to_string(),
        ],
    ))
}

/// R26: compare lowering, immediate subtrahend, `beq` taken on equal.
pub(crate) fn r26(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    compare_lowering(t, i, "sbc #", |ins| format!("cmp #{ins}"), true)
}

/// R27: compare lowering, word-sized immediate subtrahend, `beq` taken on
/// equal.
pub(crate) fn r27(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    compare_lowering(t, i, "sbc.w #", |ins| format!("cmp.w #{ins}"), true)
}

/// R28: compare lowering, forwarded-pseudo-register subtrahend, `beq`
/// taken on equal.
pub(crate) fn r28(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    compare_lowering(t, i, "sbc.b ", |ins| format!("cmp.b {ins}"), true)
}

/// R29: compare lowering, immediate subtrahend, inverted polarity
/// (`bne` taken on equal).
pub(crate) fn r29(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    compare_lowering(t, i, "sbc #", |ins| format!("cmp #{ins}"), false)
}

/// R30: compare lowering, word-sized immediate subtrahend, inverted
/// polarity.
pub(crate) fn r30(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    compare_lowering(t, i, "sbc.w #", |ins| format!("cmp.w #{ins}"), false)
}

/// R31: compare lowering, forwarded-pseudo-register subtrahend, inverted
/// polarity.
pub(crate) fn r31(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    compare_lowering(t, i, "sbc.b ", |ins| format!("cmp.b {ins}"), false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn r19_drops_index_when_final_operand_not_indexed() {
        let t = lines(&["ldx #0", "lda.l table,x", "nop", "rts"]);
        let eff = r19(&t, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.consumed, 2);
        assert_eq!(eff.emit, vec!["lda.l table"]);
    }

    #[test]
    fn r19_keeps_trailing_index_lines_deindexed() {
        let t = lines(&["ldx #0", "lda.l table,x", "clc", "sta foo,x"]);
        let eff = r19(&t, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.consumed, 4);
        assert_eq!(eff.emit, vec!["lda.l table", "clc", "sta foo"]);
    }

    #[test]
    fn r20_fuses_32_bit_literal() {
        let t = lines(&[
            "lda.w #1",
            "sta.b tcc__r9",
            "lda.w #2",
            "sta.b tcc__r9h",
            "sep #$20",
            "lda.b foo",
            "sta.b [tcc__r9]",
            "rep #$20",
        ]);
        let eff = r20(&t, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.consumed, 8);
        assert_eq!(
            eff.emit,
            vec!["sep #$20".to_string(), "lda.b foo".to_string(), "sta.l 131073".to_string(), "rep #$20".to_string()]
        );
    }

    #[test]
    fn r20_does_not_fire_on_non_decimal_literal() {
        let t = lines(&[
            "lda.w #$1",
            "sta.b tcc__r9",
            "lda.w #$2",
            "sta.b tcc__r9h",
            "sep #$20",
            "lda.b foo",
            "sta.b [tcc__r9]",
            "rep #$20",
        ]);
        assert!(r20(&t, 0, &HashSet::new()).is_none());
    }

    #[test]
    fn r22_never_fires() {
        let t = lines(&["lda.w #5", "sep #$20", "sta foo", "nop", "rep #$20"]);
        assert!(r22(&t, 0, &HashSet::new()).is_none());
    }

    #[test]
    fn r26_lowers_long_long_compare() {
        let t = lines(&[
            "ldx #1",
            "lda.b tcc__r0",
            "sec",
            "sbc #5",
            "tay",
            "beq +",
            "dex",
            "+",
            "stx.b tcc__r1",
            "txa",
            "bne +",
            "brl .target",
            "+",
            "nop",
        ]);
        let eff = r26(&t, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.consumed, 13);
        assert_eq!(eff.emit, vec!["lda.b tcc__r0", "cmp #5", "beq +", "brl .target", "+"]);
    }

    #[test]
    fn r26_does_not_fire_before_tya() {
        let t = lines(&[
            "ldx #1",
            "lda.b tcc__r0",
            "sec",
            "sbc #5",
            "tay",
            "beq +",
            "dex",
            "+",
            "stx.b tcc__r1",
            "txa",
            "bne +",
            "brl .target",
            "+",
            "tya",
        ]);
        assert!(r26(&t, 0, &HashSet::new()).is_none());
    }
}
