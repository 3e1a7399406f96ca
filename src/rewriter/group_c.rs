//! Group C: dispatch-free rules, tried at every position after groups A
//! and B have both failed to fire (spec.md §4.4, R32-R37).

use std::collections::HashSet;

use crate::predicates::{is_control, ADC_IMM, STORE_B_PREG};

use super::{get, RuleEffect};

/// R32: a `rep #$20` immediately undone by `sep #$20` cancels out.
pub(crate) fn r32(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    if t[i] == "rep #$20" && get(t, i, 1) == "sep #$20" {
        return Some(RuleEffect::counted(2, Vec::new()));
    }
    None
}

/// R33: two consecutive 8-bit immediate pushes fused into a single
/// 16-bit stack push.
///
/// The fused operand is the literal text `"A * 256 + B"`, not a
/// numerically evaluated constant: nothing in the catalogue's grounding
/// material computes this value ahead of assembly, so the assembler is
/// left to fold it.
pub(crate) fn r33(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    if t[i] != "sep #$20" {
        return None;
    }
    let a = t.get(i + 1)?.strip_prefix("lda #")?;
    if get(t, i, 2) != "pha" {
        return None;
    }
    let b = t.get(i + 3)?.strip_prefix("lda #")?;
    if get(t, i, 4) != "pha" {
        return None;
    }

    Some(RuleEffect::counted(5, vec![format!("pea.w ({a} * 256 + {b})"), "sep #$20".to_string()]))
}

/// R34: an `adc #k` followed by a store to a pseudo-register and two
/// increments of that same pseudo-register folds the increments into the
/// addend, preserving the store.
pub(crate) fn r34(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = ADC_IMM.captures(&t[i])?;
    let k = caps.get(1)?.as_str();
    let l1 = get(t, i, 1);
    let s = STORE_B_PREG.captures(l1)?.get(1)?.as_str();
    let inc = format!("inc.b {s}");
    if get(t, i, 2) != inc || get(t, i, 3) != inc {
        return None;
    }
    Some(RuleEffect::counted(4, vec![format!("adc #{k} + 2"), l1.to_string()]))
}

/// R35: a long (`.l`) load/store of a pseudo-register-unrelated symbol
/// shortens to the word (`.w`) form when the symbol is a known `.bss`
/// declaration, since bank-relative addressing is then guaranteed.
pub(crate) fn r35(t: &[String], i: usize, bss: &HashSet<String>) -> Option<RuleEffect> {
    let line = &t[i];
    for mnemonic in ["lda.l ", "sta.l "] {
        if let Some(rest) = line.strip_prefix(mnemonic) {
            let sym = rest.split(',').next().unwrap_or(rest);
            if bss.contains(sym) {
                let narrowed = format!("{}w {}", &mnemonic[..mnemonic.len() - 2], rest);
                return Some(RuleEffect::counted(1, vec![narrowed]));
            }
        }
    }
    None
}

/// R36: an unconditional jump whose target is the very next label is
/// dead.
pub(crate) fn r36(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let line = &t[i];
    if !(line.starts_with("jmp.w ") || line.starts_with("bra ")) {
        return None;
    }
    let target = line.splitn(2, ' ').nth(1)?;
    let next = get(t, i, 1);
    if next == format!("{target}:") {
        return Some(RuleEffect::counted(1, Vec::new()));
    }
    None
}

/// R37: a long jump to a label within short-branch range becomes `bra`.
///
/// Range is not computed here (the rewriter works on text, not resolved
/// addresses); it fires whenever the target label is within
/// [`super::WINDOW`] lines, the same bound the rest of the catalogue uses
/// for "nearby".
pub(crate) fn r37(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let line = &t[i];
    let target = line.strip_prefix("jmp.w ")?;
    if target.is_empty() || is_control(target) {
        return None;
    }
    let want = format!("{target}:");
    let end = (i + super::WINDOW).min(t.len());
    for j in (i + 1)..end {
        if t[j] == want {
            return Some(RuleEffect::counted(1, vec![format!("bra {target}")]));
        }
        if t[j] == *line {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn r32_cancels_rep_sep_pair() {
        let t = lines(&["rep #$20", "sep #$20", "rts"]);
        let eff = r32(&t, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.consumed, 2);
        assert!(eff.emit.is_empty());
    }

    #[test]
    fn r33_fuses_two_byte_pushes() {
        let t = lines(&["sep #$20", "lda #1", "pha", "lda #2", "pha", "rep #$20"]);
        let eff = r33(&t, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.consumed, 5);
        assert_eq!(eff.emit, vec!["pea.w (1 * 256 + 2)".to_string(), "sep #$20".to_string()]);
    }

    #[test]
    fn r34_folds_double_increment_into_addend() {
        let t = lines(&["adc #3", "sta.b tcc__r0", "inc.b tcc__r0", "inc.b tcc__r0", "rts"]);
        let eff = r34(&t, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.consumed, 4);
        assert_eq!(eff.emit, vec!["adc #3 + 2".to_string(), "sta.b tcc__r0".to_string()]);
    }

    #[test]
    fn r34_does_not_fire_without_matching_increments() {
        let t = lines(&["adc #3", "sta.b tcc__r0", "inc.b tcc__r0", "nop"]);
        assert!(r34(&t, 0, &HashSet::new()).is_none());
    }

    #[test]
    fn r35_narrows_bss_symbol_load() {
        let mut bss = HashSet::new();
        bss.insert("counter".to_string());
        let t = lines(&["lda.l counter", "rts"]);
        let eff = r35(&t, 0, &bss).unwrap();
        assert_eq!(eff.emit, vec!["lda.w counter"]);
    }

    #[test]
    fn r35_leaves_unknown_symbol_alone() {
        let t = lines(&["lda.l unknown_symbol", "rts"]);
        assert!(r35(&t, 0, &HashSet::new()).is_none());
    }

    #[test]
    fn r36_drops_jump_to_immediately_following_label() {
        let t = lines(&["jmp.w done", "done:", "rts"]);
        let eff = r36(&t, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.consumed, 1);
        assert!(eff.emit.is_empty());
    }

    #[test]
    fn r37_shortens_nearby_jump_to_branch() {
        let mut v = vec!["jmp.w target".to_string()];
        for n in 0..5 {
            v.push(format!("nop{n}"));
        }
        v.push("target:".to_string());
        let eff = r37(&v, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.emit, vec!["bra target"]);
    }
}
