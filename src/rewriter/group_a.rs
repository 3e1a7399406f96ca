//! Group A: rules dispatched when `T[i]` starts with `st` (spec.md §4.4,
//! R1-R18).

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::predicates::{changes_accu, is_control, LOAD_A_PREG, LOAD_XY, STORE_A, STORE_STACK, STORE_XY};

use super::{get, RuleEffect, WINDOW};

/// `lda\.b tcc__(r[0-9]*)$` — the narrower register-only form R16 adds to
/// its second operand.
static LOAD_A_PREG_R: Lazy<Regex> = Lazy::new(|| Regex::new(r"^lda\.b tcc__(r[0-9]*)$").unwrap());

/// True iff `line` is a store of any hardware register to `tcc__{r}`.
fn store_to_same_preg(line: &str, r: &str) -> bool {
    ["a", "x", "y", "z"]
        .iter()
        .any(|g| line == format!("st{g}.b tcc__{r}"))
}

/// R1: redundant store elimination.
pub(crate) fn r1(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = crate::predicates::STORE_AXYZ.captures(&t[i])?;
    let r = caps.get(2)?.as_str().to_string();
    let end = t.len().min(i + WINDOW);

    for tj in &t[(i + 1)..end] {
        if store_to_same_preg(tj, &r) {
            return Some(RuleEffect::counted(1, vec![]));
        }
        if tj.starts_with("jsr.l ") && !tj.starts_with("jsr.l tcc__") {
            return Some(RuleEffect::counted(1, vec![]));
        }
        if is_control(tj) || tj.contains(&format!("tcc__{r}")) {
            return None;
        }
        if let Some(r0) = r.strip_suffix('h') {
            if tj.contains(&format!("[tcc__{r0}")) {
                return None;
            }
        }
    }
    None
}

/// R2: store-hw-to-preg then push-and-call.
pub(crate) fn r2(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_XY.captures(&t[i])?;
    let rg = caps.get(1)?.as_str();
    let r = caps.get(2)?.as_str();
    if get(t, i, 1) == format!("pei (tcc__{r})") && get(t, i, 2).starts_with("jsr.l ") {
        return Some(RuleEffect::counted(2, vec![format!("ph{rg}")]));
    }
    None
}

/// R3: store-hw-to-preg then push-preg.
pub(crate) fn r3(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_XY.captures(&t[i])?;
    let rg = caps.get(1)?.as_str();
    let r = caps.get(2)?.as_str();
    if get(t, i, 1) == format!("pei (tcc__{r})") {
        return Some(RuleEffect::counted(2, vec![t[i].clone(), format!("ph{rg}")]));
    }
    None
}

/// R4: store-hw-to-preg then reload to accumulator.
pub(crate) fn r4(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_XY.captures(&t[i])?;
    let rg = caps.get(1)?.as_str();
    let r = caps.get(2)?.as_str();
    let plain = format!("lda.b tcc__{r}");
    let annotated = format!("{plain} ; DON'T OPTIMIZE");
    let next = get(t, i, 1);
    if next == plain || next == annotated {
        return Some(RuleEffect::counted(2, vec![t[i].clone(), format!("t{rg}a")]));
    }
    None
}

/// R5: store-A-to-preg then load-preg.
pub(crate) fn r5(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();
    if get(t, i, 1) == format!("lda.b tcc__{r}") {
        return Some(RuleEffect::counted(2, vec![t[i].clone()]));
    }
    None
}

/// R6: store-A, ldx/ldy, load-preg.
pub(crate) fn r6(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();
    let l1 = get(t, i, 1);
    if (l1.starts_with("ldx") || l1.starts_with("ldy")) && get(t, i, 2) == format!("lda.b tcc__{r}") {
        return Some(RuleEffect::counted(3, vec![t[i].clone(), t[i + 1].clone()]));
    }
    None
}

/// R7: store-A-to-preg, push-preg, call.
pub(crate) fn r7(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();
    if get(t, i, 1) == format!("pei (tcc__{r})") && get(t, i, 2).starts_with("jsr.l ") {
        return Some(RuleEffect::counted(2, vec!["pha".to_string()]));
    }
    None
}

/// R8: store-A-to-preg, push-preg.
pub(crate) fn r8(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();
    if get(t, i, 1) == format!("pei (tcc__{r})") {
        return Some(RuleEffect::counted(2, vec![t[i].clone(), "pha".to_string()]));
    }
    None
}

/// R9: store-A preg1, push preg2, push preg1.
pub(crate) fn r9(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();
    let l1 = get(t, i, 1);
    if l1.starts_with("pei ") && get(t, i, 2) == format!("pei (tcc__{r})") {
        return Some(RuleEffect::counted(3, vec![t[i + 1].clone(), t[i].clone(), "pha".to_string()]));
    }
    None
}

/// R10: inc/dec through a preg.
pub(crate) fn r10(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();

    for op in ["inc", "dec"] {
        let op_line = format!("{op}.b tcc__{r}");
        if get(t, i, 1) != op_line {
            continue;
        }
        let reload = format!("lda.b tcc__{r}");

        if get(t, i, 2) == op_line && get(t, i, 3).starts_with("lda") {
            let consumed = if get(t, i, 3) == reload { 4 } else { 3 };
            return Some(RuleEffect::counted(
                consumed,
                vec![format!("{op} a"), format!("{op} a"), format!("sta.b tcc__{r}")],
            ));
        }
        if get(t, i, 2).starts_with("lda") {
            let consumed = if get(t, i, 2) == reload { 3 } else { 2 };
            return Some(RuleEffect::counted(consumed, vec![format!("{op} a"), format!("sta.b tcc__{r}")]));
        }
    }
    None
}

/// R11: propagate load-and-mask.
pub(crate) fn r11(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();
    let l1 = get(t, i, 1);
    let r2 = LOAD_A_PREG.captures(l1)?.get(1)?.as_str().to_string();
    let l2 = get(t, i, 2);
    if l2.len() < 3 {
        return None;
    }
    let op = &l2[..3];
    if (op == "and" || op == "ora") && l2.ends_with(&format!(".b tcc__{r}")) {
        return Some(RuleEffect::counted(3, vec![t[i].clone(), format!("{op}.b tcc__{r2}")]));
    }
    None
}

/// R12: drop reload after 8-bit mode switch.
pub(crate) fn r12(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();
    if get(t, i, 1) == "sep #$20" && get(t, i, 2) == format!("lda.b tcc__{r}") {
        return Some(RuleEffect::counted(3, vec![t[i].clone(), t[i + 1].clone()]));
    }
    None
}

/// R13: collapse duplicate stores.
pub(crate) fn r13(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();
    let l1 = get(t, i, 1);
    if !is_control(l1) && !l1.contains(&format!("tcc__{r}")) && get(t, i, 2) == t[i] {
        return Some(RuleEffect::counted(3, vec![t[i + 1].clone(), t[i + 2].clone()]));
    }
    None
}

/// R14: store then load-into-index.
pub(crate) fn r14(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();
    let l1 = get(t, i, 1);
    let caps2 = LOAD_XY.captures(l1)?;
    if caps2.get(2)?.as_str() != r {
        return None;
    }
    let ig = caps2.get(1)?.as_str();
    Some(RuleEffect::counted(2, vec![t[i].clone(), format!("ta{ig}")]))
}

/// R15: store then unrelated line then reload.
pub(crate) fn r15(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();
    let l1 = get(t, i, 1);
    if !is_control(l1)
        && !changes_accu(l1)
        && !l1.contains(&format!("tcc__{r}"))
        && get(t, i, 2) == format!("lda.b tcc__{r}")
    {
        return Some(RuleEffect::counted(3, vec![t[i].clone(), t[i + 1].clone()]));
    }
    None
}

/// R16: store, clc, load preg2, add preg.
pub(crate) fn r16(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();
    if get(t, i, 1) != "clc" {
        return None;
    }
    let r2 = LOAD_A_PREG_R.captures(get(t, i, 2))?.get(1)?.as_str().to_string();
    if get(t, i, 3) == format!("adc.b tcc__{r}") {
        return Some(RuleEffect::counted(
            4,
            vec![t[i].clone(), "clc".to_string(), format!("adc.b tcc__{r2}")],
        ));
    }
    None
}

/// R17: asl through preg.
pub(crate) fn r17(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_A.captures(&t[i])?;
    let r = caps.get(1)?.as_str();
    if get(t, i, 1) == format!("asl.b tcc__{r}") {
        return Some(RuleEffect::counted(2, vec!["asl a".to_string(), t[i].clone()]));
    }
    None
}

/// R18: redundant stack reload.
pub(crate) fn r18(t: &[String], i: usize, _bss: &HashSet<String>) -> Option<RuleEffect> {
    let caps = STORE_STACK.captures(&t[i])?;
    let loc = caps.get(1)?.as_str();
    if get(t, i, 1) == format!("lda {loc},s") {
        return Some(RuleEffect::counted(2, vec![t[i].clone()]));
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
    fn r1_fires_on_dead_store_within_window() {
        let t = lines(&["sta.b tcc__r0", "nop", "stx.b tcc__r0"]);
        let eff = r1(&t, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.consumed, 1);
        assert!(eff.emit.is_empty());
    }

    #[test]
    fn r1_does_not_fire_across_a_use() {
        let t = lines(&["sta.b tcc__r0", "lda.b tcc__r0", "stx.b tcc__r0"]);
        assert!(r1(&t, 0, &HashSet::new()).is_none());
    }

    #[test]
    fn r1_does_not_fire_across_control_flow() {
        let t = lines(&["sta.b tcc__r0", "loop:", "stx.b tcc__r0"]);
        assert!(r1(&t, 0, &HashSet::new()).is_none());
    }

    #[test]
    fn r9_reorders_two_pushes() {
        let t = lines(&["sta.b tcc__r0", "pei (tcc__r1)", "pei (tcc__r0)"]);
        let eff = r9(&t, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.emit, vec!["pei (tcc__r1)", "sta.b tcc__r0", "pha"]);
    }

    #[test]
    fn r10_folds_double_increment() {
        let t = lines(&["sta.b tcc__r0", "inc.b tcc__r0", "inc.b tcc__r0", "lda.b tcc__r0"]);
        let eff = r10(&t, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.consumed, 4);
        assert_eq!(eff.emit, vec!["inc a", "inc a", "sta.b tcc__r0"]);
    }

    #[test]
    fn r17_hoists_shift_onto_accumulator() {
        let t = lines(&["sta.b tcc__r0", "asl.b tcc__r0"]);
        let eff = r17(&t, 0, &HashSet::new()).unwrap();
        assert_eq!(eff.emit, vec!["asl a", "sta.b tcc__r0"]);
    }
}
