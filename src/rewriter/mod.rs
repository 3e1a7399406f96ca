//! The peephole rewriter: a single forward cursor over the trimmed input
//! with a fixed catalogue of rules tried in a fixed order at every
//! position (spec.md §4.4).

mod group_a;
mod group_b;
mod group_c;

use std::collections::HashSet;

/// Maximum lookahead used by R1; all other rules inspect a fixed prefix
/// of at most 20 lines.
pub const WINDOW: usize = 30;

/// Safety cap on the number of fixpoint passes. Real input converges in a
/// handful of passes; this bound only guards against a catalogue bug that
/// would otherwise loop forever.
const MAX_PASSES: usize = 64;

/// The effect of a rule firing: how many input lines it consumed, what it
/// emits in their place, and whether it counts toward the pass's `opted`
/// tally (R25 is a reordering step and explicitly does not count).
pub struct RuleEffect {
    pub consumed: usize,
    pub emit: Vec<String>,
    pub counts: bool,
}

impl RuleEffect {
    fn counted(consumed: usize, emit: Vec<String>) -> Self {
        Self { consumed, emit, counts: true }
    }

    fn uncounted(consumed: usize, emit: Vec<String>) -> Self {
        Self { consumed, emit, counts: false }
    }
}

type RuleFn = fn(&[String], usize, &HashSet<String>) -> Option<RuleEffect>;

struct Rule {
    #[allow(dead_code)]
    name: &'static str,
    apply: RuleFn,
}

/// Returns `t[i + k]`, or `""` if the position falls outside the window.
/// No rule antecedent is satisfied by an empty string alone (spec.md
/// §4.4 "Failure semantics"), so this can never produce a false match.
pub(crate) fn get(t: &[String], i: usize, k: usize) -> &str {
    t.get(i + k).map(|s| s.as_str()).unwrap_or("")
}

fn group_a_rules() -> &'static [Rule] {
    use group_a::*;
    &[
        Rule { name: "R1 redundant store elimination", apply: r1 },
        Rule { name: "R2 store-hw-to-preg then push-and-call", apply: r2 },
        Rule { name: "R3 store-hw-to-preg then push-preg", apply: r3 },
        Rule { name: "R4 store-hw-to-preg then reload accumulator", apply: r4 },
        Rule { name: "R5 store-A-to-preg then load-preg", apply: r5 },
        Rule { name: "R6 store-A, ldx/ldy, load-preg", apply: r6 },
        Rule { name: "R7 store-A-to-preg, push-preg, call", apply: r7 },
        Rule { name: "R8 store-A-to-preg, push-preg", apply: r8 },
        Rule { name: "R9 store-A preg1, push preg2, push preg1", apply: r9 },
        Rule { name: "R10 inc/dec through a preg", apply: r10 },
        Rule { name: "R11 propagate load-and-mask", apply: r11 },
        Rule { name: "R12 drop reload after 8-bit mode switch", apply: r12 },
        Rule { name: "R13 collapse duplicate stores", apply: r13 },
        Rule { name: "R14 store then load-into-index", apply: r14 },
        Rule { name: "R15 store then unrelated line then reload", apply: r15 },
        Rule { name: "R16 store, clc, load preg2, add preg", apply: r16 },
        Rule { name: "R17 asl through preg", apply: r17 },
        Rule { name: "R18 redundant stack reload", apply: r18 },
    ]
}

fn group_b_rules() -> &'static [Rule] {
    use group_b::*;
    &[
        Rule { name: "R19 ldx #0 / indexed load shortening", apply: r19 },
        Rule { name: "R20 fuse 32-bit literal into long store", apply: r20 },
        Rule { name: "R21 zero-store peephole", apply: r21 },
        Rule { name: "R22 8-bit narrow store", apply: r22 },
        Rule { name: "R23 dead initial load", apply: r23 },
        Rule { name: "R24 preg-high saved and restored around unrelated code", apply: r24 },
        Rule { name: "R25 reorder 32-bit copy for subsequent coalescing", apply: r25 },
        Rule { name: "R26 compare lowering (imm, beq-first)", apply: r26 },
        Rule { name: "R27 compare lowering (word imm, beq-first)", apply: r27 },
        Rule { name: "R28 compare lowering (preg operand, beq-first)", apply: r28 },
        Rule { name: "R29 compare lowering (imm, bne-first)", apply: r29 },
        Rule { name: "R30 compare lowering (word imm, bne-first)", apply: r30 },
        Rule { name: "R31 compare lowering (preg operand, bne-first)", apply: r31 },
    ]
}

fn group_c_rules() -> &'static [Rule] {
    use group_c::*;
    &[
        Rule { name: "R32 collapse rep/sep pair", apply: r32 },
        Rule { name: "R33 fuse two 8-bit literal pushes", apply: r33 },
        Rule { name: "R34 adc #k / double-inc fold", apply: r34 },
        Rule { name: "R35 a.l -> a.w for BSS symbols", apply: r35 },
        Rule { name: "R36 redundant jump-to-next-label", apply: r36 },
        Rule { name: "R37 jmp.w -> bra when in range", apply: r37 },
    ]
}

/// Runs a single left-to-right pass over `t`, returning the rewritten
/// sequence and the number of rules that fired (counted rules only).
fn run_pass(t: &[String], bss: &HashSet<String>) -> (Vec<String>, usize) {
    let mut out = Vec::with_capacity(t.len());
    let mut opted = 0;
    let mut i = 0;

    'cursor: while i < t.len() {
        let line = t[i].as_str();

        if line.starts_with("st") {
            for rule in group_a_rules() {
                if let Some(effect) = (rule.apply)(t, i, bss) {
                    log::trace!("{} fired at line {}", rule.name, i);
                    if effect.counts {
                        opted += 1;
                    }
                    out.extend(effect.emit);
                    i += effect.consumed.max(1);
                    continue 'cursor;
                }
            }
        }

        if line.starts_with("ld") {
            for rule in group_b_rules() {
                if let Some(effect) = (rule.apply)(t, i, bss) {
                    log::trace!("{} fired at line {}", rule.name, i);
                    if effect.counts {
                        opted += 1;
                    }
                    out.extend(effect.emit);
                    i += effect.consumed.max(1);
                    continue 'cursor;
                }
            }
        }

        for rule in group_c_rules() {
            if let Some(effect) = (rule.apply)(t, i, bss) {
                log::trace!("{} fired at line {}", rule.name, i);
                if effect.counts {
                    opted += 1;
                }
                out.extend(effect.emit);
                i += effect.consumed.max(1);
                continue 'cursor;
            }
        }

        out.push(t[i].clone());
        i += 1;
    }

    (out, opted)
}

/// Runs the rewriter to a fixpoint: repeat passes until a pass fires no
/// rules, or `MAX_PASSES` is reached (spec.md §4.4 "Passes and
/// fixpoint"). Returns the final line sequence and the total number of
/// rules fired across all passes.
pub fn optimize(input: &[String], bss: &HashSet<String>) -> (Vec<String>, usize) {
    let mut current = input.to_vec();
    let mut total_opted = 0;

    for pass in 0..MAX_PASSES {
        let (next, opted) = run_pass(&current, bss);
        log::debug!("pass {pass}: {opted} rule(s) fired");
        total_opted += opted;
        current = next;
        if opted == 0 {
            break;
        }
    }

    (current, total_opted)
}
