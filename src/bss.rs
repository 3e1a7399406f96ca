use std::collections::HashSet;

const BSS_OPEN: &str = r#".RAMSECTION ".bss" BANK $7e SLOT 2"#;
const BSS_CLOSE: &str = ".ENDS";

/// Scans `lines` for the `.bss` RAMSECTION block and collects the first
/// whitespace-delimited token of every declaration inside it.
///
/// Consumed in exactly one rule (R35, `a.l` -> `a.w` shortening for BSS
/// symbols).
pub fn collect_bss_names(lines: &[String]) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut in_bss = false;

    for line in lines {
        if line == BSS_OPEN {
            in_bss = true;
            continue;
        }
        if in_bss && line == BSS_CLOSE {
            in_bss = false;
            continue;
        }
        if in_bss {
            if let Some(token) = line.split_whitespace().next() {
                names.insert(token.to_string());
            }
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_names_inside_block() {
        let lines: Vec<String> = vec![
            "some_code".to_string(),
            BSS_OPEN.to_string(),
            "foo dsb 4".to_string(),
            "bar dsb 2".to_string(),
            BSS_CLOSE.to_string(),
            "more_code".to_string(),
        ];
        let names = collect_bss_names(&lines);
        assert_eq!(names.len(), 2);
        assert!(names.contains("foo"));
        assert!(names.contains("bar"));
    }

    #[test]
    fn ignores_ends_outside_bss() {
        let lines: Vec<String> = vec![BSS_CLOSE.to_string(), "nop".to_string()];
        let names = collect_bss_names(&lines);
        assert!(names.is_empty());
    }

    #[test]
    fn deterministic_regardless_of_order_of_calls() {
        let lines: Vec<String> = vec![
            BSS_OPEN.to_string(),
            "foo dsb 4".to_string(),
            BSS_CLOSE.to_string(),
        ];
        let a = collect_bss_names(&lines);
        let b = collect_bss_names(&lines);
        assert_eq!(a, b);
    }
}
