use std::collections::{HashMap, HashSet};

use crate::model::term::{Term, TranslatedTerm};

/// Merges translator output with the user's defaults and stamps each row.
///
/// Output order follows `translated`. A default with the same key replaces
/// the translated entry wholesale. Repeated keys in `translated` keep their
/// first occurrence. `prefix` is not validated here.
pub fn merge_and_stamp(defaults: &[Term], translated: &[Term], prefix: &str) -> Vec<TranslatedTerm> {
    let by_key: HashMap<&str, &Term> = defaults.iter().map(|t| (t.key.as_str(), t)).collect();

    let mut seen: HashSet<&str> = HashSet::with_capacity(translated.len());
    let mut out = Vec::with_capacity(translated.len());

    for t in translated {
        if !seen.insert(t.key.as_str()) {
            log::warn!("dropping repeated key \"{}\" from translated terms", t.key);
            continue;
        }

        let chosen = by_key.get(t.key.as_str()).copied().unwrap_or(t);
        out.push(TranslatedTerm::stamp(chosen.clone(), prefix));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(key: &str, zh: &str, en: Option<&str>) -> Term {
        Term {
            key: key.into(),
            zh_cn: zh.into(),
            zh_hk: None,
            en_us: en.map(String::from),
        }
    }

    #[test]
    fn empty_inputs_give_empty_output() {
        assert!(merge_and_stamp(&[], &[], "x").is_empty());
    }

    #[test]
    fn stamps_code_type_and_group() {
        let rows = merge_and_stamp(
            &[],
            &[term("save", "保存", Some("Save")), term("cancel", "取消", None)],
            "order_list",
        );

        for r in &rows {
            assert_eq!(r.code, format!("order_list_{}", r.term.key));
            assert!(r.code.starts_with(&format!("{}_", r.group)));
            assert_eq!(r.group, "order_list");
            assert_eq!(r.kind, "front");
        }
    }

    #[test]
    fn defaults_win_bit_for_bit() {
        let mut default = term("credit_limit_adjust", "信用额度调整", None);
        default.zh_hk = Some("信用額度調整".into());
        let translated = term("credit_limit_adjust", "信用额度", Some("Credit Limit Adjustment"));

        let rows = merge_and_stamp(&[default.clone()], &[translated], "p");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].term, default);
    }

    #[test]
    fn preserves_translated_order_and_ignores_unmatched_defaults() {
        let rows = merge_and_stamp(
            &[term("b", "默认乙", None), term("z", "未使用", None)],
            &[term("c", "丙", None), term("a", "甲", None), term("b", "乙", None)],
            "p",
        );

        let keys: Vec<&str> = rows.iter().map(|r| r.term.key.as_str()).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
        assert_eq!(rows[2].term.zh_cn, "默认乙");
    }

    #[test]
    fn repeated_translated_keys_keep_first() {
        let rows = merge_and_stamp(
            &[],
            &[term("a", "一", Some("One")), term("a", "一", Some("Uno"))],
            "p",
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].term.en_us.as_deref(), Some("One"));
    }

    #[test]
    fn restamping_own_output_is_stable() {
        let defaults = vec![term("a", "甲", None)];
        let first = merge_and_stamp(&defaults, &[term("a", "x", None), term("b", "乙", None)], "ns");

        let again_input: Vec<Term> = first.iter().map(|r| r.term.clone()).collect();
        let second = merge_and_stamp(&defaults, &again_input, "ns");

        assert_eq!(first, second);
    }
}
