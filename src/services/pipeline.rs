use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::model::term::{Term, TranslatedTerm};
use crate::parsers;
use crate::services::{ai::Translator, merge, prefix};

/// Raw form input for one run.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RunRequest {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub default_terms: String,

    /// Optional upstream term list to translate instead of the defaults.
    #[serde(default)]
    pub generated_terms: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RunOutcome {
    pub prefix: String,
    pub translated: usize,
    pub rows: Vec<TranslatedTerm>,
}

/// Validated input of a run, ready to be sent to a translator.
#[derive(Debug)]
pub struct Prepared {
    pub prefix: String,
    pub defaults: Vec<Term>,
    pub source: Vec<Term>,
}

/// Derives the prefix and parses both term fields. Nothing here touches the network.
pub fn prepare(req: &RunRequest) -> Result<Prepared> {
    let prefix = prefix::extract_term_prefix(&req.url);
    if prefix.is_empty() {
        return Err(CoreError::PrefixDerivation(req.url.clone()));
    }

    let defaults = parsers::terms::parse(&req.default_terms)?;

    let source: Vec<Term> = match req.generated_terms.as_deref() {
        Some(text) if !text.trim().is_empty() => {
            parsers::terms::parse(text).map_err(|e| match e {
                CoreError::InputFormat(msg) => CoreError::GeneratedTermsFormat(msg),
                other => other,
            })?
        }
        _ => defaults.clone(),
    };

    Ok(Prepared {
        prefix,
        defaults,
        source,
    })
}

pub fn execute(prepared: Prepared, translator: &dyn Translator) -> Result<RunOutcome> {
    let Prepared {
        prefix,
        defaults,
        source,
    } = prepared;

    log::info!("translating {} term(s) under prefix {}", source.len(), prefix);

    let translated = translator.translate_all(&source)?;
    let rows = merge::merge_and_stamp(&defaults, &translated, &prefix);

    Ok(RunOutcome {
        prefix,
        translated: translated.len(),
        rows,
    })
}

#[cfg(test)]
pub fn run(req: &RunRequest, translator: &dyn Translator) -> Result<RunOutcome> {
    execute(prepare(req)?, translator)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Answers with a fixed English text per key and records what it was asked.
    pub(crate) struct StubTranslator {
        pub answers: Vec<(&'static str, &'static str)>,
        pub seen: RefCell<Vec<String>>,
    }

    impl StubTranslator {
        pub(crate) fn new(answers: Vec<(&'static str, &'static str)>) -> Self {
            StubTranslator {
                answers,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Translator for StubTranslator {
        fn translate(&self, term: &Term) -> Result<Term> {
            self.seen.borrow_mut().push(term.key.clone());
            let en = self
                .answers
                .iter()
                .find(|(k, _)| *k == term.key)
                .map(|(_, en)| en.to_string())
                .ok_or_else(|| CoreError::Remote(format!("no answer for {}", term.key)))?;

            Ok(Term {
                key: term.key.clone(),
                zh_cn: format!("{}(译)", term.zh_cn),
                zh_hk: None,
                en_us: Some(en),
            })
        }
    }

    fn request(url: &str, defaults: &str) -> RunRequest {
        RunRequest {
            url: url.into(),
            default_terms: defaults.into(),
            generated_terms: None,
        }
    }

    #[test]
    fn end_to_end_defaults_win() {
        let stub = StubTranslator::new(vec![("credit_limit_adjust", "Credit Limit Adjustment")]);
        let req = request(
            "http://localhost:9999/#/lc-credit-limit-adjust-detail?id=LCA1",
            r#"[{"key":"credit_limit_adjust","zh_CN":"信用额度调整"}]"#,
        );

        let out = run(&req, &stub).unwrap();
        assert_eq!(out.prefix, "lc_credit_limit_adjust_detail");
        assert_eq!(out.rows.len(), 1);

        let row = &out.rows[0];
        assert_eq!(row.code, "lc_credit_limit_adjust_detail_credit_limit_adjust");
        assert_eq!(row.group, "lc_credit_limit_adjust_detail");
        assert_eq!(row.kind, "front");
        assert_eq!(row.term, Term::new("credit_limit_adjust", "信用额度调整"));
    }

    #[test]
    fn missing_fragment_aborts_before_translating() {
        let stub = StubTranslator::new(vec![]);
        let err = run(&request("http://localhost/orders", r#"{"a":"甲"}"#), &stub).unwrap_err();

        assert!(matches!(err, CoreError::PrefixDerivation(_)));
        assert!(stub.seen.borrow().is_empty());
    }

    #[test]
    fn bad_defaults_abort_before_translating() {
        let stub = StubTranslator::new(vec![]);
        let err = run(&request("http://h/#/a", "{a:'甲'}"), &stub).unwrap_err();

        assert!(matches!(err, CoreError::InputFormat(_)));
        assert!(stub.seen.borrow().is_empty());
    }

    #[test]
    fn generated_terms_are_translated_instead_of_defaults() {
        let stub = StubTranslator::new(vec![("save", "Save"), ("cancel", "Cancel")]);
        let req = RunRequest {
            url: "http://h/#/order/list".into(),
            default_terms: r#"{"save":"保存"}"#.into(),
            generated_terms: Some(r#"{"cancel":"取消","save":"存"}"#.into()),
        };

        let out = run(&req, &stub).unwrap();
        assert_eq!(*stub.seen.borrow(), vec!["cancel".to_string(), "save".to_string()]);

        let keys: Vec<&str> = out.rows.iter().map(|r| r.term.key.as_str()).collect();
        assert_eq!(keys, vec!["cancel", "save"]);
        assert_eq!(out.rows[0].term.en_us.as_deref(), Some("Cancel"));
        assert_eq!(out.rows[1].term, Term::new("save", "保存"));
    }

    #[test]
    fn blank_generated_terms_fall_back_to_defaults() {
        let stub = StubTranslator::new(vec![("save", "Save")]);
        let req = RunRequest {
            url: "http://h/#/order".into(),
            default_terms: r#"{"save":"保存"}"#.into(),
            generated_terms: Some("  ".into()),
        };

        assert_eq!(run(&req, &stub).unwrap().translated, 1);
    }

    #[test]
    fn remote_failure_fails_whole_run() {
        let stub = StubTranslator::new(vec![("a", "A")]);
        let err = run(&request("http://h/#/x", r#"{"a":"甲","b":"乙"}"#), &stub).unwrap_err();
        assert!(matches!(err, CoreError::Remote(_)));
    }

    #[test]
    fn bad_generated_terms_name_their_own_field() {
        let stub = StubTranslator::new(vec![]);
        let req = RunRequest {
            url: "http://h/#/order".into(),
            default_terms: r#"{"save":"保存"}"#.into(),
            generated_terms: Some("[{\"key\":".into()),
        };

        let err = run(&req, &stub).unwrap_err();
        assert!(matches!(err, CoreError::GeneratedTermsFormat(_)));
        assert_eq!(err.notice(), "生成的多语言词条不是合法的JSON");
        assert!(stub.seen.borrow().is_empty());
    }

    #[test]
    fn prepare_validates_without_a_translator() {
        let p = prepare(&request("http://h/#/order/list", r#"{"save":"保存"}"#)).unwrap();
        assert_eq!(p.prefix, "order_list");
        assert_eq!(p.source, p.defaults);

        assert!(matches!(
            prepare(&request("http://h/order", r#"{"save":"保存"}"#)),
            Err(CoreError::PrefixDerivation(_))
        ));
    }
}
