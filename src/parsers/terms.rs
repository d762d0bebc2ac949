use serde_json::{Map, Value};

use crate::error::{CoreError, Result};
use crate::model::term::Term;

/// Parses user supplied term text. Only strict JSON is accepted:
/// - an array of term objects
/// - a single term object (has a `key` field)
/// - a flat `{ "key": "中文" }` map
///
/// Repeated keys collapse onto the first position, with the last value kept.
pub fn parse(text: &str) -> Result<Vec<Term>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InputFormat("input is empty".into()));
    }

    let value: Value = serde_json::from_str(trimmed)?;

    let terms = match value {
        Value::Array(items) => parse_array(items)?,
        Value::Object(map) if map.contains_key("key") => {
            vec![term_from_value(Value::Object(map), 0)?]
        }
        Value::Object(map) => parse_flat_map(map)?,
        other => {
            return Err(CoreError::InputFormat(format!(
                "expected an array or object, got {}",
                type_name(&other)
            )))
        }
    };

    Ok(dedup_by_key(terms))
}

fn parse_array(items: Vec<Value>) -> Result<Vec<Term>> {
    let mut terms = Vec::with_capacity(items.len());
    for (i, v) in items.into_iter().enumerate() {
        terms.push(term_from_value(v, i)?);
    }
    Ok(terms)
}

fn parse_flat_map(map: Map<String, Value>) -> Result<Vec<Term>> {
    let mut terms = Vec::with_capacity(map.len());
    for (key, v) in map {
        match v {
            Value::String(zh) => terms.push(Term::new(key, zh)),
            other => {
                return Err(CoreError::InputFormat(format!(
                    "value for \"{key}\" must be a string, got {}",
                    type_name(&other)
                )))
            }
        }
    }
    Ok(terms)
}

fn term_from_value(v: Value, index: usize) -> Result<Term> {
    let term: Term = serde_json::from_value(v)
        .map_err(|e| CoreError::InputFormat(format!("invalid term at index {index}: {e}")))?;

    if term.key.trim().is_empty() {
        return Err(CoreError::InputFormat(format!(
            "term at index {index} has an empty key"
        )));
    }

    Ok(term)
}

fn dedup_by_key(terms: Vec<Term>) -> Vec<Term> {
    let mut out: Vec<Term> = Vec::with_capacity(terms.len());
    for t in terms {
        match out.iter_mut().find(|e| e.key == t.key) {
            Some(existing) => *existing = t,
            None => out.push(t),
        }
    }
    out
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_of_terms() {
        let terms = parse(
            r#"[{"key":"credit_limit_adjust","zh_CN":"信用额度调整"},
                {"key":"save","zh_CN":"保存","en_US":"Save"}]"#,
        )
        .unwrap();

        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0], Term::new("credit_limit_adjust", "信用额度调整"));
        assert_eq!(terms[1].en_us.as_deref(), Some("Save"));
    }

    #[test]
    fn parses_single_term_object() {
        let terms = parse(r#"{"key":"save","zh_CN":"保存","zh_HK":"保存"}"#).unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].zh_hk.as_deref(), Some("保存"));
    }

    #[test]
    fn parses_flat_map_in_document_order() {
        let terms = parse(r#"{"zeta":"最后","alpha":"第一"}"#).unwrap();
        let keys: Vec<&str> = terms.iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
        assert_eq!(terms[1].zh_cn, "第一");
    }

    #[test]
    fn rejects_js_like_input() {
        let err = parse(r#"{credit_limit_adjust:"信用额度调整"}"#).unwrap_err();
        assert!(matches!(err, CoreError::InputFormat(_)));
    }

    #[test]
    fn rejects_blank_and_scalar_input() {
        assert!(matches!(parse("   "), Err(CoreError::InputFormat(_))));
        assert!(matches!(parse("42"), Err(CoreError::InputFormat(_))));
        assert!(matches!(parse(r#"{"a": 1}"#), Err(CoreError::InputFormat(_))));
    }

    #[test]
    fn rejects_term_without_key() {
        let err = parse(r#"[{"zh_CN":"保存"}]"#).unwrap_err();
        assert!(err.to_string().contains("index 0"));

        let err = parse(r#"[{"key":"  ","zh_CN":"保存"}]"#).unwrap_err();
        assert!(err.to_string().contains("empty key"));
    }

    #[test]
    fn repeated_keys_keep_first_position_last_value() {
        let terms = parse(
            r#"[{"key":"a","zh_CN":"一"},{"key":"b","zh_CN":"二"},{"key":"a","zh_CN":"三"}]"#,
        )
        .unwrap();

        assert_eq!(terms.len(), 2);
        assert_eq!(terms[0].key, "a");
        assert_eq!(terms[0].zh_cn, "三");
        assert_eq!(terms[1].key, "b");
    }
}
