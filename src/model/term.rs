use serde::{Deserialize, Serialize};

/// Fixed classification tag stamped on every processed term.
pub const TERM_TYPE_FRONT: &str = "front";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Term {
    pub key: String,

    #[serde(default, rename = "zh_CN")]
    pub zh_cn: String,

    #[serde(default, rename = "zh_HK", skip_serializing_if = "Option::is_none")]
    pub zh_hk: Option<String>,

    #[serde(default, rename = "en_US", skip_serializing_if = "Option::is_none")]
    pub en_us: Option<String>,
}

impl Term {
    pub fn new(key: impl Into<String>, zh_cn: impl Into<String>) -> Self {
        Term {
            key: key.into(),
            zh_cn: zh_cn.into(),
            zh_hk: None,
            en_us: None,
        }
    }
}

/// A term stamped with its namespace. `code` is always `{group}_{key}` when
/// produced by a run; only grid edits may break that afterwards.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TranslatedTerm {
    #[serde(flatten)]
    pub term: Term,

    pub code: String,

    #[serde(rename = "type")]
    pub kind: String,

    pub group: String,
}

impl TranslatedTerm {
    pub fn stamp(term: Term, prefix: &str) -> Self {
        TranslatedTerm {
            code: format!("{}_{}", prefix, term.key),
            kind: TERM_TYPE_FRONT.to_string(),
            group: prefix.to_string(),
            term,
        }
    }
}

/// Columns the grid is allowed to edit in place.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum EditableColumn {
    #[serde(rename = "code")]
    Code,
    #[serde(rename = "type")]
    Type,
    #[serde(rename = "group")]
    Group,
    #[serde(rename = "zh_CN")]
    ZhCn,
    #[serde(rename = "zh_HK")]
    ZhHk,
    #[serde(rename = "en_US")]
    EnUs,
}

impl EditableColumn {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "code" => Some(EditableColumn::Code),
            "type" => Some(EditableColumn::Type),
            "group" => Some(EditableColumn::Group),
            "zh_CN" => Some(EditableColumn::ZhCn),
            "zh_HK" => Some(EditableColumn::ZhHk),
            "en_US" => Some(EditableColumn::EnUs),
            _ => None,
        }
    }
}
