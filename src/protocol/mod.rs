use std::path::PathBuf;

use serde_json::{json, Value};

use crate::config::TranslatorConfig;
use crate::error::{CoreError, Result};
use crate::model::term::{EditableColumn, Term};
use crate::parsers;
use crate::services::ai::{ChatTranslator, Translator};
use crate::services::export::DEFAULT_FILE_NAME;
use crate::services::pipeline::RunRequest;
use crate::services::session::{Session, TermGrid};
use crate::services::{merge, prefix};

mod command;
use command::Command;

type Connect = Box<dyn Fn(TranslatorConfig) -> Result<Box<dyn Translator>>>;

fn get_cmd(req: &Value) -> &str {
    req.get("cmd").and_then(|v| v.as_str()).unwrap_or("")
}

fn get_id(req: &Value) -> Value {
    req.get("id").cloned().unwrap_or(Value::Null)
}

fn get_payload(req: &Value) -> &Value {
    static EMPTY: Value = Value::Null;
    req.get("payload").unwrap_or(&EMPTY)
}

fn get_str<'a>(payload: &'a Value, field: &str) -> &'a str {
    payload.get(field).and_then(|v| v.as_str()).unwrap_or("")
}

fn ok(id: Value, payload: Value) -> String {
    json!({
        "id": id,
        "status": "ok",
        "payload": payload
    })
    .to_string()
}

fn err(id: Value, e: &CoreError) -> String {
    json!({
        "id": id,
        "status": "error",
        "message": e.to_string(),
        "notice": e.notice()
    })
    .to_string()
}

fn terms_from_payload(payload: &Value, field: &str) -> Result<Vec<Term>> {
    let arr = payload
        .get(field)
        .and_then(|v| v.as_array())
        .ok_or_else(|| CoreError::InputFormat(format!("payload.{field} must be an array")))?;

    let mut terms: Vec<Term> = Vec::with_capacity(arr.len());
    for (i, v) in arr.iter().cloned().enumerate() {
        match serde_json::from_value::<Term>(v) {
            Ok(t) => terms.push(t),
            Err(e) => {
                return Err(CoreError::InputFormat(format!(
                    "invalid {field} entry at index {i}: {e}"
                )))
            }
        }
    }

    Ok(terms)
}

/// Line protocol front for one session. Each request is a JSON object
/// `{ "id", "cmd", "payload" }`; each response carries the same `id`.
pub struct Core {
    session: Session,
    connect: Connect,
}

impl Default for Core {
    fn default() -> Self {
        Self::new()
    }
}

impl Core {
    pub fn new() -> Self {
        Self::with_connector(Box::new(|cfg: TranslatorConfig| -> Result<Box<dyn Translator>> {
            let t: Box<dyn Translator> = Box::new(ChatTranslator::new(cfg)?);
            Ok(t)
        }))
    }

    pub fn with_connector(connect: Connect) -> Self {
        Core {
            session: Session::new(),
            connect,
        }
    }

    pub fn handle(&mut self, input: &str) -> String {
        let req: Value = match serde_json::from_str(input) {
            Ok(v) => v,
            Err(_) => {
                return json!({
                    "status": "error",
                    "message": "invalid json"
                })
                .to_string();
            }
        };

        let id = get_id(&req);
        let cmd_str = get_cmd(&req);
        let payload = get_payload(&req);

        match self.dispatch(cmd_str, payload) {
            Ok(v) => ok(id, v),
            Err(e) => err(id, &e),
        }
    }

    fn dispatch(&mut self, cmd_str: &str, payload: &Value) -> Result<Value> {
        match Command::from(cmd_str) {
            Command::Ping => Ok(json!({ "message": "term-core alive" })),

            Command::PrefixExtract => {
                let prefix = prefix::extract_term_prefix(get_str(payload, "url"));
                Ok(json!({ "prefix": prefix }))
            }

            Command::TermsParse => {
                let terms = parsers::terms::parse(get_str(payload, "text"))?;
                Ok(json!({ "terms": terms }))
            }

            Command::TermsTranslate => self.translate(payload),

            Command::TermsMerge => {
                let defaults = terms_from_payload(payload, "default_terms")?;
                let translated = terms_from_payload(payload, "translated_terms")?;
                let prefix = get_str(payload, "prefix");
                if prefix.is_empty() {
                    return Err(CoreError::PrefixDerivation("payload.prefix is empty".into()));
                }
                let rows = merge::merge_and_stamp(&defaults, &translated, prefix);
                Ok(json!({ "rows": rows }))
            }

            Command::GridRows => Ok(json!({
                "rows": self.session.render_rows(),
                "state": self.session.state()
            })),

            Command::GridEdit => {
                let row = payload
                    .get("row")
                    .and_then(|v| v.as_u64())
                    .ok_or_else(|| CoreError::InvalidEdit("payload.row is required".into()))?
                    as usize;
                let column_name = get_str(payload, "column");
                let column = EditableColumn::parse(column_name).ok_or_else(|| {
                    CoreError::InvalidEdit(format!("column \"{column_name}\" is not editable"))
                })?;
                let value = get_str(payload, "value").to_string();

                self.session.on_cell_edited(row, column, value)?;
                Ok(json!({ "row": self.session.render_rows().get(row) }))
            }

            Command::GridExport => {
                let mut path = match get_str(payload, "path") {
                    "" => PathBuf::from(DEFAULT_FILE_NAME),
                    p => PathBuf::from(p),
                };
                if path.is_dir() {
                    path = path.join(DEFAULT_FILE_NAME);
                }

                let summary = self.session.trigger_export(&path)?;
                Ok(json!({
                    "path": summary.path,
                    "rows": summary.rows,
                    "notice": "Excel导出成功"
                }))
            }

            Command::SessionState => Ok(json!({ "state": self.session.state() })),

            Command::Unknown => Err(CoreError::UnknownCommand(cmd_str.to_string())),
        }
    }

    /// Called after a panic so an interrupted run does not block the session.
    pub fn recover(&mut self) {
        self.session.abort("internal core error");
    }

    fn translate(&mut self, payload: &Value) -> Result<Value> {
        let req: RunRequest = serde_json::from_value(payload.clone())?;
        let connect = &self.connect;

        let summary = self
            .session
            .submit_with(&req, || connect(TranslatorConfig::from_payload(payload)?))?;
        Ok(json!({
            "prefix": summary.prefix,
            "count": summary.count,
            "rows": self.session.render_rows(),
            "notice": format!("成功翻译 {} 个词条", summary.count)
        }))
    }
}
