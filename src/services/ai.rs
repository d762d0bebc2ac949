use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::config::TranslatorConfig;
use crate::error::{CoreError, Result};
use crate::model::term::Term;
use crate::services::ai_types::ModelReply;

const SYSTEM_PROMPT: &str = "你是金融/贸易领域资深翻译官，请把中文精准翻译成英文（直译，不做任何解释），\
同时给出对应的繁体中文（香港）写法。仅返回一个JSON对象，格式为 {\"en_US\": \"英文译文\", \"zh_HK\": \"繁體中文\"}。";

const ERROR_SNIPPET_CHARS: usize = 400;

/// Translates one term per call. A failure is terminal for the term.
pub trait Translator {
    fn translate(&self, term: &Term) -> Result<Term>;

    /// Sequential, stops at the first failure.
    fn translate_all(&self, terms: &[Term]) -> Result<Vec<Term>> {
        let mut out = Vec::with_capacity(terms.len());
        for t in terms {
            out.push(self.translate(t)?);
        }
        Ok(out)
    }
}

fn endpoint_for(provider: &str) -> Result<&'static str> {
    match provider {
        "moonshot" | "kimi" => Ok("https://api.moonshot.cn/v1/chat/completions"),
        "openai" => Ok("https://api.openai.com/v1/chat/completions"),
        "deepseek" => Ok("https://api.deepseek.com/v1/chat/completions"),
        other => Err(CoreError::Config(format!("unsupported provider: {other}"))),
    }
}

/// Chat completions backed translator.
pub struct ChatTranslator {
    client: Client,
    endpoint: String,
    cfg: TranslatorConfig,
}

impl ChatTranslator {
    pub fn new(cfg: TranslatorConfig) -> Result<Self> {
        let cfg = cfg.resolve()?;

        let endpoint = match cfg.endpoint.as_deref().map(str::trim) {
            Some(e) if !e.is_empty() => e.to_string(),
            _ => endpoint_for(&cfg.provider)?.to_string(),
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| CoreError::Config(e.to_string()))?;

        Ok(ChatTranslator {
            client,
            endpoint,
            cfg,
        })
    }
}

impl Translator for ChatTranslator {
    fn translate(&self, term: &Term) -> Result<Term> {
        log::debug!("translating \"{}\" via {}", term.key, self.endpoint);

        let body = build_body(&self.cfg, term);

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.cfg.api_key)
            .json(&body)
            .send()?;

        let status = resp.status();
        // Read as text first so an error body survives a JSON failure.
        let text = resp.text()?;

        if !status.is_success() {
            let msg = extract_error_message(status, &text);
            log::warn!("translation of \"{}\" failed: {}", term.key, msg);
            return Err(CoreError::Remote(msg));
        }

        let v: Value = serde_json::from_str(&text)
            .map_err(|_| CoreError::Remote("invalid JSON from chat completions".into()))?;

        let content = v
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .ok_or_else(|| {
                CoreError::Remote("invalid AI response: missing choices[0].message.content".into())
            })?;

        apply_reply(term, content)
    }
}

fn build_body(cfg: &TranslatorConfig, term: &Term) -> Value {
    json!({
        "model": cfg.model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            { "role": "user", "content": term.zh_cn.trim() }
        ],
        "temperature": cfg.temperature
    })
}

fn code_fence() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").expect("valid fence regex"))
}

/// Reads the model answer. A JSON object fills `en_US`/`zh_HK`; any other
/// text is taken verbatim as the English translation.
fn parse_reply(content: &str) -> ModelReply {
    let trimmed = content.trim();
    let inner = code_fence()
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    match serde_json::from_str::<Value>(inner) {
        Ok(v @ Value::Object(_)) => serde_json::from_value(v).unwrap_or_default(),
        Ok(Value::String(s)) => ModelReply {
            en_us: Some(s),
            zh_hk: None,
        },
        _ => ModelReply {
            en_us: Some(trimmed.to_string()),
            zh_hk: None,
        },
    }
}

fn apply_reply(source: &Term, content: &str) -> Result<Term> {
    let reply = parse_reply(content);

    let en_us = reply
        .en_us
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| CoreError::Remote(format!("empty translation for \"{}\"", source.key)))?;

    let zh_hk = reply
        .zh_hk
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .or_else(|| source.zh_hk.clone());

    Ok(Term {
        key: source.key.clone(),
        zh_cn: source.zh_cn.clone(),
        zh_hk,
        en_us: Some(en_us),
    })
}

fn extract_error_message(status: StatusCode, body_text: &str) -> String {
    // { "error": { "message": "..." } } or { "message": "..." }
    if let Ok(v) = serde_json::from_str::<Value>(body_text) {
        if let Some(msg) = v
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
        if let Some(msg) = v.get("message").and_then(|m| m.as_str()) {
            return format!("HTTP {}: {}", status.as_u16(), msg);
        }
    }

    let trimmed = body_text.trim();
    let snippet = if trimmed.chars().count() > ERROR_SNIPPET_CHARS {
        let cut: String = trimmed.chars().take(ERROR_SNIPPET_CHARS).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    };

    format!("HTTP {}: {}", status.as_u16(), snippet)
}
