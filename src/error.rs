use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid terms input: {0}")]
    InputFormat(String),

    #[error("invalid generated terms input: {0}")]
    GeneratedTermsFormat(String),

    #[error("could not derive a term prefix from url: {0}")]
    PrefixDerivation(String),

    #[error("translation request failed: {0}")]
    Remote(String),

    #[error("spreadsheet export failed: {0}")]
    Export(String),

    #[error("working set is empty, nothing to export")]
    NothingToExport,

    #[error("a translation run is already in progress")]
    RunInFlight,

    #[error("invalid transition from {from} on {event}")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },

    #[error("invalid cell edit: {0}")]
    InvalidEdit(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown command: {0}")]
    UnknownCommand(String),
}

impl CoreError {
    /// Message shown to the user; `Display` carries the technical detail.
    pub fn notice(&self) -> String {
        match self {
            CoreError::InputFormat(_) => "默认词条不是合法的JSON".to_string(),
            CoreError::GeneratedTermsFormat(_) => "生成的多语言词条不是合法的JSON".to_string(),
            CoreError::PrefixDerivation(_) => "无法从URL提取词条前缀，请检查URL格式".to_string(),
            CoreError::Remote(_) => "翻译过程中出错，请重试".to_string(),
            CoreError::Export(_) => "导出Excel失败，请重试".to_string(),
            CoreError::NothingToExport => "没有可导出的数据".to_string(),
            CoreError::RunInFlight => "翻译进行中，请稍候".to_string(),
            CoreError::InvalidTransition { .. } => "操作状态异常，请重试".to_string(),
            CoreError::InvalidEdit(msg) => format!("单元格编辑无效: {msg}"),
            CoreError::Config(msg) => format!("翻译服务配置错误: {msg}"),
            CoreError::UnknownCommand(cmd) => format!("未知指令: {cmd}"),
        }
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        CoreError::Remote(e.to_string())
    }
}

impl From<zip::result::ZipError> for CoreError {
    fn from(e: zip::result::ZipError) -> Self {
        CoreError::Export(e.to_string())
    }
}

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Export(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::InputFormat(e.to_string())
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
