use serde::{Deserialize, Serialize};

/// The JSON object the model is asked to answer with.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ModelReply {
    #[serde(default, rename = "en_US", alias = "en", alias = "english")]
    pub en_us: Option<String>,

    #[serde(default, rename = "zh_HK", alias = "zh_TW", alias = "traditional")]
    pub zh_hk: Option<String>,
}
