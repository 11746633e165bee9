use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of `POST /generate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub model_choice: ModelChoice,
    #[serde(default)]
    pub use_grounding: bool,
    #[serde(default)]
    pub system_instruction: Option<String>,
}

/// Provider requested by the caller.
///
/// Unknown values are kept rather than rejected; they resolve to the local
/// fallback instead of a client error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelChoice {
    Primary,
    #[default]
    Secondary,
    Unrecognized(String),
}

impl ModelChoice {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "primary" | "openai" => ModelChoice::Primary,
            "secondary" | "gemini" => ModelChoice::Secondary,
            _ => ModelChoice::Unrecognized(value.to_string()),
        }
    }

    pub fn kind(&self) -> Option<ModelKind> {
        match self {
            ModelChoice::Primary => Some(ModelKind::Primary),
            ModelChoice::Secondary => Some(ModelKind::Secondary),
            ModelChoice::Unrecognized(_) => None,
        }
    }
}

impl<'de> Deserialize<'de> for ModelChoice {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.map(|v| ModelChoice::parse(&v)).unwrap_or_default())
    }
}

/// Model that actually produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Primary,
    Secondary,
    Local,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Primary => "primary",
            ModelKind::Secondary => "secondary",
            ModelKind::Local => "local",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A web citation attached by a grounded provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// Body of a successful `POST /generate`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateResult {
    pub result: String,
    pub model: ModelKind,
    pub sources: Vec<Source>,
}
