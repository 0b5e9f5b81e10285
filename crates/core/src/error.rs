use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShiftError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("loading {}: {}", .path.display(), .message)]
    Load { path: PathBuf, message: String },
    #[error("rule error: {0}")]
    Rule(String),
    #[error("apply failed: {0}")]
    Apply(String),
    #[error("vendoring failed: {0}")]
    Vendor(String),
}

pub type Result<T> = std::result::Result<T, ShiftError>;
