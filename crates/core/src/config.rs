//! Migration configuration: the YAML document that declares what to rewrite.

use crate::error::{Result, ShiftError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_CANDIDATES: [&str; 4] = [
    ".protoshift.yaml",
    ".protoshift.yml",
    "protoshift.yaml",
    "protoshift.yml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory the schema tree is read from.
    pub source: PathBuf,
    /// Root directory rewritten files are committed under.
    pub target: PathBuf,
    /// Glob patterns for files to leave out of the catalog.
    #[serde(default)]
    pub excludes: Vec<String>,
    /// Rewrite rules, applied in order.
    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConfig {
    pub kind: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pattern: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub replace: String,
}

impl Config {
    /// Load a config from `path`, or auto-detect one when `path` is `None`
    /// by checking the working directory and then each ancestor.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => find_config_file().ok_or_else(|| {
                ShiftError::Config("no config file found (looked for protoshift.yaml)".to_string())
            })?,
        };
        let text = std::fs::read_to_string(&path)?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Config> {
        let config: Config = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.source.as_os_str().is_empty() {
            return Err(ShiftError::Config("source directory is required".to_string()));
        }
        if self.target.as_os_str().is_empty() {
            return Err(ShiftError::Config("target directory is required".to_string()));
        }
        for (index, rule) in self.rules.iter().enumerate() {
            rule.validate()
                .map_err(|message| ShiftError::Config(format!("rule {index}: {message}")))?;
        }
        Ok(())
    }
}

impl RuleConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        match self.kind.as_str() {
            "package" | "service" | "import" | "option" => {
                if self.from.is_empty() || self.to.is_empty() {
                    return Err(format!("{} rule requires 'from' and 'to' fields", self.kind));
                }
                Ok(())
            }
            "regexp" => {
                if self.pattern.is_empty() || self.replace.is_empty() {
                    return Err("regexp rule requires 'pattern' and 'replace' fields".to_string());
                }
                Ok(())
            }
            other => Err(format!("unknown rule kind: {other}")),
        }
    }
}

fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        for name in CONFIG_CANDIDATES {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        if !dir.pop() {
            return None;
        }
    }
}
