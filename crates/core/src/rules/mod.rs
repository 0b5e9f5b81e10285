//! Declarative rewrite rules.
//!
//! The rule set is a closed enum: dispatch is a `match`, so adding a kind
//! without handling it everywhere fails to compile. Every variant's `apply`
//! is a pure transformation of one document's text, guided by the document's
//! parse.

mod auto_import;

pub use auto_import::AutoImportRule;

use crate::catalog::Document;
use crate::config::RuleConfig;
use crate::error::{Result, ShiftError};
use regex::Regex;

/// A single declarative transformation applied to one document.
#[derive(Debug, Clone)]
pub enum Rule {
    Package {
        from: String,
        to: String,
    },
    Service {
        from: String,
        to: String,
        head: Regex,
    },
    Import {
        from: String,
        to: String,
    },
    Option {
        from: String,
        to: String,
        pattern: Regex,
    },
    Regexp {
        pattern: Regex,
        replace: String,
    },
    AutoImport(AutoImportRule),
}

/// The language-binding options a rewrite may touch.
const OPTION_PATTERN: &str =
    r#"option\s+(go_package|java_package|swift_prefix)\s*=\s*"([^"]+)""#;

impl Rule {
    /// Build a rule from its configuration entry. Unknown kinds and invalid
    /// patterns are rejected here, before any file is touched.
    pub fn from_config(config: &RuleConfig) -> Result<Rule> {
        match config.kind.as_str() {
            "package" => Ok(Rule::Package {
                from: config.from.clone(),
                to: config.to.clone(),
            }),
            "service" => {
                let head = Regex::new(&format!(
                    r"service\s+{}\s*\{{",
                    regex::escape(&config.from)
                ))
                .map_err(|err| {
                    ShiftError::Rule(format!("service rule {:?}: {err}", config.from))
                })?;
                Ok(Rule::Service {
                    from: config.from.clone(),
                    to: config.to.clone(),
                    head,
                })
            }
            "import" => Ok(Rule::Import {
                from: config.from.clone(),
                to: config.to.clone(),
            }),
            "option" => {
                let pattern = Regex::new(OPTION_PATTERN)
                    .map_err(|err| ShiftError::Rule(err.to_string()))?;
                Ok(Rule::Option {
                    from: config.from.clone(),
                    to: config.to.clone(),
                    pattern,
                })
            }
            "regexp" => {
                let pattern = Regex::new(&config.pattern).map_err(|err| {
                    ShiftError::Rule(format!(
                        "invalid regex pattern {:?}: {err}",
                        config.pattern
                    ))
                })?;
                Ok(Rule::Regexp {
                    pattern,
                    replace: config.replace.clone(),
                })
            }
            other => Err(ShiftError::Config(format!("unknown rule kind: {other}"))),
        }
    }

    /// Stable identifier used in change descriptions.
    pub fn id(&self) -> String {
        match self {
            Rule::Package { from, to } => format!("package.rename:{from}->{to}"),
            Rule::Service { from, to, .. } => format!("service.rename:{from}->{to}"),
            Rule::Import { from, to } => format!("import.rewrite:{from}->{to}"),
            Rule::Option { from, to, .. } => format!("option.update:{from}->{to}"),
            Rule::Regexp { pattern, replace } => {
                format!("regexp:{}->{replace}", pattern.as_str())
            }
            Rule::AutoImport(rule) => rule.id(),
        }
    }

    /// Apply the rule to one document, reporting whether it matched.
    pub fn apply(&self, doc: &mut Document) -> bool {
        match self {
            Rule::Package { from, to } => apply_package(doc, from, to),
            Rule::Service { from, to, head } => apply_service(doc, from, to, head),
            Rule::Import { from, to } => apply_import(doc, from, to),
            Rule::Option { from, to, pattern } => apply_option(doc, from, to, pattern),
            Rule::Regexp { pattern, replace } => apply_regexp(doc, pattern, replace),
            Rule::AutoImport(rule) => rule.apply(doc),
        }
    }
}

/// Swap the literal `package <from>;` line, first occurrence only.
fn apply_package(doc: &mut Document, from: &str, to: &str) -> bool {
    let mut changed = false;
    let mut text = doc.text.clone();
    for package in doc.ast.packages() {
        if package == from {
            let old_line = format!("package {package};");
            let new_line = format!("package {to};");
            text = text.replacen(&old_line, &new_line, 1);
            changed = true;
        }
    }
    if changed {
        doc.text = text;
    }
    changed
}

/// Rewrite the service declaration head, tolerant of whitespace between the
/// keyword, the name, and the opening brace.
fn apply_service(doc: &mut Document, from: &str, to: &str, head: &Regex) -> bool {
    let mut changed = false;
    let new_head = format!("service {to} {{");
    for service in doc.ast.services() {
        if service == from {
            doc.text = head.replace_all(&doc.text, new_head.as_str()).into_owned();
            changed = true;
        }
    }
    changed
}

/// Rewrite import statements whose path contains `from` as a substring.
fn apply_import(doc: &mut Document, from: &str, to: &str) -> bool {
    let mut changed = false;
    let mut text = doc.text.clone();
    for import in doc.ast.imports() {
        if import.contains(from) {
            let old_statement = format!("import \"{import}\";");
            let new_path = import.replace(from, to);
            let new_statement = format!("import \"{new_path}\";");
            text = text.replacen(&old_statement, &new_statement, 1);
            changed = true;
        }
    }
    if changed {
        doc.text = text;
    }
    changed
}

/// Rewrite recognized language-binding option values containing `from`,
/// across every match in one pass.
fn apply_option(doc: &mut Document, from: &str, to: &str, pattern: &Regex) -> bool {
    let matches: Vec<(String, String, String)> = pattern
        .captures_iter(&doc.text)
        .map(|cap| (cap[0].to_string(), cap[1].to_string(), cap[2].to_string()))
        .collect();

    let mut changed = false;
    let mut text = doc.text.clone();
    for (old_option, name, value) in matches {
        if value.contains(from) {
            let new_value = value.replace(from, to);
            let new_option = format!("option {name} = \"{new_value}\"");
            text = text.replacen(&old_option, &new_option, 1);
            changed = true;
        }
    }
    if changed {
        doc.text = text;
    }
    changed
}

/// Free-form replacement over the raw text. The only rule kind with no
/// guard against matching its own replacement.
fn apply_regexp(doc: &mut Document, pattern: &Regex, replace: &str) -> bool {
    let new_text = pattern.replace_all(&doc.text, replace).into_owned();
    if new_text != doc.text {
        doc.text = new_text;
        return true;
    }
    false
}
