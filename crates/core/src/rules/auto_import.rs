//! The derived import-rewrite rule.
//!
//! Not user-configured: built from the source/target roots plus every
//! configured package-rename rule, with dotted package names converted to
//! path segments.

use super::Rule;
use crate::catalog::Document;
use crate::config::Config;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct AutoImportRule {
    source: String,
    target: String,
    /// Directory mappings, longest key first so prefix lookups find the most
    /// specific entry.
    mappings: Vec<(String, String)>,
}

impl AutoImportRule {
    /// Derive the rule from the run's configuration and the already-built
    /// configured rules.
    pub fn derive(config: &Config, rules: &[Rule]) -> AutoImportRule {
        let source = config.source.to_string_lossy().into_owned();
        let target = config.target.to_string_lossy().into_owned();

        let mut mappings = Vec::new();
        if !source.is_empty() && !target.is_empty() {
            mappings.push((source.clone(), target.clone()));
        }

        for rule in rules {
            if let Rule::Package { from, to } = rule {
                let from_dir = from.replace('.', "/");
                let to_dir = to.replace('.', "/");
                if !source.is_empty() && !target.is_empty() {
                    mappings.push((
                        Path::new(&source).join(&from_dir).to_string_lossy().into_owned(),
                        Path::new(&target).join(&to_dir).to_string_lossy().into_owned(),
                    ));
                }
                mappings.push((from_dir, to_dir));
            }
        }

        mappings.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        mappings.dedup_by(|a, b| a.0 == b.0);

        AutoImportRule {
            source,
            target,
            mappings,
        }
    }

    pub fn id(&self) -> String {
        format!("auto-import:{}->{}", self.source, self.target)
    }

    /// Rewrite each import reference the mappings cover. A rewrite is
    /// skipped when the resulting import statement already exists in the
    /// file, so a statement is never rewritten twice in one pass.
    pub fn apply(&self, doc: &mut Document) -> bool {
        let mut changed = false;
        let mut text = doc.text.clone();
        for import in doc.ast.imports() {
            let new_path = self.transform(import);
            if new_path != import {
                let old_statement = format!("import \"{import}\";");
                let new_statement = format!("import \"{new_path}\";");
                if !text.contains(&new_statement) {
                    text = text.replacen(&old_statement, &new_statement, 1);
                    changed = true;
                }
            }
        }
        if changed {
            doc.text = text;
        }
        changed
    }

    /// Lookup order: exact match, longest prefix ending on a path-segment
    /// boundary, then substring replacement as a last resort.
    fn transform(&self, import: &str) -> String {
        for (from, to) in &self.mappings {
            if import == from {
                return to.clone();
            }
        }

        for (from, to) in &self.mappings {
            if import.starts_with(&format!("{from}/")) {
                return import.replacen(from.as_str(), to, 1);
            }
        }

        for (from, to) in &self.mappings {
            if import.contains(from.as_str()) {
                return import.replace(from.as_str(), to);
            }
        }

        import.to_string()
    }
}
