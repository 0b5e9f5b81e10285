//! The plan/diff/apply pipeline.
//!
//! Planning runs catalog → graph → configured rules → derived auto-import
//! rule and accumulates an audit log of every (file, rule) match. The
//! resulting [`Plan`] can be printed, diffed against the disk, or committed;
//! committing stages everything into a temp tree first and only then moves
//! files under the target root.

mod diff;

pub use diff::{DiffLine, FileDiff};

use crate::catalog::{Catalog, Document};
use crate::config::Config;
use crate::error::{Result, ShiftError};
use crate::graph::ImportGraph;
use crate::rules::{AutoImportRule, Rule};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Kind tag on a change record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    Transform,
    AutoImport,
}

/// Audit entry for one (file, rule) match.
#[derive(Debug, Clone, Serialize)]
pub struct Change {
    pub file: PathBuf,
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub description: String,
}

/// The full proposed mutation set for one run. Document text is the sole
/// source of truth for what an apply will write.
pub struct Plan {
    pub source: PathBuf,
    pub target: PathBuf,
    pub changes: Vec<Change>,
    pub documents: Vec<Document>,
    pub graph: ImportGraph,
}

pub struct Engine {
    config: Config,
    catalog: Catalog,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let catalog = Catalog::new(&config.excludes);
        Self { config, catalog }
    }

    /// Build the full proposed change set without writing anything.
    ///
    /// Documents are sorted by path before any rule runs, so change order
    /// and every printed artifact are stable across runs.
    pub fn plan(&self) -> Result<Plan> {
        let mut documents = self.catalog.load_directory(&self.config.source)?;
        documents.sort_by(|a, b| a.path.cmp(&b.path));

        let mut graph = ImportGraph::new();
        for doc in &documents {
            graph.add_file(doc);
        }
        graph.resolve_imports(&self.config.source);

        // Reject bad rule configuration before any document is touched.
        let rules: Vec<Rule> = self
            .config
            .rules
            .iter()
            .map(Rule::from_config)
            .collect::<Result<_>>()?;

        let mut changes = Vec::new();
        for rule in &rules {
            for doc in &mut documents {
                if rule.apply(doc) {
                    debug!("rule {} matched {}", rule.id(), doc.path.display());
                    changes.push(Change {
                        file: doc.path.clone(),
                        kind: ChangeKind::Transform,
                        description: format!("Applied rule: {}", rule.id()),
                    });
                }
            }
        }

        let auto_rule = AutoImportRule::derive(&self.config, &rules);
        for doc in &mut documents {
            if auto_rule.apply(doc) {
                debug!("rule {} matched {}", auto_rule.id(), doc.path.display());
                changes.push(Change {
                    file: doc.path.clone(),
                    kind: ChangeKind::AutoImport,
                    description: format!("Applied auto-rule: {}", auto_rule.id()),
                });
            }
        }

        info!(
            "planned {} changes across {} files",
            changes.len(),
            documents.len()
        );

        Ok(Plan {
            source: self.config.source.clone(),
            target: self.config.target.clone(),
            changes,
            documents,
            graph,
        })
    }

    /// Commit the plan: stage every document into a temp tree mirroring the
    /// source layout, then move each staged file under the target root.
    ///
    /// Source files are never modified. Files already moved stay moved if a
    /// later one fails; the staging directory is removed either way.
    pub fn apply(&self, plan: Plan) -> Result<()> {
        let staging = tempfile::Builder::new()
            .prefix("protoshift-")
            .tempdir()
            .map_err(|err| ShiftError::Apply(format!("creating staging directory: {err}")))?;

        for doc in &plan.documents {
            let rel = relative_to(&doc.path, &plan.source)?;
            let staged = staging.path().join(&rel);
            if let Some(parent) = staged.parent() {
                fs::create_dir_all(parent).map_err(|err| {
                    ShiftError::Apply(format!("creating {}: {err}", parent.display()))
                })?;
            }
            fs::write(&staged, &doc.text).map_err(|err| {
                ShiftError::Apply(format!("staging {}: {err}", staged.display()))
            })?;
        }

        fs::create_dir_all(&plan.target).map_err(|err| {
            ShiftError::Apply(format!(
                "creating target directory {}: {err}",
                plan.target.display()
            ))
        })?;

        for doc in &plan.documents {
            let rel = relative_to(&doc.path, &plan.source)?;
            let staged = staging.path().join(&rel);
            let dest = plan.target.join(&rel);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|err| {
                    ShiftError::Apply(format!("creating {}: {err}", parent.display()))
                })?;
            }
            if fs::rename(&staged, &dest).is_err() {
                // Cross-filesystem moves fall back to a plain copy.
                let bytes = fs::read(&staged).map_err(|err| {
                    ShiftError::Apply(format!("moving {}: {err}", dest.display()))
                })?;
                fs::write(&dest, bytes).map_err(|err| {
                    ShiftError::Apply(format!("moving {}: {err}", dest.display()))
                })?;
            }
            debug!("wrote {}", dest.display());
        }

        info!(
            "applied {} files under {}",
            plan.documents.len(),
            plan.target.display()
        );
        Ok(())
    }
}

fn relative_to(path: &Path, root: &Path) -> Result<PathBuf> {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .map_err(|_| {
            ShiftError::Apply(format!(
                "{} is not under {}",
                path.display(),
                root.display()
            ))
        })
}

impl Plan {
    /// Human-readable summary.
    pub fn print<W: Write>(&self, w: &mut W) -> Result<()> {
        writeln!(w)?;
        writeln!(w, "Plan Summary:")?;
        writeln!(w, "  Source: {}", self.source.display())?;
        writeln!(w, "  Target: {}", self.target.display())?;
        writeln!(w, "  Files: {}", self.documents.len())?;
        writeln!(w, "  Changes: {}", self.changes.len())?;

        if !self.changes.is_empty() {
            writeln!(w)?;
            writeln!(w, "Changes to be applied:")?;
            for change in &self.changes {
                let rel = change.file.strip_prefix(&self.source).unwrap_or(&change.file);
                writeln!(w, "  - {}: {}", rel.display(), change.description)?;
            }
        }
        Ok(())
    }

    /// The same summary as one machine-readable record.
    pub fn print_json<W: Write>(&self, w: &mut W) -> Result<()> {
        #[derive(Serialize)]
        struct Summary<'a> {
            source: &'a Path,
            target: &'a Path,
            files: usize,
            changes: &'a [Change],
        }

        serde_json::to_writer_pretty(
            &mut *w,
            &Summary {
                source: &self.source,
                target: &self.target,
                files: self.documents.len(),
                changes: &self.changes,
            },
        )?;
        writeln!(w)?;
        Ok(())
    }

    /// Compare every document against its current on-disk content.
    ///
    /// The disk is re-read on every call; a missing or unreadable original
    /// compares as empty. A file appears in the result iff its planned text
    /// differs from the disk.
    pub fn diff(&self) -> Result<Vec<FileDiff>> {
        let mut diffs = Vec::new();
        for doc in &self.documents {
            let original = fs::read_to_string(&doc.path).unwrap_or_default();
            if original != doc.text {
                let rel = doc
                    .path
                    .strip_prefix(&self.source)
                    .unwrap_or(&doc.path)
                    .to_path_buf();
                diffs.push(FileDiff {
                    path: rel,
                    lines: diff::compute(&original, &doc.text),
                });
            }
        }
        Ok(diffs)
    }
}
