//! Import dependency graph across a schema tree.
//!
//! Classifies every import reference as internal (it resolves to a cataloged
//! file) or external, and computes how import paths move under a set of
//! prefix relocations.

use crate::catalog::Document;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// One rewritten import reference: the literal as written and its
/// replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportUpdate {
    pub old_path: String,
    pub new_path: String,
}

#[derive(Debug, Default)]
pub struct ImportGraph {
    files: BTreeSet<PathBuf>,
    imports: BTreeMap<PathBuf, Vec<String>>,
    external: BTreeSet<String>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, doc: &Document) {
        self.files.insert(doc.path.clone());
        self.imports.insert(
            doc.path.clone(),
            doc.ast.imports().map(str::to_string).collect(),
        );
    }

    /// Classify every import. Never fails: a reference that resolves to no
    /// cataloged file is external by definition, recorded under its original
    /// literal text.
    pub fn resolve_imports(&mut self, base_dir: &Path) {
        let mut external = BTreeSet::new();
        for (path, imports) in &self.imports {
            let current_dir = path.parent().unwrap_or_else(|| Path::new(""));
            for import in imports {
                let resolved = self.resolve_import_path(current_dir, import, base_dir);
                if !self.files.contains(&resolved) {
                    external.insert(import.clone());
                }
            }
        }
        self.external = external;
    }

    /// Candidates in order: the importing file's directory, the tree's base
    /// directory, the reference itself. Absolute references resolve to
    /// themselves.
    fn resolve_import_path(&self, current_dir: &Path, import: &str, base_dir: &Path) -> PathBuf {
        let literal = PathBuf::from(import);
        if literal.is_absolute() {
            return literal;
        }
        for candidate in [current_dir.join(import), base_dir.join(import)] {
            if self.files.contains(&candidate) {
                return candidate;
            }
        }
        literal
    }

    /// Compute, per file, the import rewrites a relocation map would make.
    /// Does not touch any document text.
    pub fn update_imports(&self, relocations: &RelocationMap) -> BTreeMap<PathBuf, Vec<ImportUpdate>> {
        let mut updates = BTreeMap::new();
        for (path, imports) in &self.imports {
            let file_updates: Vec<ImportUpdate> = imports
                .iter()
                .filter_map(|import| {
                    let new_path = relocations.apply(import);
                    (new_path != *import).then(|| ImportUpdate {
                        old_path: import.clone(),
                        new_path,
                    })
                })
                .collect();
            if !file_updates.is_empty() {
                updates.insert(path.clone(), file_updates);
            }
        }
        updates
    }

    /// External import literals, deduplicated and sorted.
    pub fn external_imports(&self) -> Vec<String> {
        self.external.iter().cloned().collect()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn imports_of(&self, path: &Path) -> &[String] {
        self.imports.get(path).map_or(&[], Vec::as_slice)
    }
}

/// Old-prefix to new-prefix path relocations. The longest matching prefix
/// wins; replacement substitutes the prefix once, at its first position.
#[derive(Debug, Clone, Default)]
pub struct RelocationMap {
    /// Sorted longest-prefix-first so the first match is the most specific.
    entries: Vec<(String, String)>,
}

impl RelocationMap {
    /// Build from the source/target roots plus explicit old/new pairs.
    pub fn build(source: &str, target: &str, pairs: &[(String, String)]) -> Self {
        let mut entries = Vec::with_capacity(pairs.len() + 1);
        entries.push((source.to_string(), target.to_string()));
        entries.extend(pairs.iter().cloned());
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        entries.dedup_by(|a, b| a.0 == b.0);
        Self { entries }
    }

    pub fn apply(&self, import: &str) -> String {
        for (old, new) in &self.entries {
            if import.starts_with(old.as_str()) {
                return import.replacen(old.as_str(), new, 1);
            }
        }
        import.to_string()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn doc(path: &str, content: &str) -> Document {
        Document {
            path: PathBuf::from(path),
            ast: Arc::new(protoshift_proto::parse(content).unwrap()),
            text: content.to_string(),
        }
    }

    #[test]
    fn extracts_imports_in_declaration_order() {
        let mut graph = ImportGraph::new();
        graph.add_file(&doc(
            "a.proto",
            "import \"x.proto\";\nimport \"y.proto\";\n",
        ));

        assert_eq!(
            graph.imports_of(Path::new("a.proto")),
            ["x.proto".to_string(), "y.proto".to_string()]
        );
    }

    #[test]
    fn current_directory_candidate_wins() {
        let mut graph = ImportGraph::new();
        graph.add_file(&doc("tree/api/a.proto", "import \"b.proto\";\n"));
        graph.add_file(&doc("tree/api/b.proto", "package b;\n"));

        graph.resolve_imports(Path::new("tree"));

        // b.proto resolves next to its importer; nothing is external.
        assert!(graph.external_imports().is_empty());
    }

    #[test]
    fn base_directory_candidate_is_second() {
        let mut graph = ImportGraph::new();
        graph.add_file(&doc("tree/api/a.proto", "import \"common/c.proto\";\n"));
        graph.add_file(&doc("tree/common/c.proto", "package c;\n"));

        graph.resolve_imports(Path::new("tree"));

        assert!(graph.external_imports().is_empty());
    }

    #[test]
    fn unresolved_imports_are_external_once() {
        let mut graph = ImportGraph::new();
        graph.add_file(&doc(
            "a.proto",
            "import \"google/protobuf/empty.proto\";\n",
        ));
        graph.add_file(&doc(
            "b.proto",
            "import \"google/protobuf/empty.proto\";\n",
        ));

        graph.resolve_imports(Path::new("."));

        assert_eq!(graph.file_count(), 2);
        assert_eq!(
            graph.external_imports(),
            vec!["google/protobuf/empty.proto".to_string()]
        );
    }

    #[test]
    fn update_imports_reports_old_and_new_literals() {
        let mut graph = ImportGraph::new();
        graph.add_file(&doc("t.proto", "import \"old/v1/types.proto\";\n"));

        let relocations =
            RelocationMap::build("old/v1", "new/v1", &[]);
        let updates = graph.update_imports(&relocations);

        assert_eq!(updates.len(), 1);
        let file_updates = &updates[Path::new("t.proto")];
        assert_eq!(
            file_updates,
            &[ImportUpdate {
                old_path: "old/v1/types.proto".to_string(),
                new_path: "new/v1/types.proto".to_string(),
            }]
        );
    }

    #[test]
    fn longest_relocation_prefix_wins() {
        let relocations = RelocationMap::build(
            "a/v1",
            "a/v2",
            &[("a/v1/sub".to_string(), "a/v2/sub2".to_string())],
        );

        assert_eq!(relocations.apply("a/v1/sub/x.proto"), "a/v2/sub2/x.proto");
        assert_eq!(relocations.apply("a/v1/other.proto"), "a/v2/other.proto");
        assert_eq!(relocations.apply("b/unrelated.proto"), "b/unrelated.proto");
    }

    #[test]
    fn build_collects_explicit_pairs() {
        let relocations = RelocationMap::build(
            "proto/old",
            "proto/new",
            &[
                ("old/v1".to_string(), "new/v1".to_string()),
                ("old/v2".to_string(), "new/v2".to_string()),
            ],
        );

        assert_eq!(relocations.len(), 3);
        assert_eq!(relocations.apply("old/v2/a.proto"), "new/v2/a.proto");
        assert_eq!(relocations.apply("proto/old/a.proto"), "proto/new/a.proto");
    }
}
