//! Concurrent file catalog.
//!
//! 1. `ignore::WalkBuilder` collects candidate `.proto` paths under the root
//! 2. exclude globs filter the candidates
//! 3. rayon workers read and parse the survivors in parallel
//! 4. a mutex-guarded cache memoizes parses by path for the run

use crate::error::{Result, ShiftError};
use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use protoshift_proto::SchemaAst;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

pub const SCHEMA_EXTENSION: &str = "proto";

/// One schema file held in memory: its canonical path, the parse produced
/// when the file was first read, and the text as rewritten so far.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub ast: Arc<SchemaAst>,
    pub text: String,
}

struct ExcludePattern {
    glob: GlobMatcher,
    /// Present only for patterns with no separator and no `**`; matched
    /// against the file name alone.
    basename: Option<GlobMatcher>,
}

pub struct Catalog {
    excludes: Vec<ExcludePattern>,
    cache: Mutex<HashMap<PathBuf, Arc<SchemaAst>>>,
}

/// `*` must not cross directory separators; only `**` spans them.
fn compile_glob(raw: &str) -> std::result::Result<GlobMatcher, globset::Error> {
    GlobBuilder::new(raw)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
}

impl Catalog {
    pub fn new(excludes: &[String]) -> Self {
        let excludes = excludes
            .iter()
            .filter_map(|raw| {
                let glob = match compile_glob(raw) {
                    Ok(glob) => glob,
                    Err(err) => {
                        warn!("skipping invalid exclude pattern {raw:?}: {err}");
                        return None;
                    }
                };
                let basename = if !raw.contains('/') && !raw.contains("**") {
                    compile_glob(raw).ok()
                } else {
                    None
                };
                Some(ExcludePattern { glob, basename })
            })
            .collect();

        Self {
            excludes,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Load every schema file under `root`, in parallel.
    ///
    /// Any single file failing to read or parse aborts the whole load. When
    /// several files fail at once, which error surfaces is a race; callers
    /// get exactly one. The returned collection has no guaranteed order.
    pub fn load_directory(&self, root: &Path) -> Result<Vec<Document>> {
        let paths = self.collect_paths(root);
        debug!(
            "cataloging {} schema files under {}",
            paths.len(),
            root.display()
        );
        paths.par_iter().map(|path| self.load_file(path)).collect()
    }

    fn collect_paths(&self, root: &Path) -> Vec<PathBuf> {
        WalkBuilder::new(root)
            .standard_filters(false)
            .build()
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let path = entry.path();
                if !path.is_file()
                    || path.extension().and_then(|e| e.to_str()) != Some(SCHEMA_EXTENSION)
                {
                    return None;
                }
                if self.is_excluded(path, root) {
                    return None;
                }
                Some(path.to_path_buf())
            })
            .collect()
    }

    /// A pattern excludes a file if it matches the root-relative path, the
    /// full path, or (for bare patterns) the file name. First match wins.
    fn is_excluded(&self, path: &Path, root: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.excludes.iter().any(|pattern| {
            pattern.glob.is_match(relative)
                || pattern.glob.is_match(path)
                || pattern.basename.as_ref().is_some_and(|basename| {
                    path.file_name()
                        .is_some_and(|name| basename.is_match(Path::new(name)))
                })
        })
    }

    /// Read and parse one file, memoizing the parse by path for the run.
    pub fn load_file(&self, path: &Path) -> Result<Document> {
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned();

        let text = std::fs::read_to_string(path).map_err(|err| ShiftError::Load {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

        if let Some(ast) = cached {
            return Ok(Document {
                path: path.to_path_buf(),
                ast,
                text,
            });
        }

        let ast = protoshift_proto::parse(&text).map_err(|err| ShiftError::Load {
            path: path.to_path_buf(),
            message: format!("parsing schema: {err}"),
        })?;
        let ast = Arc::new(ast);

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_path_buf(), ast.clone());

        Ok(Document {
            path: path.to_path_buf(),
            ast,
            text,
        })
    }
}
