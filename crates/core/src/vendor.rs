//! Vendoring of external imports.
//!
//! Fetches each external import the graph reports from its well-known
//! upstream location and writes the bytes verbatim under
//! `<target>/vendor/`. Imports already vendored are skipped.

use crate::error::{Result, ShiftError};
use crate::graph::ImportGraph;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const GOOGLEAPIS_RAW: &str = "https://raw.githubusercontent.com/googleapis/googleapis/master";
const PROTOBUF_RAW: &str =
    "https://raw.githubusercontent.com/protocolbuffers/protobuf/main/src";

static WELL_KNOWN: Lazy<HashMap<&'static str, String>> = Lazy::new(|| {
    let protobuf = [
        "google/protobuf/timestamp.proto",
        "google/protobuf/duration.proto",
        "google/protobuf/empty.proto",
        "google/protobuf/any.proto",
        "google/protobuf/struct.proto",
        "google/protobuf/wrappers.proto",
        "google/protobuf/field_mask.proto",
    ];
    let googleapis = ["google/api/annotations.proto", "google/api/http.proto"];

    let mut table = HashMap::new();
    for import in protobuf {
        table.insert(import, format!("{PROTOBUF_RAW}/{import}"));
    }
    for import in googleapis {
        table.insert(import, format!("{GOOGLEAPIS_RAW}/{import}"));
    }
    table
});

/// Upstream location for an external import: the fixed table first, then a
/// derived googleapis location for anything under `google/`.
pub fn upstream_url(import: &str) -> Option<String> {
    if let Some(url) = WELL_KNOWN.get(import) {
        return Some(url.clone());
    }
    import
        .starts_with("google/")
        .then(|| format!("{GOOGLEAPIS_RAW}/{import}"))
}

pub struct Vendorer {
    vendor_dir: PathBuf,
}

impl Vendorer {
    pub fn new(target_dir: &Path) -> Self {
        Self {
            vendor_dir: target_dir.join("vendor"),
        }
    }

    /// Fetch every external import the graph reports. An import with no
    /// known upstream is a hard error.
    pub fn vendor_external(&self, graph: &ImportGraph) -> Result<()> {
        let externals = graph.external_imports();
        if externals.is_empty() {
            return Ok(());
        }

        fs::create_dir_all(&self.vendor_dir).map_err(|err| {
            ShiftError::Vendor(format!(
                "creating vendor directory {}: {err}",
                self.vendor_dir.display()
            ))
        })?;

        for import in externals {
            self.vendor_file(&import)?;
        }
        Ok(())
    }

    fn vendor_file(&self, import: &str) -> Result<()> {
        let dest = self.vendor_dir.join(import);
        if dest.exists() {
            debug!("{import} already vendored, skipping");
            return Ok(());
        }
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                ShiftError::Vendor(format!("{import}: creating {}: {err}", parent.display()))
            })?;
        }

        let content = fetch_schema(import)?;
        fs::write(&dest, content)
            .map_err(|err| ShiftError::Vendor(format!("{import}: writing {}: {err}", dest.display())))?;
        info!("vendored {import}");
        Ok(())
    }
}

fn fetch_schema(import: &str) -> Result<Vec<u8>> {
    let url = upstream_url(import)
        .ok_or_else(|| ShiftError::Vendor(format!("unknown import path: {import}")))?;

    let response = ureq::get(&url)
        .timeout(FETCH_TIMEOUT)
        .call()
        .map_err(|err| ShiftError::Vendor(format!("{import}: fetching {url}: {err}")))?;

    let mut content = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut content)
        .map_err(|err| ShiftError::Vendor(format!("{import}: reading {url}: {err}")))?;
    Ok(content)
}
