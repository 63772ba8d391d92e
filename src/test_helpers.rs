//! Shared test utilities.
//!
//! [`Site`] lays out a throwaway docs/templates/output tree in a temp
//! directory with explicit modification times, so freshness tests never
//! depend on how fast the test runs.
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = Site::new();
//! site.template("card.html", "<--inner-html>", 100);
//! site.doc("index.html", r#"<--template --name="card">x</--template>"#, 200);
//! site.built("index.html", "x", 150);
//!
//! let plan = create_build_units(site.inventory(), false).unwrap();
//! assert_eq!(planned_paths(&plan), vec!["index.html"]);
//! ```

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

use crate::plan::{BuildUnit, Plan};
use crate::scan::Inventory;

// =========================================================================
// File setup
// =========================================================================

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Set a file's modification time to `secs` seconds after the epoch.
pub fn set_mtime(path: &Path, secs: u64) {
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

/// A docs/templates/output tree inside a temp directory.
pub struct Site {
    pub tmp: TempDir,
}

impl Site {
    pub fn new() -> Self {
        Self {
            tmp: TempDir::new().unwrap(),
        }
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.tmp.path().join("docs")
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.tmp.path().join("templates")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.tmp.path().join("site")
    }

    pub fn doc(&self, rel: &str, content: &str, mtime: u64) -> PathBuf {
        Self::put(&self.docs_dir(), rel, content, mtime)
    }

    pub fn template(&self, rel: &str, content: &str, mtime: u64) -> PathBuf {
        Self::put(&self.templates_dir(), rel, content, mtime)
    }

    pub fn built(&self, rel: &str, content: &str, mtime: u64) -> PathBuf {
        Self::put(&self.output_dir(), rel, content, mtime)
    }

    /// Read a file from the output directory.
    pub fn read_built(&self, rel: &str) -> String {
        fs::read_to_string(self.output_dir().join(rel))
            .unwrap_or_else(|e| panic!("output file '{rel}' unreadable: {e}"))
    }

    pub fn inventory(&self) -> Inventory {
        Inventory::scan(&self.docs_dir(), &self.templates_dir(), &self.output_dir()).unwrap()
    }

    fn put(root: &Path, rel: &str, content: &str, mtime: u64) -> PathBuf {
        let path = write_file(root, rel, content);
        set_mtime(&path, mtime);
        path
    }
}

// =========================================================================
// Plan lookups
// =========================================================================

/// Relative paths of the selected units, `/`-separated, in plan order.
pub fn planned_paths(plan: &Plan) -> Vec<String> {
    plan.units
        .iter()
        .map(|u| u.rel_path().to_string_lossy().replace('\\', "/"))
        .collect()
}

/// Find a selected unit by relative path. Panics if not selected.
pub fn find_unit<'a>(plan: &'a Plan, rel: &str) -> &'a BuildUnit {
    plan.units
        .iter()
        .find(|u| u.rel_path() == Path::new(rel))
        .unwrap_or_else(|| {
            let paths = planned_paths(plan);
            panic!("unit '{rel}' not planned. Planned: {paths:?}")
        })
}
