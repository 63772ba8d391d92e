//! Directory inventory for a build run.
//!
//! Walks the three roots a run looks at (documents, templates, previously
//! built output) and records every file as a [`SourceUnit`]. Files are
//! classified once, here, by extension:
//!
//! - **Markup** (`.html`, `.htm`, case-sensitive): read as text, scanned for
//!   template usages, expanded.
//! - **Opaque** (everything else): never read as text, copied byte for byte.
//!
//! Modification times and text content are read lazily on first access and
//! cached for the rest of the run. A missing root is an empty inventory, not
//! an error: the first build of a site has no output directory yet.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
}

const MARKUP_EXTENSIONS: &[&str] = &[".html", ".htm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Markup,
    Opaque,
}

impl UnitKind {
    pub fn classify(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        if MARKUP_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
            UnitKind::Markup
        } else {
            UnitKind::Opaque
        }
    }
}

/// One file under a scanned root.
#[derive(Debug)]
pub struct SourceUnit {
    /// Path as found on disk (root joined with `rel_path`).
    pub path: PathBuf,
    /// Path relative to the root it was found under.
    pub rel_path: PathBuf,
    pub kind: UnitKind,
    mtime: OnceLock<SystemTime>,
    content: OnceLock<String>,
}

impl SourceUnit {
    pub fn new(path: impl Into<PathBuf>, rel_path: impl Into<PathBuf>) -> Self {
        let rel_path = rel_path.into();
        Self {
            kind: UnitKind::classify(&rel_path),
            path: path.into(),
            rel_path,
            mtime: OnceLock::new(),
            content: OnceLock::new(),
        }
    }

    pub fn is_markup(&self) -> bool {
        self.kind == UnitKind::Markup
    }

    /// Last modification time, read from disk once per run.
    pub fn mtime(&self) -> Result<SystemTime, ScanError> {
        if let Some(mtime) = self.mtime.get() {
            return Ok(*mtime);
        }
        let mtime = fs::metadata(&self.path)
            .and_then(|m| m.modified())
            .map_err(|source| self.read_error(source))?;
        Ok(*self.mtime.get_or_init(|| mtime))
    }

    /// Text content, read from disk once per run.
    pub fn content(&self) -> Result<&str, ScanError> {
        if let Some(content) = self.content.get() {
            return Ok(content);
        }
        let content = fs::read_to_string(&self.path).map_err(|source| self.read_error(source))?;
        Ok(self.content.get_or_init(|| content))
    }

    fn read_error(&self, source: io::Error) -> ScanError {
        ScanError::Read {
            path: self.path.clone(),
            source,
        }
    }
}

/// All files of one run: documents, templates and the existing output.
#[derive(Debug, Default)]
pub struct Inventory {
    pub docs: Vec<SourceUnit>,
    pub templates: Vec<SourceUnit>,
    pub built: Vec<SourceUnit>,
}

impl Inventory {
    pub fn scan(docs: &Path, templates: &Path, output: &Path) -> Result<Self, ScanError> {
        Ok(Self {
            docs: find_files(docs)?,
            templates: find_files(templates)?,
            built: find_files(output)?,
        })
    }
}

/// Recursively list every file under `root`, sorted by path.
///
/// Returns an empty list when `root` is not a directory.
pub fn find_files(root: &Path) -> Result<Vec<SourceUnit>, ScanError> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .min_depth(1)
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel_path) = entry.path().strip_prefix(root) else {
            continue;
        };
        files.push(SourceUnit::new(entry.path(), rel_path));
    }
    Ok(files)
}
