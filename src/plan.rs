//! Build planning: dependencies and freshness.
//!
//! Given the inventory of a run, the planner decides which documents have to
//! be (re)built. It never expands anything; markup documents are only scanned
//! for the names of the templates they use.
//!
//! ## Rebuild rule
//!
//! A document is rebuilt when any of these holds:
//!
//! 1. no file exists at the same relative path in the output directory,
//! 2. the newest of {document, every template it uses} was modified strictly
//!    after that output file,
//! 3. the run was asked to rebuild everything.
//!
//! Equal timestamps do not trigger a rebuild. Content is never hashed.
//!
//! ## Stray output
//!
//! Output files with no document at the same relative path are reported as a
//! warning. They are never deleted.

use crate::expand::template_names;
use crate::markup::DocumentError;
use crate::scan::{Inventory, ScanError, SourceUnit};
use crate::template::{Template, Templates};
use crate::types::Warning;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("[ {} ] {source}", .path.display())]
    Document {
        path: PathBuf,
        source: DocumentError,
    },
    #[error("templates {} and {} are both named `{name}`", .first.display(), .second.display())]
    DuplicateTemplate {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl PlanError {
    pub fn document(path: &Path, source: DocumentError) -> Self {
        PlanError::Document {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A document selected for building.
#[derive(Debug)]
pub struct BuildUnit {
    pub src: SourceUnit,
    /// Output file at the same relative path, if one exists.
    pub existing: Option<SourceUnit>,
    /// Names of the templates `src` uses; all present in [`Plan::templates`].
    pub templates: BTreeSet<String>,
}

impl BuildUnit {
    pub fn rel_path(&self) -> &Path {
        &self.src.rel_path
    }

    pub fn is_new(&self) -> bool {
        self.existing.is_none()
    }

    /// Whether the output differs from the source bytes. Documents without
    /// usages, like opaque files, are copied verbatim.
    pub fn needs_expansion(&self) -> bool {
        self.src.is_markup() && !self.templates.is_empty()
    }
}

/// The outcome of planning one run.
#[derive(Debug)]
pub struct Plan {
    pub templates: Templates,
    /// Units that need building, in document discovery order.
    pub units: Vec<BuildUnit>,
    /// Number of documents considered, selected or not.
    pub considered: usize,
    pub warnings: Vec<Warning>,
}

/// Load every markup file of the template root, keyed by template name.
///
/// Non-markup files are skipped with a warning; two files resolving to the
/// same name (`card.html` and `card.htm`) are an error.
pub fn load_templates(
    units: Vec<SourceUnit>,
    warnings: &mut Vec<Warning>,
) -> Result<Templates, PlanError> {
    let mut templates = Templates::new();
    for unit in units {
        if !unit.is_markup() {
            warnings.push(Warning::new(format!(
                "ignoring non-markup file in template directory: {}",
                unit.rel_path.display()
            )));
            continue;
        }
        let template = Template::load(unit)?;
        if let Some(previous) = templates.get(&template.name) {
            return Err(PlanError::DuplicateTemplate {
                name: template.name.clone(),
                first: previous.unit.path.clone(),
                second: template.unit.path.clone(),
            });
        }
        templates.insert(template.name.clone(), template);
    }
    Ok(templates)
}

/// Names of the templates `doc` uses, each checked to exist.
fn templates_used(doc: &SourceUnit, templates: &Templates) -> Result<BTreeSet<String>, PlanError> {
    if !doc.is_markup() {
        return Ok(BTreeSet::new());
    }
    let names = template_names(doc.content()?).map_err(|e| PlanError::document(&doc.path, e))?;
    if let Some(missing) = names.iter().find(|name| !templates.contains_key(*name)) {
        return Err(PlanError::document(
            &doc.path,
            DocumentError::UnknownTemplate(missing.clone()),
        ));
    }
    Ok(names)
}

/// Freshness rule on timestamps alone.
pub fn needs_rebuild(newest_input: SystemTime, output: Option<SystemTime>) -> bool {
    match output {
        None => true,
        Some(output) => newest_input > output,
    }
}

fn is_required(unit: &BuildUnit, templates: &Templates, force: bool) -> Result<bool, ScanError> {
    if force {
        return Ok(true);
    }
    let Some(existing) = &unit.existing else {
        return Ok(true);
    };

    let mut newest = unit.src.mtime()?;
    for name in &unit.templates {
        if let Some(template) = templates.get(name) {
            newest = newest.max(template.unit.mtime()?);
        }
    }
    Ok(needs_rebuild(newest, Some(existing.mtime()?)))
}

fn stray_warning(built: &[SourceUnit], docs: &[SourceUnit]) -> Option<Warning> {
    let sources: HashSet<&Path> = docs.iter().map(|d| d.rel_path.as_path()).collect();
    let stray: Vec<String> = built
        .iter()
        .filter(|b| !sources.contains(b.rel_path.as_path()))
        .map(|b| format!("  - {}", b.rel_path.display()))
        .collect();
    if stray.is_empty() {
        None
    } else {
        Some(Warning::new(format!(
            "stray files in build directory\n{}",
            stray.join("\n")
        )))
    }
}

/// Work out which documents need building.
pub fn create_build_units(inventory: Inventory, force_rebuild: bool) -> Result<Plan, PlanError> {
    let Inventory {
        docs,
        templates,
        built,
    } = inventory;

    let mut warnings = Vec::new();
    let templates = load_templates(templates, &mut warnings)?;
    warnings.extend(stray_warning(&built, &docs));

    let mut existing: HashMap<PathBuf, SourceUnit> = built
        .into_iter()
        .map(|b| (b.rel_path.clone(), b))
        .collect();

    let considered = docs.len();
    let mut units = Vec::new();
    for src in docs {
        let used = templates_used(&src, &templates)?;
        let unit = BuildUnit {
            existing: existing.remove(&src.rel_path),
            templates: used,
            src,
        };
        let required = is_required(&unit, &templates, force_rebuild)?;
        debug!(
            doc = %unit.rel_path().display(),
            new = unit.is_new(),
            templates = unit.templates.len(),
            required,
            "planned"
        );
        if required {
            units.push(unit);
        }
    }

    Ok(Plan {
        templates,
        units,
        considered,
        warnings,
    })
}
