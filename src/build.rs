//! Running a build: plan, expand, write.
//!
//! A run has two phases with different failure guarantees:
//!
//! 1. **Expansion.** Every selected document is expanded in memory, in
//!    parallel on the rayon pool. Any defect aborts the run before a single
//!    file is touched ("no files altered").
//! 2. **Writing.** Results are written one unit at a time, in discovery
//!    order. A failure stops the phase; files already written stay written
//!    and the run reports how many were saved.
//!
//! Before writing, each target is checked against what planning saw: a new
//! unit must not find a file in its place, and a replacing unit must still
//! find its file. A mismatch means the output tree changed under the run and
//! is reported as a write failure rather than papered over.
//!
//! Progress is reported through an optional channel of [`BuildEvent`]s so the
//! CLI can print as the run goes (see [`output`](crate::output)).

use crate::expand::process_html;
use crate::plan::{BuildUnit, Plan, PlanError, create_build_units};
use crate::scan::Inventory;
use crate::template::Templates;
use crate::types::Warning;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to write {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("refusing to create {}: a file already exists there", .0.display())]
    AlreadyExists(PathBuf),
    #[error("refusing to replace {}: the file is gone", .0.display())]
    MissingTarget(PathBuf),
}

/// What to put at a unit's output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Expanded markup.
    Text(String),
    /// Copy the source file byte for byte.
    Copy,
}

/// Directories and switches for one run.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub docs: PathBuf,
    pub templates: PathBuf,
    pub output: PathBuf,
    pub max_expansions: usize,
    /// Expand and report, but write nothing.
    pub dry_run: bool,
    /// Ignore timestamps and select every document.
    pub force_rebuild: bool,
}

/// Progress events emitted during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    /// A document was selected for building.
    Planned {
        rel_path: String,
        /// Output file being replaced; `None` for a new file.
        replaces: Option<String>,
        templates: Vec<String>,
    },
    /// A unit's output was written.
    Saved { rel_path: String },
}

#[derive(Debug)]
pub enum BuildStatus {
    /// Nothing was selected.
    UpToDate,
    /// Every selected unit was written.
    Built,
    /// Every selected unit expanded; writing was skipped.
    DryRun,
    /// A defect stopped the run before anything was written.
    ExpansionFailed(PlanError),
    /// Writing stopped partway; earlier units stay written.
    WriteFailed(WriteError),
}

impl BuildStatus {
    /// Process exit code: 0 on success, 1 when nothing was altered because of
    /// a defect, 2 when the write phase failed partway.
    pub fn exit_code(&self) -> u8 {
        match self {
            BuildStatus::UpToDate | BuildStatus::Built | BuildStatus::DryRun => 0,
            BuildStatus::ExpansionFailed(_) => 1,
            BuildStatus::WriteFailed(_) => 2,
        }
    }
}

/// Everything a run reports once it is over.
#[derive(Debug)]
pub struct BuildOutcome {
    pub status: BuildStatus,
    /// Units selected by planning.
    pub planned: usize,
    /// Units written.
    pub saved: usize,
    pub warnings: Vec<Warning>,
}

impl BuildOutcome {
    fn failed(error: PlanError, planned: usize, warnings: Vec<Warning>) -> Self {
        Self {
            status: BuildStatus::ExpansionFailed(error),
            planned,
            saved: 0,
            warnings,
        }
    }
}

/// Expand one unit.
///
/// Warnings come back tagged with the unit's relative path.
pub fn process(
    unit: &BuildUnit,
    templates: &Templates,
    max_expansions: usize,
) -> Result<(Output, Vec<Warning>), PlanError> {
    if !unit.needs_expansion() {
        return Ok((Output::Copy, Vec::new()));
    }

    let content = unit.src.content()?;
    let expansion = process_html(content, templates, max_expansions)
        .map_err(|e| PlanError::document(&unit.src.path, e))?;

    let context = unit.rel_path().display().to_string();
    let warnings = expansion
        .warnings
        .into_iter()
        .map(|w| Warning::in_document(context.clone(), w))
        .collect();
    Ok((Output::Text(expansion.text), warnings))
}

/// Expand every unit of the plan, failing on the first defect in discovery
/// order.
pub fn process_all(
    plan: &Plan,
    max_expansions: usize,
) -> Result<(Vec<Output>, Vec<Warning>), PlanError> {
    let results: Vec<_> = plan
        .units
        .par_iter()
        .map(|unit| process(unit, &plan.templates, max_expansions))
        .collect();

    let mut outputs = Vec::with_capacity(results.len());
    let mut warnings = Vec::new();
    for result in results {
        let (output, unit_warnings) = result?;
        outputs.push(output);
        warnings.extend(unit_warnings);
    }
    Ok((outputs, warnings))
}

/// Write one unit's output below `out_root`.
pub fn save(unit: &BuildUnit, output: &Output, out_root: &Path) -> Result<(), WriteError> {
    let save_path = out_root.join(unit.rel_path());
    match &unit.existing {
        None if save_path.exists() => return Err(WriteError::AlreadyExists(save_path)),
        Some(_) if !save_path.is_file() => return Err(WriteError::MissingTarget(save_path)),
        _ => {}
    }

    let io_error = |source| WriteError::Io {
        path: save_path.clone(),
        source,
    };
    if let Some(parent) = save_path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    match output {
        Output::Text(text) => fs::write(&save_path, text).map_err(io_error)?,
        Output::Copy => {
            fs::copy(&unit.src.path, &save_path).map_err(io_error)?;
        }
    }
    debug!(path = %save_path.display(), "saved");
    Ok(())
}

fn send(events: &Option<Sender<BuildEvent>>, event: BuildEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

fn planned_event(unit: &BuildUnit) -> BuildEvent {
    BuildEvent::Planned {
        rel_path: unit.rel_path().display().to_string(),
        replaces: unit
            .existing
            .as_ref()
            .map(|e| e.path.display().to_string()),
        templates: unit.templates.iter().cloned().collect(),
    }
}

/// Run a whole build.
pub fn build(options: &BuildOptions, events: Option<Sender<BuildEvent>>) -> BuildOutcome {
    info!(docs = %options.docs.display(), output = %options.output.display(), "planning");
    let plan = match Inventory::scan(&options.docs, &options.templates, &options.output)
        .map_err(PlanError::from)
        .and_then(|inventory| create_build_units(inventory, options.force_rebuild))
    {
        Ok(plan) => plan,
        Err(e) => return BuildOutcome::failed(e, 0, Vec::new()),
    };

    let planned = plan.units.len();
    let mut warnings = plan.warnings.clone();
    if planned == 0 {
        return BuildOutcome {
            status: BuildStatus::UpToDate,
            planned,
            saved: 0,
            warnings,
        };
    }

    for unit in &plan.units {
        send(&events, planned_event(unit));
    }

    info!(units = planned, "expanding");
    let outputs = match process_all(&plan, options.max_expansions) {
        Ok((outputs, expansion_warnings)) => {
            warnings.extend(expansion_warnings);
            outputs
        }
        Err(e) => return BuildOutcome::failed(e, planned, warnings),
    };

    if options.dry_run {
        return BuildOutcome {
            status: BuildStatus::DryRun,
            planned,
            saved: 0,
            warnings,
        };
    }

    info!(units = planned, "writing");
    let mut saved = 0;
    for (unit, output) in plan.units.iter().zip(&outputs) {
        if let Err(e) = save(unit, output, &options.output) {
            return BuildOutcome {
                status: BuildStatus::WriteFailed(e),
                planned,
                saved,
                warnings,
            };
        }
        saved += 1;
        send(
            &events,
            BuildEvent::Saved {
                rel_path: unit.rel_path().display().to_string(),
            },
        );
    }

    BuildOutcome {
        status: BuildStatus::Built,
        planned,
        saved,
        warnings,
    }
}
