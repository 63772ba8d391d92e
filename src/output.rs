//! CLI output formatting for a build run.
//!
//! # Output Format
//!
//! ```text
//! index.html -> site/index.html with: [card]
//! blog/post.html [new] with: [card, layout/page]
//! css/site.css [new]
//! Saved 3/3 files
//! Warning: [ blog/post.html ] template card.html: field spare not used
//! ```
//!
//! One line per selected document as it is planned, then a run summary, then
//! every warning collected during the run. Failures print a headline and the
//! error below it:
//!
//! ```text
//! Error while processing. No files altered.
//!   [ docs/index.html ] `crad` template doesn't exist
//! ```
//!
//! # Architecture
//!
//! Each piece has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to the terminal. Format
//! functions are pure: no I/O, no side effects. Colors come from `colored`
//! and are switched off globally by `--no-color`.

use crate::build::{BuildEvent, BuildOutcome, BuildStatus};
use crate::types::Warning;
use colored::Colorize;

// ============================================================================
// Progress events
// ============================================================================

/// Format a single build progress event as display lines.
///
/// Planned documents show what they replace (or `[new]`) and the templates
/// they use. Saved files are only reported at debug level, so they produce no
/// lines here.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::Planned {
            rel_path,
            replaces,
            templates,
        } => {
            let mut line = rel_path.clone();
            match replaces {
                Some(existing) => line.push_str(&format!(" {} {}", "->".blue(), existing)),
                None => line.push_str(&format!(" {}", "[new]".green())),
            }
            if !templates.is_empty() {
                line.push_str(&format!(
                    " {} [{}]",
                    "with:".blue(),
                    templates.join(", ")
                ));
            }
            vec![line]
        }
        BuildEvent::Saved { .. } => Vec::new(),
    }
}

// ============================================================================
// Run summary
// ============================================================================

/// Format the end-of-run summary for an outcome.
pub fn format_outcome(outcome: &BuildOutcome) -> Vec<String> {
    match &outcome.status {
        BuildStatus::UpToDate => vec!["nothing to do; all files up to date".to_string()],
        BuildStatus::Built => vec![
            format!("Saved {}/{} files", outcome.saved, outcome.planned)
                .blue()
                .to_string(),
        ],
        BuildStatus::DryRun => vec![
            format!("Dry run: {} files would be saved", outcome.planned)
                .blue()
                .to_string(),
        ],
        BuildStatus::ExpansionFailed(e) => vec![
            "Error while processing. No files altered.".red().to_string(),
            format!("  {}", e),
        ],
        BuildStatus::WriteFailed(e) => vec![
            "Error while saving:".red().to_string(),
            format!("  {}", e),
            format!("Saved {}/{} files", outcome.saved, outcome.planned),
        ],
    }
}

/// Format collected warnings, one line each.
pub fn format_warnings(warnings: &[Warning]) -> Vec<String> {
    warnings
        .iter()
        .flat_map(|w| {
            let text = w.to_string();
            let mut lines = text.lines();
            let first = lines
                .next()
                .map(|l| format!("{} {}", "Warning:".yellow(), l))
                .unwrap_or_default();
            std::iter::once(first).chain(lines.map(str::to_string).collect::<Vec<_>>())
        })
        .collect()
}

/// Print the summary to stdout, or to stderr on failure, then the warnings
/// to stderr.
pub fn print_outcome(outcome: &BuildOutcome) {
    let failed = outcome.status.exit_code() != 0;
    for line in format_outcome(outcome) {
        if failed {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
    for line in format_warnings(&outcome.warnings) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
