//! # Hypertemplate
//!
//! A static-site template expander. Documents are plain files; markup
//! documents may contain pseudo-tags that pull in reusable templates, fill
//! their fields and nest arbitrary content inside them. A build mirrors the
//! documents directory into an output directory, expanding what needs
//! expanding and copying everything else byte for byte.
//!
//! ```html
//! <!-- templates/card.html -->
//! <h1><--field --name="title"></h1><--inner-html>
//!
//! <!-- docs/index.html -->
//! <--template --name="card" $title="Hi"><p>body</p></--template>
//!
//! <!-- output/index.html -->
//! <h1>Hi</h1><p>body</p>
//! ```
//!
//! # Architecture: Plan, Expand, Write
//!
//! ```text
//! 1. Scan     docs/, templates/, output/  →  Inventory
//! 2. Plan     Inventory                   →  Plan (units to build + templates)
//! 3. Expand   Plan                        →  in-memory outputs  (all or nothing)
//! 4. Write    outputs                     →  output/            (sequential)
//! ```
//!
//! Nothing is written until every selected document has expanded without a
//! defect, so a broken template or usage never leaves a half-updated site.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`markup`] | Tag locating and attribute parsing for the pseudo-tag vocabulary |
//! | [`template`] | Loaded templates and field/slot resolution (`process_template`) |
//! | [`expand`] | Document expansion (`process_html`) and usage scanning |
//! | [`scan`] | Walking the three directories into source units |
//! | [`plan`] | Template loading, dependency analysis and freshness |
//! | [`build`] | Running a build: parallel expansion, then writing |
//! | [`config`] | `hypertemplate.toml` loading, merging and validation |
//! | [`types`] | Shared types (`Warning`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Text, Not a DOM
//!
//! Documents are never parsed into a tree. Pseudo-tags are located by a
//! quote-aware scan and replaced in place, so everything around them survives
//! untouched, including malformed HTML, and fields can sit inside attribute
//! values of ordinary tags.
//!
//! ## Innermost First
//!
//! Expansion always takes the innermost template usage, expands it, and
//! starts over. A usage's inner content is therefore fully expanded before it
//! is inserted into its template.
//!
//! ## Timestamps, Not Hashes
//!
//! Freshness compares modification times of a document, the templates it
//! uses and its output. A touched file rebuilds; an unchanged one never does.
//! `--force-rebuild` ignores timestamps altogether.

pub mod build;
pub mod config;
pub mod expand;
pub mod markup;
pub mod output;
pub mod plan;
pub mod scan;
pub mod template;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
