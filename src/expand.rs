//! Template usage expansion for markup documents.
//!
//! A usage names a template and supplies fields, either one attribute per
//! field or all at once in `--fields`:
//!
//! ```text
//! <--template --name="card" $title="Hi">…</--template>
//! <--template --name="card" --fields="title: Hi; lang: en">…</--template>
//! ```
//!
//! Both forms may be mixed on one tag; `$` attributes are applied after
//! `--fields` and win on conflicting names.
//!
//! Expansion resolves the innermost, leftmost usage, splices the filled
//! template in place of the whole usage, and rescans. Usages inside another
//! usage's content are therefore resolved before their parent, and the parent
//! receives their output as its content.

use crate::markup::grammar::{FIELD_ATTR_PREFIX, FIELDS_ATTR, NAME_ATTR, TEMPLATE_TAG};
use crate::markup::{DocumentError, find_tag, parse_attributes};
use crate::template::{Fields, Templates, process_template};
use std::collections::BTreeSet;
use tracing::debug;

/// Usages resolved per document before expansion gives up.
pub const DEFAULT_MAX_EXPANSIONS: usize = 10_000;

/// The attributes of one `--template` opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Usage {
    pub name: String,
    pub fields: Fields,
}

/// Result of expanding one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub text: String,
    /// Non-fatal findings, e.g. supplied fields no template consumed.
    pub warnings: Vec<String>,
    /// Number of usages resolved.
    pub resolved: usize,
}

/// Parse the opening tag of a usage into its template name and fields.
pub fn parse_usage(opening_tag: &str) -> Result<Usage, DocumentError> {
    let attrs = parse_attributes(opening_tag)?;
    let name = attrs
        .get(NAME_ATTR)
        .ok_or(DocumentError::MissingTemplateName)?
        .to_string();

    let mut fields = Fields::new();
    if let Some(bulk) = attrs.get(FIELDS_ATTR).filter(|s| !s.is_empty()) {
        fields.extend(parse_bulk_fields(bulk)?);
    }
    for (attr, value) in attrs.iter() {
        if let Some(field) = attr.strip_prefix(FIELD_ATTR_PREFIX) {
            fields.insert(field.to_string(), value.to_string());
        }
    }

    Ok(Usage { name, fields })
}

/// Split `name: value; name: value` into trimmed pairs.
///
/// Every `;`-separated part must contain exactly one `:`.
pub fn parse_bulk_fields(bulk: &str) -> Result<Vec<(String, String)>, DocumentError> {
    bulk.split(';')
        .map(|part| match part.split(':').collect::<Vec<_>>().as_slice() {
            [name, value] => Ok((name.trim().to_string(), value.trim().to_string())),
            _ => Err(DocumentError::InvalidField(part.to_string())),
        })
        .collect()
}

/// Resolve every template usage in `html`.
///
/// Fails on the first defect. `max_expansions` bounds the number of usages
/// resolved; it is only reachable if a template's own text contains a usage.
pub fn process_html(
    html: &str,
    templates: &Templates,
    max_expansions: usize,
) -> Result<Expansion, DocumentError> {
    let mut text = html.to_string();
    let mut warnings = Vec::new();
    let mut resolved = 0;

    while let Some(span) = find_tag(TEMPLATE_TAG, &text)? {
        if resolved == max_expansions {
            return Err(DocumentError::ExpansionLimit(max_expansions));
        }

        let usage = parse_usage(span.opening(&text))?;
        let template = templates
            .get(&usage.name)
            .ok_or_else(|| DocumentError::UnknownTemplate(usage.name.clone()))?;

        let filled = process_template(template, &usage.fields, span.content(&text), &mut warnings)?;
        debug!(template = %usage.name, at = span.start, "resolved usage");

        text.replace_range(span.start..span.end, &filled);
        resolved += 1;
    }

    Ok(Expansion {
        text,
        warnings,
        resolved,
    })
}

/// Names of every template used in `html`, at any nesting depth.
///
/// Nothing is expanded: each innermost usage has its name recorded and its
/// tags removed, leaving its content in place for the next round.
pub fn template_names(html: &str) -> Result<BTreeSet<String>, DocumentError> {
    let mut text = html.to_string();
    let mut names = BTreeSet::new();

    while let Some(span) = find_tag(TEMPLATE_TAG, &text)? {
        let usage = parse_usage(span.opening(&text))?;
        names.insert(usage.name);

        text.replace_range(span.content_end..span.end, "");
        text.replace_range(span.start..span.content_start, "");
    }

    Ok(names)
}
