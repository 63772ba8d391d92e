//! Templates and field resolution.
//!
//! A template is an ordinary markup file under the template root. Its name is
//! its path relative to that root with the `.html`/`.htm` extension removed,
//! so `templates/blog/card.html` is used as `--name="blog/card"`.
//!
//! Inside a template two void tags are recognized:
//!
//! ```text
//! <--field --name="title" --default="Untitled">   replaced by a field value
//! <--inner-html>                                   replaced by the usage's content
//! ```
//!
//! Both are matched by a fixed single-line shape rather than the paired-tag
//! locator: they never have content, and fields may sit inside attribute
//! values of real HTML (`<a href="<--field --name="url">">`), where a general
//! tag scan would get confused by the surrounding quotes.
//!
//! Template content is never expanded itself; templates cannot use templates.

use crate::markup::grammar::{DEFAULT_ATTR, FIELD_TAG, INNER_HTML_TAG, NAME_ATTR};
use crate::markup::{DocumentError, parse_attributes};
use crate::scan::{ScanError, SourceUnit};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

/// Field name → value supplied by one template usage.
pub type Fields = BTreeMap<String, String>;

/// Template name → template, for one run.
pub type Templates = BTreeMap<String, Template>;

static FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| void_tag_pattern(FIELD_TAG));
static INNER_HTML_PATTERN: LazyLock<Regex> = LazyLock::new(|| void_tag_pattern(INNER_HTML_TAG));

/// `<tag name="value" …>` or `<tag …/>`, on one line, double-quoted values.
fn void_tag_pattern(tag: &str) -> Regex {
    Regex::new(&format!(
        r#"<{}(?: +[\w-]+ *= *"[^"\n\r]*?")* */?>"#,
        regex::escape(tag)
    ))
    .unwrap()
}

/// A loaded template.
#[derive(Debug)]
pub struct Template {
    pub name: String,
    pub unit: SourceUnit,
    content: String,
}

impl Template {
    /// Read a template unit's text and derive its name.
    pub fn load(unit: SourceUnit) -> Result<Self, ScanError> {
        let content = unit.content()?.to_owned();
        Ok(Self {
            name: template_ident(&unit.rel_path),
            unit,
            content,
        })
    }

    #[cfg(test)]
    pub(crate) fn from_text(rel_path: &str, content: &str) -> Self {
        Self {
            name: template_ident(Path::new(rel_path)),
            unit: SourceUnit::new(rel_path, rel_path),
            content: content.to_string(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// How the template is named in error and warning messages.
    pub fn display_path(&self) -> String {
        self.unit.rel_path.display().to_string()
    }
}

/// Name a template is referenced by: its relative path, `/`-separated, with
/// a trailing `.html` or `.htm` removed.
pub fn template_ident(rel_path: &Path) -> String {
    let path = rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    path.strip_suffix(".html")
        .or_else(|| path.strip_suffix(".htm"))
        .map(str::to_string)
        .unwrap_or(path)
}

/// One planned replacement of `text[start..end]`.
struct Substitution {
    start: usize,
    end: usize,
    replacement: String,
}

/// Fill a template's fields and content slot.
///
/// Every field tag takes its value from `fields`, falling back to its own
/// `--default`; a field with neither is an error. The content slot, if the
/// template has one, receives `inner_html` verbatim. Supplied fields that no
/// field tag consumed are reported through `warnings` and do not fail the
/// call.
pub fn process_template(
    template: &Template,
    fields: &Fields,
    inner_html: &str,
    warnings: &mut Vec<String>,
) -> Result<String, DocumentError> {
    let text = template.content();
    let mut unused: BTreeSet<&str> = fields.keys().map(String::as_str).collect();
    let mut subs = Vec::new();

    for tag in FIELD_PATTERN.find_iter(text) {
        let attrs = parse_attributes(tag.as_str())?;
        let name = attrs
            .get(NAME_ATTR)
            .ok_or_else(|| DocumentError::FieldMissingName {
                template: template.display_path(),
            })?;

        let value = match (fields.get(name), attrs.get(DEFAULT_ATTR)) {
            (Some(value), _) => value.clone(),
            (None, Some(default)) => default.to_string(),
            (None, None) => {
                return Err(DocumentError::FieldRequired {
                    template: template.display_path(),
                    field: name.to_string(),
                });
            }
        };

        unused.remove(name);
        subs.push(Substitution {
            start: tag.start(),
            end: tag.end(),
            replacement: value,
        });
    }

    let slots: Vec<_> = INNER_HTML_PATTERN.find_iter(text).collect();
    if slots.len() > 1 {
        return Err(DocumentError::MultipleContentSlots {
            template: template.display_path(),
        });
    }
    subs.extend(slots.into_iter().map(|slot| Substitution {
        start: slot.start(),
        end: slot.end(),
        replacement: inner_html.to_string(),
    }));

    subs.sort_by_key(|s| s.start);

    let mut out = String::with_capacity(text.len() + inner_html.len());
    let mut cursor = 0;
    for sub in &subs {
        if cursor > sub.start {
            return Err(DocumentError::OverlappingTags {
                template: template.display_path(),
            });
        }
        out.push_str(&text[cursor..sub.start]);
        out.push_str(&sub.replacement);
        cursor = sub.end;
    }
    out.push_str(&text[cursor..]);

    warnings.extend(unused.into_iter().map(|field| {
        format!(
            "template {}: field {} not used",
            template.display_path(),
            field
        )
    }));

    Ok(out)
}
