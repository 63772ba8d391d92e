//! Names of the reserved pseudo-tags and pseudo-attributes.
//!
//! Everything the expander recognizes carries the `--` prefix so it can never
//! collide with real HTML. Matching is case-sensitive.

/// Paired tag that invokes a template: `<--template --name="card">…</--template>`.
pub const TEMPLATE_TAG: &str = "--template";
/// Void tag marking a field inside a template.
pub const FIELD_TAG: &str = "--field";
/// Void tag marking where a usage's inner content lands inside a template.
pub const INNER_HTML_TAG: &str = "--inner-html";

/// Names the template (on usages) or the field (on field tags).
pub const NAME_ATTR: &str = "--name";
/// Fallback value of a field tag.
pub const DEFAULT_ATTR: &str = "--default";
/// Bulk field list on a usage: `name: value; name: value`.
pub const FIELDS_ATTR: &str = "--fields";
/// Prefix of a single-field attribute on a usage: `$title="Hi"`.
pub const FIELD_ATTR_PREFIX: char = '$';
