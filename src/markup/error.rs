//! Document defects raised while reading pseudo-tags.
//!
//! A [`DocumentError`] always belongs to one document or template. Callers
//! that know which file they are processing wrap it with that path (see
//! [`PlanError::Document`](crate::plan::PlanError)) before reporting.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("closing tag with no matching open")]
    UnmatchedClose,
    #[error("opening tag with no matching close")]
    UnmatchedOpen,
    #[error("missing `>`")]
    MissingBracket,
    #[error("invalid tag `{0}`")]
    InvalidTag(String),
    #[error("template name required")]
    MissingTemplateName,
    #[error("couldn't parse field `{0}`")]
    InvalidField(String),
    #[error("template {template}: a field tag is missing the attribute `--name`")]
    FieldMissingName { template: String },
    #[error("template {template}: field `{field}` required")]
    FieldRequired { template: String, field: String },
    #[error("template {template}: overlapping tags")]
    OverlappingTags { template: String },
    #[error("template {template}: more than one `--inner-html` tag")]
    MultipleContentSlots { template: String },
    #[error("`{0}` template doesn't exist")]
    UnknownTemplate(String),
    #[error("gave up after resolving {0} template usages")]
    ExpansionLimit(usize),
}
