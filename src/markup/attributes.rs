//! Attribute parsing for a single opening pseudo-tag.
//!
//! Only the strict `name="value"` form is accepted: double-quoted values,
//! whitespace-separated pairs, nothing else. That is enough for the reserved
//! pseudo-attributes and keeps malformed tags loud instead of half-parsed.

use super::DocumentError;
use regex::Regex;
use std::sync::LazyLock;

/// The leading `<name` and trailing `>` / `/>` of an opening tag.
static TAG_ENDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^<\s*[\w-]+\s*)|(/?>$)").unwrap());

static ATTRIBUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^([$\w-]+)\s*=\s*"([^"]*)"\s*"#).unwrap());

/// Attribute name → value, in the order names first appear.
///
/// A repeated name keeps its first position but takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Parse the attributes of an opening tag given as its literal text,
/// e.g. `<--template --name="card" $title="Hi">`.
pub fn parse_attributes(tag: &str) -> Result<Attributes, DocumentError> {
    let invalid = || DocumentError::InvalidTag(tag.to_string());

    let ends: Vec<_> = TAG_ENDS.find_iter(tag).collect();
    let [head, tail] = ends.as_slice() else {
        return Err(invalid());
    };

    let mut rest = &tag[head.end()..tail.start()];
    let mut attributes = Attributes::default();

    while !rest.is_empty() {
        let caps = ATTRIBUTE.captures(rest).ok_or_else(invalid)?;
        attributes.insert(&caps[1], &caps[2]);
        rest = &rest[caps[0].len()..];
    }

    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(attributes: &Attributes) -> Vec<(&str, &str)> {
        attributes.iter().collect()
    }

    #[test]
    fn tag_without_attributes() {
        assert_eq!(parse_attributes("<--inner-html>").unwrap(), Attributes::default());
        assert_eq!(parse_attributes("<--inner-html/>").unwrap(), Attributes::default());
        assert_eq!(parse_attributes("<--inner-html />").unwrap(), Attributes::default());
    }

    #[test]
    fn attributes_in_order() {
        let attrs =
            parse_attributes(r#"<--template --name="card" $title="Hi" $sub="there">"#).unwrap();
        assert_eq!(
            pairs(&attrs),
            vec![("--name", "card"), ("$title", "Hi"), ("$sub", "there")]
        );
    }

    #[test]
    fn whitespace_around_equals_and_newlines() {
        let tag = "<--template\n    --name = \"card\"\n    $title=\"a b\"\n>";
        let attrs = parse_attributes(tag).unwrap();
        assert_eq!(attrs.get("--name"), Some("card"));
        assert_eq!(attrs.get("$title"), Some("a b"));
    }

    #[test]
    fn self_closing_field_tag() {
        let attrs = parse_attributes(r#"<--field --name="x" --default="y"/>"#).unwrap();
        assert_eq!(attrs.get("--name"), Some("x"));
        assert_eq!(attrs.get("--default"), Some("y"));
    }

    #[test]
    fn value_may_hold_brackets_and_single_quotes() {
        let attrs = parse_attributes(r#"<--field --name="a>b" --default="it's">"#).unwrap();
        assert_eq!(attrs.get("--name"), Some("a>b"));
        assert_eq!(attrs.get("--default"), Some("it's"));
    }

    #[test]
    fn empty_value() {
        let attrs = parse_attributes(r#"<--field --name="x" --default="">"#).unwrap();
        assert_eq!(attrs.get("--default"), Some(""));
    }

    #[test]
    fn duplicate_name_last_wins() {
        let attrs = parse_attributes(r#"<--template --name="a" $x="1" --name="b">"#).unwrap();
        assert_eq!(attrs.get("--name"), Some("b"));
        assert_eq!(attrs.iter().count(), 2);
        assert_eq!(pairs(&attrs)[0], ("--name", "b"));
    }

    #[test]
    fn unquoted_value_is_invalid() {
        let err = parse_attributes("<--field --name=x>").unwrap_err();
        assert_eq!(err, DocumentError::InvalidTag("<--field --name=x>".into()));
    }

    #[test]
    fn single_quoted_value_is_invalid() {
        assert!(parse_attributes("<--field --name='x'>").is_err());
    }

    #[test]
    fn bare_attribute_is_invalid() {
        assert!(parse_attributes(r#"<--field --name="x" disabled>"#).is_err());
    }

    #[test]
    fn missing_closing_bracket_is_invalid() {
        assert!(parse_attributes(r#"<--field --name="x""#).is_err());
    }

    #[test]
    fn missing_tag_name_is_invalid() {
        assert!(parse_attributes(r#"< >"#).is_err());
        assert!(parse_attributes(r#"--name="x">"#).is_err());
    }

    #[test]
    fn invalid_tag_message_quotes_tag() {
        let err = parse_attributes("<--field junk>").unwrap_err();
        assert_eq!(err.to_string(), "invalid tag `<--field junk>`");
    }
}
