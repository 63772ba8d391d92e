//! Shared types passed between the planning, build and output stages.

use std::fmt;

/// A non-fatal finding, collected during a run and reported after it.
///
/// `context` names the document that was being processed when the warning
/// was raised, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub context: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            context: None,
            message: message.into(),
        }
    }

    pub fn in_document(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            context: Some(context.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(context) => write!(f, "[ {} ] {}", context, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
