//! Structural reading of the pseudo-tag vocabulary.
//!
//! There is no DOM here. Tags are found by scanning text, which keeps the
//! surrounding markup byte-for-byte intact and lets fields appear anywhere,
//! including inside attribute values of ordinary HTML.
//!
//! | Piece | Role |
//! |---|---|
//! | [`locate`] | quote-aware scan to `>` and innermost open/close pairing |
//! | [`attributes`] | `name="value"` parsing of one opening tag |
//! | [`grammar`] | reserved tag and attribute names |

pub mod attributes;
mod error;
pub mod grammar;
pub mod locate;

pub use attributes::{Attributes, parse_attributes};
pub use error::DocumentError;
pub use locate::{TagSpan, find_tag, scan_tag_end};
