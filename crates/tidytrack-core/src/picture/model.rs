//! Picture domain model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which end of a session a picture documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PictureType {
    Before,
    After,
}

impl PictureType {
    /// Returns the persisted tag for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            PictureType::Before => "BEFORE",
            PictureType::After => "AFTER",
        }
    }

    /// Parses a persisted tag back into a picture type.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "BEFORE" => Some(PictureType::Before),
            "AFTER" => Some(PictureType::After),
            _ => None,
        }
    }
}

impl fmt::Display for PictureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An encoded image captured at the start or end of a session.
///
/// The payload is opaque to the domain: usually a `data:` URL, but any string
/// produced by a camera device is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub picture_id: String,
    pub session_id: String,
    pub picture_data: String,
    pub picture_type: PictureType,
}
