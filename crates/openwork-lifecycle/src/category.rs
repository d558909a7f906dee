//! # Job Categories and Tags
//!
//! Every job carries exactly one category from a mutually-exclusive,
//! collectively-exhaustive set, plus any number of free-form tags. The
//! "exactly one" invariant is enforced by construction: the category is a
//! dedicated field of `Job`, not an entry in the tag list, so no event
//! sequence can produce a job with zero or two categories.

use serde::{Deserialize, Serialize};

use crate::error::LifecycleError;

/// The mutually-exclusive, collectively-exhaustive job category set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Audio production and editing.
    DigitalAudio,
    /// Video production and editing.
    DigitalVideo,
    /// Writing, translation, documentation.
    DigitalText,
    /// Software development.
    DigitalSoftware,
    /// Other digital deliverables.
    DigitalOther,
    /// Physical goods.
    NonDigitalGoods,
    /// In-person or physical-world services.
    NonDigitalServices,
    /// Other non-digital deliverables.
    NonDigitalOther,
}

impl Category {
    /// The short code used on the wire and in tag-style UIs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DigitalAudio => "DA",
            Self::DigitalVideo => "DV",
            Self::DigitalText => "DT",
            Self::DigitalSoftware => "DS",
            Self::DigitalOther => "DO",
            Self::NonDigitalGoods => "NDG",
            Self::NonDigitalServices => "NDS",
            Self::NonDigitalOther => "NDO",
        }
    }

    /// Parse a category from its short code.
    pub fn from_code(code: &str) -> Result<Self, LifecycleError> {
        match code {
            "DA" => Ok(Self::DigitalAudio),
            "DV" => Ok(Self::DigitalVideo),
            "DT" => Ok(Self::DigitalText),
            "DS" => Ok(Self::DigitalSoftware),
            "DO" => Ok(Self::DigitalOther),
            "NDG" => Ok(Self::NonDigitalGoods),
            "NDS" => Ok(Self::NonDigitalServices),
            "NDO" => Ok(Self::NonDigitalOther),
            other => Err(LifecycleError::UnknownCategory(other.to_string())),
        }
    }

    /// All categories, in wire-code order.
    pub const ALL: [Category; 8] = [
        Self::DigitalAudio,
        Self::DigitalVideo,
        Self::DigitalText,
        Self::DigitalSoftware,
        Self::DigitalOther,
        Self::NonDigitalGoods,
        Self::NonDigitalServices,
        Self::NonDigitalOther,
    ];
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A free-form job tag. Tags are search metadata only; they never gate
/// transitions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag(pub String);

impl Tag {
    /// Create a tag from any string-like value.
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// The tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
