//! Language codes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{DragomanError, Result};

/// A validated, lowercase language tag as understood by the providers
/// (`ar`, `am`, `en`, `zh-cn`, `auto`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Longest tag accepted.
    const MAX_LEN: usize = 12;

    /// Parse and normalise a language tag.
    ///
    /// Tags are lowercased; they must be 2–12 ASCII letters or hyphens and
    /// start with a letter.
    pub fn new(code: impl AsRef<str>) -> Result<Self> {
        let code = code.as_ref().trim().to_ascii_lowercase();
        let valid = (2..=Self::MAX_LEN).contains(&code.len())
            && code.starts_with(|c: char| c.is_ascii_alphabetic())
            && code.chars().all(|c| c.is_ascii_alphabetic() || c == '-');
        if !valid {
            return Err(DragomanError::InvalidInput(format!(
                "invalid language code: {code:?}"
            )));
        }
        Ok(Self(code))
    }

    /// Arabic.
    pub fn arabic() -> Self {
        Self("ar".into())
    }

    /// Amharic.
    pub fn amharic() -> Self {
        Self("am".into())
    }

    /// English.
    pub fn english() -> Self {
        Self("en".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = DragomanError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = DragomanError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

/// Which of the two language selectors an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageSlot {
    Source,
    Target,
}
