use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The scripting ecosystem an example was written for.
///
/// Derived from the source group a file was discovered in, never from the
/// file's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Language {
    Python,
    R,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::Python, Language::R];

    /// Display name, which doubles as the conventional group directory.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::R => "R",
        }
    }

    /// Extension token used to pick candidate files in a group directory.
    pub fn default_extension(self) -> &'static str {
        match self {
            Language::Python => ".py",
            Language::R => ".r",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "r" => Ok(Language::R),
            other => Err(format!("unknown language '{other}'")),
        }
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Language {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
