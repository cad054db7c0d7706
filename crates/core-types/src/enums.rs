use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminates the two roles a registered path can play in a transfer:
/// where files come from, or where they end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Source,
    Sink,
}

impl PathKind {
    /// Returns the lowercase discriminator stored in the `paths.kind` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            PathKind::Source => "source",
            PathKind::Sink => "sink",
        }
    }

    /// Returns the opposite role of the pairing.
    pub fn opposite(&self) -> Self {
        match self {
            PathKind::Source => PathKind::Sink,
            PathKind::Sink => PathKind::Source,
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(PathKind::Source),
            "sink" => Ok(PathKind::Sink),
            other => Err(CoreError::InvalidInput(
                "path kind".to_string(),
                other.to_string(),
            )),
        }
    }
}

impl TryFrom<String> for PathKind {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
