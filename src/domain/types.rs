//! Shared domain enumerations.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// How a deployment highlights posts.
///
/// `Single` keeps one optional featured post for the whole store. `Starred`
/// keeps a flag per post, and any number of posts may carry it. A store runs in
/// exactly one mode for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeaturedMode {
    Single,
    #[default]
    Starred,
}

impl FeaturedMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FeaturedMode::Single => "single",
            FeaturedMode::Starred => "starred",
        }
    }
}

impl fmt::Display for FeaturedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeaturedMode {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" | "featured" => Ok(FeaturedMode::Single),
            "starred" | "multi" => Ok(FeaturedMode::Starred),
            other => Err(DomainError::validation(format!(
                "unknown featured mode `{other}` (expected `single` or `starred`)"
            ))),
        }
    }
}
