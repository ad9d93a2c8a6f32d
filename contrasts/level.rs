use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// One distinct value a categorical variable can take.
///
/// Levels are dynamically typed because configured levels (from a TOML file or the
/// command line) and the levels observed in a data column arrive independently and
/// are allowed to disagree. Floating-point levels are not representable: they have
/// no total equality and would make set comparisons unreliable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Level {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// The element type of a [`Level`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelKind {
    Bool,
    Int,
    Str,
}

impl Level {
    pub fn kind(&self) -> LevelKind {
        match self {
            Self::Bool(_) => LevelKind::Bool,
            Self::Int(_) => LevelKind::Int,
            Self::Str(_) => LevelKind::Str,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
        }
    }
}

impl fmt::Display for LevelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "bool",
            Self::Int => "integer",
            Self::Str => "string",
        })
    }
}

/// Parses a raw token the way a text column would be read: `true`/`false` become
/// booleans, anything that fits an `i64` becomes an integer, and the rest stays a string.
impl FromStr for Level {
    type Err = Infallible;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Ok(match token {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => match token.parse::<i64>() {
                Ok(value) => Self::Int(value),
                Err(_) => Self::Str(token.to_string()),
            },
        })
    }
}

impl From<&str> for Level {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Level {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for Level {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for Level {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Converts anything level-like into an owned level list.
pub fn levels<I, L>(values: I) -> Vec<Level>
where
    I: IntoIterator<Item = L>,
    L: Into<Level>,
{
    values.into_iter().map(Into::into).collect()
}

/// Renders a level list for error messages, e.g. `[a, b, c]`.
pub(crate) fn format_levels(levels: &[Level]) -> String {
    format!("[{}]", levels.iter().join(", "))
}
