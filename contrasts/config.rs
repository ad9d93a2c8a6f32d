//! # Contrasts Configuration
//!
//! Reads per-variable coding choices from a TOML document so the caller's policy
//! (which scheme, which base, which level order) can live in a file instead of code:
//!
//! ```toml
//! [variables.treatment]
//! scheme = "effects"
//! base = "placebo"
//! levels = ["placebo", "low", "high"]
//!
//! [variables.site]
//! scheme = "custom"
//! matrix = [[1.0], [-1.0]]
//! ```
//!
//! Every table is validated into a [`Coding`] at load time, so a bad config is
//! reported before any data is touched. Variables without a table use dummy coding.

use crate::coding::{Coding, CodingKind};
use crate::error::ContrastsError;
use crate::level::Level;
use crate::matrix::ContrastsMatrix;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// One `[variables.<name>]` table as written in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CodingTable {
    pub scheme: CodingKind,
    #[serde(default)]
    pub base: Option<Level>,
    #[serde(default)]
    pub levels: Option<Vec<Level>>,
    /// Row-major contrasts matrix, required for `custom` and rejected otherwise.
    #[serde(default)]
    pub matrix: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigDocument {
    #[serde(default)]
    variables: HashMap<String, CodingTable>,
}

/// Custom error type for loading a contrasts configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read contrasts config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML contrasts config: {0}")]
    TomlParseError(#[from] toml::de::Error),
    #[error("Custom matrix for variable '{0}' has rows of unequal length.")]
    RaggedMatrix(String),
    #[error("Invalid coding for variable '{variable}': {source}")]
    InvalidCoding {
        variable: String,
        #[source]
        source: ContrastsError,
    },
}

impl CodingTable {
    /// Validates this table into a coding for `variable`.
    pub fn to_coding(&self, variable: &str) -> Result<Coding, ConfigError> {
        let invalid = |source| ConfigError::InvalidCoding {
            variable: variable.to_string(),
            source,
        };

        let mut coding = match (self.scheme, &self.matrix) {
            (CodingKind::Custom, Some(rows)) => Coding::custom(matrix_from_rows(variable, rows)?),
            (kind, None) => Coding::try_from(kind).map_err(invalid)?,
            (kind, Some(_)) => {
                return Err(invalid(ContrastsError::UnsupportedField {
                    scheme: kind.name(),
                    field: "matrix",
                }));
            }
        };
        if let Some(base) = &self.base {
            coding = coding.with_base(base.clone()).map_err(invalid)?;
        }
        if let Some(levels) = &self.levels {
            coding = coding.with_levels(levels.iter().cloned()).map_err(invalid)?;
        }
        Ok(coding)
    }
}

fn matrix_from_rows(variable: &str, rows: &[Vec<f64>]) -> Result<Array2<f64>, ConfigError> {
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|row| row.len() != ncols) {
        return Err(ConfigError::RaggedMatrix(variable.to_string()));
    }
    let values: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((rows.len(), ncols), values)
        .map_err(|_| ConfigError::RaggedMatrix(variable.to_string()))
}

/// Validated coding choices for a set of named variables.
#[derive(Debug, Clone, Default)]
pub struct ContrastsConfig {
    codings: HashMap<String, Coding>,
}

impl ContrastsConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let document: ConfigDocument = toml::from_str(text)?;
        let codings = document
            .variables
            .iter()
            .map(|(variable, table)| Ok((variable.clone(), table.to_coding(variable)?)))
            .collect::<Result<HashMap<_, _>, ConfigError>>()?;
        log::debug!("Loaded codings for {} variables", codings.len());
        Ok(Self { codings })
    }

    /// Loads a contrasts configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// The configured coding for `variable`, or dummy coding if it has none.
    pub fn coding_for(&self, variable: &str) -> Coding {
        self.codings.get(variable).cloned().unwrap_or_default()
    }

    /// Builds the contrasts for `variable` from the levels observed in its data column.
    pub fn build(
        &self,
        variable: &str,
        data_levels: &[Level],
    ) -> Result<ContrastsMatrix, ContrastsError> {
        ContrastsMatrix::build(&self.coding_for(variable), data_levels)
    }

    pub fn len(&self) -> usize {
        self.codings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codings.is_empty()
    }
}
