//! # Contrasts Matrices
//!
//! Builds and validates the contrasts matrix for one categorical variable: the
//! `k x (k - 1)` (or `k x k` for full-rank coding) matrix whose rows are indexed by
//! the variable's levels and whose columns become model-matrix columns.
//!
//! A [`ContrastsMatrix`] is built once, from a [`Coding`] and the levels observed in
//! the training data, and is read-only afterwards. When the same variable is seen
//! again in new data it is revalidated, never rebuilt, so the encoding used for
//! scoring is exactly the one used for fitting.

use crate::coding::Coding;
use crate::error::ContrastsError;
use crate::generators;
use crate::level::Level;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use ndarray::{Array2, ArrayView2, Axis};

/// The validated contrasts for one categorical variable.
#[derive(Debug, Clone)]
pub struct ContrastsMatrix {
    matrix: Array2<f64>,
    term_names: Vec<String>,
    levels: Vec<Level>,
    coding: Coding,
    /// Row of each level in `matrix`.
    row_index: AHashMap<Level, usize>,
}

impl PartialEq for ContrastsMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.matrix == other.matrix
            && self.term_names == other.term_names
            && self.levels == other.levels
            && self.coding == other.coding
    }
}

impl ContrastsMatrix {
    /// Builds the contrasts for a variable whose data contains `data_levels`.
    ///
    /// The effective levels are the coding's configured levels if it has any, and
    /// `data_levels` otherwise. They must have the same element type as the data,
    /// contain no duplicates, and be exactly the same set as `data_levels`. At least
    /// two levels are required, and an explicit base must be one of them.
    ///
    /// # Arguments
    /// * `coding`: The scheme and its optional base and levels.
    /// * `data_levels`: The distinct levels observed in the data column, in the
    ///   level provider's order.
    pub fn build(coding: &Coding, data_levels: &[Level]) -> Result<Self, ContrastsError> {
        let levels = coding.levels().unwrap_or(data_levels);

        internal::check_kinds(levels, data_levels)?;
        internal::check_distinct(levels)?;
        internal::check_distinct(data_levels)?;
        internal::check_same_set(levels, data_levels)?;

        let n = levels.len();
        match levels {
            [] => return Err(ContrastsError::EmptyLevelSet),
            [only] => return Err(ContrastsError::SingleLevel(only.clone())),
            _ => {}
        }

        let base = internal::resolve_base(coding.base(), levels)?;
        log::debug!(
            "Building {} contrasts over {} levels with base '{}' at row {}",
            coding.kind(),
            n,
            levels[base],
            base
        );

        let term_names = coding.term_names(levels, base);
        let matrix = coding.generate(base, n)?;
        log::trace!(
            "Generated {}x{} contrasts matrix with terms {:?}",
            matrix.nrows(),
            matrix.ncols(),
            term_names
        );

        Ok(Self::assemble(
            matrix,
            term_names,
            levels.to_vec(),
            coding.clone(),
        ))
    }

    fn assemble(
        matrix: Array2<f64>,
        term_names: Vec<String>,
        levels: Vec<Level>,
        coding: Coding,
    ) -> Self {
        let row_index = levels
            .iter()
            .enumerate()
            .map(|(row, level)| (level.clone(), row))
            .collect();
        Self {
            matrix,
            term_names,
            levels,
            coding,
            row_index,
        }
    }

    /// Checks these contrasts still apply to a new data column with `new_levels`.
    ///
    /// New data may use fewer levels than the training data but never a level the
    /// contrasts were not built for. Nothing is recomputed: on success the same
    /// contrasts are returned.
    pub fn revalidate(&self, new_levels: &[Level]) -> Result<&Self, ContrastsError> {
        let offending: Vec<Level> = new_levels
            .iter()
            .filter(|level| !self.row_index.contains_key(*level))
            .unique()
            .cloned()
            .collect();
        if !offending.is_empty() {
            return Err(ContrastsError::LevelSubset {
                offending,
                original: self.levels.clone(),
                new: new_levels.to_vec(),
            });
        }
        Ok(self)
    }

    /// The full-rank (one column per level) equivalent of these contrasts, over
    /// the same levels in the same order.
    pub fn to_full_rank(&self) -> Self {
        Self::assemble(
            generators::full_dummy(self.levels.len()),
            generators::names_all_levels(&self.levels),
            self.levels.clone(),
            Coding::full_dummy(),
        )
    }

    /// Looks up the contrasts row of every value in a data column.
    ///
    /// The result has one row per observation and one column per term. Values
    /// outside the known levels are rejected exactly as [`Self::revalidate`] would.
    pub fn encode(&self, column: &[Level]) -> Result<Array2<f64>, ContrastsError> {
        let observed: Vec<Level> = column.iter().unique().cloned().collect();
        self.revalidate(&observed)?;

        let rows: Vec<usize> = column
            .iter()
            .filter_map(|value| self.row_index.get(value).copied())
            .collect();
        Ok(self.matrix.select(Axis(0), &rows))
    }

    /// The row of `level` in the matrix, if it is one of the levels.
    pub fn row_of(&self, level: &Level) -> Option<usize> {
        self.row_index.get(level).copied()
    }

    pub fn matrix(&self) -> ArrayView2<'_, f64> {
        self.matrix.view()
    }

    pub fn term_names(&self) -> &[String] {
        &self.term_names
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn coding(&self) -> &Coding {
        &self.coding
    }
}

/// Validation steps of `ContrastsMatrix::build`.
mod internal {
    use super::*;

    /// Every level, configured or observed, must share the data's element type.
    pub(super) fn check_kinds(levels: &[Level], data_levels: &[Level]) -> Result<(), ContrastsError> {
        let Some(expected) = data_levels.first().map(Level::kind) else {
            return Ok(());
        };
        let found = data_levels
            .iter()
            .chain(levels)
            .map(Level::kind)
            .find(|&kind| kind != expected);
        match found {
            Some(found) => Err(ContrastsError::LevelTypeMismatch { expected, found }),
            None => Ok(()),
        }
    }

    pub(super) fn check_distinct(levels: &[Level]) -> Result<(), ContrastsError> {
        let repeated: Vec<Level> = levels.iter().duplicates().cloned().collect();
        if repeated.is_empty() {
            Ok(())
        } else {
            Err(ContrastsError::DuplicateLevels(repeated))
        }
    }

    /// Configured and observed levels must be the same set: an extra configured level
    /// would produce an all-zero model column and a missing one an undefined row.
    pub(super) fn check_same_set(
        levels: &[Level],
        data_levels: &[Level],
    ) -> Result<(), ContrastsError> {
        let configured: AHashSet<&Level> = levels.iter().collect();
        let observed: AHashSet<&Level> = data_levels.iter().collect();

        let offending: Vec<Level> = levels
            .iter()
            .filter(|level| !observed.contains(level))
            .chain(data_levels.iter().filter(|level| !configured.contains(level)))
            .cloned()
            .collect();
        if offending.is_empty() {
            return Ok(());
        }
        Err(ContrastsError::LevelSetMismatch {
            offending,
            configured: levels.to_vec(),
            data: data_levels.to_vec(),
        })
    }

    /// Zero-based row of the base level; the first level when no base is set.
    pub(super) fn resolve_base(base: Option<&Level>, levels: &[Level]) -> Result<usize, ContrastsError> {
        let Some(base) = base else {
            return Ok(0);
        };
        levels
            .iter()
            .position(|level| level == base)
            .ok_or_else(|| ContrastsError::BaseLevelNotFound {
                base: base.clone(),
                levels: levels.to_vec(),
            })
    }
}
