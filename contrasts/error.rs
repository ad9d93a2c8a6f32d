use crate::level::{Level, LevelKind, format_levels};
use thiserror::Error;

/// Every way building or revalidating a contrasts matrix can fail.
///
/// These are configuration or data errors, never transient ones, so nothing here
/// is retried or defaulted. Each variant carries enough context (the offending
/// values and both level lists, or the expected and actual shapes) to fix the
/// input without re-running.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContrastsError {
    #[error(
        "Level type mismatch: the data levels are of type '{expected}' but a level of type '{found}' was supplied."
    )]
    LevelTypeMismatch {
        expected: LevelKind,
        found: LevelKind,
    },

    #[error(
        "Configured levels and data levels differ in {}. Configured levels: {}. Data levels: {}.",
        format_levels(.offending),
        format_levels(.configured),
        format_levels(.data)
    )]
    LevelSetMismatch {
        offending: Vec<Level>,
        configured: Vec<Level>,
        data: Vec<Level>,
    },

    #[error("Levels contain repeated values {}; every level must be distinct.", format_levels(.0))]
    DuplicateLevels(Vec<Level>),

    #[error("Cannot build contrasts for a categorical variable with no levels.")]
    EmptyLevelSet,

    #[error(
        "Cannot build contrasts for a single level ({0}); at least two levels are required."
    )]
    SingleLevel(Level),

    #[error("Base level {base} was not found among the levels {}.", format_levels(.levels))]
    BaseLevelNotFound { base: Level, levels: Vec<Level> },

    #[error(
        "Custom contrasts matrix has shape {actual:?} but {levels} levels require shape {expected:?}."
    )]
    MatrixSize {
        levels: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("The '{scheme}' coding scheme does not take a '{field}' setting.")]
    UnsupportedField {
        scheme: &'static str,
        field: &'static str,
    },

    #[error(
        "The '{0}' coding scheme cannot be used without parameters; construct an instance of it instead."
    )]
    UninstantiatedConfig(&'static str),

    #[error(
        "New data contains levels {} that were not present when the contrasts were built. Original levels: {}. New levels: {}.",
        format_levels(.offending),
        format_levels(.original),
        format_levels(.new)
    )]
    LevelSubset {
        offending: Vec<Level>,
        original: Vec<Level>,
        new: Vec<Level>,
    },
}
