use crate::error::ContrastsError;
use crate::generators;
use crate::level::Level;
use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The name of a coding scheme, without any of its parameters.
///
/// This is what a caller picks from a menu or writes in a config file. It has to be
/// turned into a [`Coding`] before contrasts can be built from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodingKind {
    /// Treatment coding: one indicator column per non-base level.
    Dummy,
    /// Sum-to-zero coding: like dummy, with the base row set to -1.
    Effects,
    /// Each level contrasted with the mean of the levels before it.
    Helmert,
    /// Differences between successive levels.
    SeqDiff,
    /// One indicator column per level, no base. Not collapsed to `k - 1` columns.
    FullDummy,
    /// A user-supplied `k x (k - 1)` matrix.
    Custom,
}

impl CodingKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Dummy => "dummy",
            Self::Effects => "effects",
            Self::Helmert => "helmert",
            Self::SeqDiff => "seqdiff",
            Self::FullDummy => "fulldummy",
            Self::Custom => "custom",
        }
    }

    /// Whether configurations of this kind may name a base level.
    pub fn accepts_base(self) -> bool {
        !matches!(self, Self::SeqDiff | Self::FullDummy)
    }

    /// Whether configurations of this kind may fix an expected level list.
    pub fn accepts_levels(self) -> bool {
        !matches!(self, Self::FullDummy)
    }
}

impl fmt::Display for CodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Scheme {
    Dummy,
    Effects,
    Helmert,
    SeqDiff,
    FullDummy,
    Custom(Array2<f64>),
}

/// An immutable description of how to code one categorical variable.
///
/// Both `base` and `levels` are optional: an unset base resolves to the first level,
/// and unset levels are taken from the data at build time. The only check made at
/// construction is the shape of a custom matrix when its level list is already known.
#[derive(Debug, Clone, PartialEq)]
pub struct Coding {
    scheme: Scheme,
    base: Option<Level>,
    levels: Option<Vec<Level>>,
}

impl Coding {
    fn from_scheme(scheme: Scheme) -> Self {
        Self {
            scheme,
            base: None,
            levels: None,
        }
    }

    pub fn dummy() -> Self {
        Self::from_scheme(Scheme::Dummy)
    }

    pub fn effects() -> Self {
        Self::from_scheme(Scheme::Effects)
    }

    pub fn helmert() -> Self {
        Self::from_scheme(Scheme::Helmert)
    }

    pub fn seq_diff() -> Self {
        Self::from_scheme(Scheme::SeqDiff)
    }

    pub fn full_dummy() -> Self {
        Self::from_scheme(Scheme::FullDummy)
    }

    /// A custom scheme returning `matrix` as-is. Its shape is checked once the level
    /// count is known, either here via [`Coding::with_levels`] or at build time.
    pub fn custom(matrix: Array2<f64>) -> Self {
        Self::from_scheme(Scheme::Custom(matrix))
    }

    /// Sets the reference level.
    pub fn with_base(self, base: impl Into<Level>) -> Result<Self, ContrastsError> {
        let kind = self.kind();
        if !kind.accepts_base() {
            return Err(ContrastsError::UnsupportedField {
                scheme: kind.name(),
                field: "base",
            });
        }
        Ok(Self {
            base: Some(base.into()),
            ..self
        })
    }

    /// Fixes the expected levels and their order.
    ///
    /// For custom coding this is where the matrix shape is first validated.
    pub fn with_levels<I, L>(self, levels: I) -> Result<Self, ContrastsError>
    where
        I: IntoIterator<Item = L>,
        L: Into<Level>,
    {
        let kind = self.kind();
        if !kind.accepts_levels() {
            return Err(ContrastsError::UnsupportedField {
                scheme: kind.name(),
                field: "levels",
            });
        }
        let levels: Vec<Level> = levels.into_iter().map(Into::into).collect();
        if let Scheme::Custom(matrix) = &self.scheme {
            generators::check_custom_shape(matrix.view(), levels.len())?;
        }
        Ok(Self {
            levels: Some(levels),
            ..self
        })
    }

    pub fn kind(&self) -> CodingKind {
        match self.scheme {
            Scheme::Dummy => CodingKind::Dummy,
            Scheme::Effects => CodingKind::Effects,
            Scheme::Helmert => CodingKind::Helmert,
            Scheme::SeqDiff => CodingKind::SeqDiff,
            Scheme::FullDummy => CodingKind::FullDummy,
            Scheme::Custom(_) => CodingKind::Custom,
        }
    }

    pub fn base(&self) -> Option<&Level> {
        self.base.as_ref()
    }

    pub fn levels(&self) -> Option<&[Level]> {
        self.levels.as_deref()
    }

    /// The user-supplied matrix, for custom coding only.
    pub fn custom_matrix(&self) -> Option<ArrayView2<'_, f64>> {
        match &self.scheme {
            Scheme::Custom(matrix) => Some(matrix.view()),
            _ => None,
        }
    }

    /// Generates the contrasts matrix for `n` levels with the base at row `base`.
    pub(crate) fn generate(&self, base: usize, n: usize) -> Result<Array2<f64>, ContrastsError> {
        Ok(match &self.scheme {
            Scheme::Dummy => generators::dummy(base, n),
            Scheme::Effects => generators::effects(base, n),
            Scheme::Helmert => generators::helmert(base, n),
            Scheme::SeqDiff => generators::successive_differences(n),
            Scheme::FullDummy => generators::full_dummy(n),
            Scheme::Custom(matrix) => generators::custom(matrix.view(), n)?,
        })
    }

    /// Labels for the generated columns, aligned with the matrix columns.
    pub(crate) fn term_names(&self, levels: &[Level], base: usize) -> Vec<String> {
        match self.scheme {
            Scheme::FullDummy => generators::names_all_levels(levels),
            Scheme::SeqDiff => generators::names_successive_differences(levels),
            _ => generators::names_without_base(levels, base),
        }
    }
}

/// Instantiates the default configuration of a scheme. Custom coding has no default
/// matrix, so naming it alone is an error.
impl TryFrom<CodingKind> for Coding {
    type Error = ContrastsError;

    fn try_from(kind: CodingKind) -> Result<Self, Self::Error> {
        Ok(match kind {
            CodingKind::Dummy => Self::dummy(),
            CodingKind::Effects => Self::effects(),
            CodingKind::Helmert => Self::helmert(),
            CodingKind::SeqDiff => Self::seq_diff(),
            CodingKind::FullDummy => Self::full_dummy(),
            CodingKind::Custom => return Err(ContrastsError::UninstantiatedConfig(kind.name())),
        })
    }
}

impl Default for Coding {
    fn default() -> Self {
        Self::dummy()
    }
}
