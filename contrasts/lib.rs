#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]

//! Contrast coding for categorical model terms.
//!
//! Turns the ordered levels of a categorical variable and a [`Coding`] scheme into a
//! validated [`ContrastsMatrix`]: the matrix mapping the variable's indicator encoding
//! onto design-matrix columns, together with labels for those columns.

pub mod coding;
pub mod config;
pub mod error;
pub mod generators;
pub mod level;
pub mod matrix;

pub use coding::{Coding, CodingKind};
pub use config::{ConfigError, ContrastsConfig};
pub use error::ContrastsError;
pub use level::{Level, LevelKind, levels};
pub use matrix::ContrastsMatrix;
