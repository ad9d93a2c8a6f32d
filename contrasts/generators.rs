//! # Contrast Matrix Generators
//!
//! One pure function per coding scheme, mapping `(base, n)` to the contrasts matrix
//! for `n` levels whose reference level sits at row `base`. Base indices here are
//! zero-based row positions. Nothing in this module validates levels; the builder
//! in `matrix.rs` guarantees `n >= 2` and `base < n` before calling in.
//!
//! Alongside the generators live the term namers, which label the generated
//! columns from the resolved level list.

use crate::error::ContrastsError;
use crate::level::Level;
use itertools::Itertools;
use ndarray::{Array2, ArrayView2, Axis, s};
use std::iter;

/// Indicator columns for every level except the base: the identity with column `base` dropped.
pub fn dummy(base: usize, n: usize) -> Array2<f64> {
    let kept: Vec<usize> = (0..n).filter(|&col| col != base).collect();
    Array2::<f64>::eye(n).select(Axis(1), &kept)
}

/// Dummy coding with the base row overwritten by -1, so every column sums to zero.
pub fn effects(base: usize, n: usize) -> Array2<f64> {
    let mut matrix = dummy(base, n);
    matrix.row_mut(base).fill(-1.0);
    matrix
}

/// Helmert coding: each level is contrasted with the mean of the levels before it.
///
/// Column `c` holds -1 in rows `0..=c`, `c + 1` in row `c + 1`, and 0 below. The
/// all -1 row (row 0) is then moved to `base` while the other rows keep their
/// relative order.
pub fn helmert(base: usize, n: usize) -> Array2<f64> {
    let mut matrix = Array2::<f64>::zeros((n, n.saturating_sub(1)));
    for col in 0..n.saturating_sub(1) {
        matrix.slice_mut(s![..=col, col]).fill(-1.0);
        matrix[[col + 1, col]] = (col + 1) as f64;
    }

    // Row `r` of the result is row `order[r]` of the canonical matrix.
    let order: Vec<usize> = (1..=base)
        .chain(iter::once(0))
        .chain(base + 1..n)
        .collect();
    matrix.select(Axis(0), &order)
}

/// Successive-difference coding: coefficient `c` estimates the difference between
/// the means of levels `c + 1` and `c`. Independent of any base level.
pub fn successive_differences(n: usize) -> Array2<f64> {
    let total = n as f64;
    Array2::from_shape_fn((n, n.saturating_sub(1)), |(row, col)| {
        let split = col + 1;
        if row < split {
            -((n - split) as f64) / total
        } else {
            split as f64 / total
        }
    })
}

/// One indicator column per level. There is no base.
pub fn full_dummy(n: usize) -> Array2<f64> {
    Array2::eye(n)
}

/// Checks a user-supplied matrix has exactly `(n, n - 1)` shape for `n` levels.
pub fn check_custom_shape(matrix: ArrayView2<f64>, n: usize) -> Result<(), ContrastsError> {
    let expected = (n, n.saturating_sub(1));
    let actual = matrix.dim();
    if actual != expected {
        return Err(ContrastsError::MatrixSize {
            levels: n,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Returns the stored custom matrix unchanged once its shape matches `n` levels.
pub fn custom(matrix: ArrayView2<f64>, n: usize) -> Result<Array2<f64>, ContrastsError> {
    check_custom_shape(matrix, n)?;
    Ok(matrix.to_owned())
}

/// Default term names: every level except the base, in level order.
pub fn names_without_base(levels: &[Level], base: usize) -> Vec<String> {
    levels
        .iter()
        .enumerate()
        .filter(|&(row, _)| row != base)
        .map(|(_, level)| level.to_string())
        .collect()
}

/// Term names for full-rank coding: every level, unchanged.
pub fn names_all_levels(levels: &[Level]) -> Vec<String> {
    levels.iter().map(ToString::to_string).collect()
}

/// Term names for successive differences, e.g. `b - a`.
pub fn names_successive_differences(levels: &[Level]) -> Vec<String> {
    levels
        .iter()
        .tuple_windows()
        .map(|(lower, upper)| format!("{upper} - {lower}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::levels;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_dummy_drops_base_column() {
        assert_eq!(dummy(0, 3), array![[0., 0.], [1., 0.], [0., 1.]]);
        assert_eq!(dummy(1, 3), array![[1., 0.], [0., 0.], [0., 1.]]);
        assert_eq!(dummy(2, 3), array![[1., 0.], [0., 1.], [0., 0.]]);
    }

    #[test]
    fn test_effects_base_row_is_negative_one() {
        assert_eq!(effects(0, 3), array![[-1., -1.], [1., 0.], [0., 1.]]);
        assert_eq!(effects(2, 3), array![[1., 0.], [0., 1.], [-1., -1.]]);
        // Columns of effects coding sum to zero.
        for &sum in effects(1, 5).sum_axis(Axis(0)).iter() {
            assert_eq!(sum, 0.0);
        }
    }

    #[test]
    fn test_helmert_first_base() {
        assert_eq!(
            helmert(0, 4),
            array![
                [-1., -1., -1.],
                [1., -1., -1.],
                [0., 2., -1.],
                [0., 0., 3.]
            ]
        );
    }

    #[test]
    fn test_helmert_moves_all_negative_row_to_base() {
        assert_eq!(
            helmert(2, 4),
            array![
                [1., -1., -1.],
                [0., 2., -1.],
                [-1., -1., -1.],
                [0., 0., 3.]
            ]
        );
        assert_eq!(
            helmert(3, 4),
            array![
                [1., -1., -1.],
                [0., 2., -1.],
                [0., 0., 3.],
                [-1., -1., -1.]
            ]
        );
    }

    #[test]
    fn test_helmert_columns_are_orthogonal_and_centered() {
        let matrix = helmert(1, 5);
        let gram = matrix.t().dot(&matrix);
        for i in 0..4 {
            for j in 0..4 {
                if i != j {
                    assert_eq!(gram[[i, j]], 0.0);
                }
            }
        }
        for &sum in matrix.sum_axis(Axis(0)).iter() {
            assert_eq!(sum, 0.0);
        }
    }

    #[test]
    fn test_successive_differences_three_levels() {
        let expected = array![
            [-2. / 3., -1. / 3.],
            [1. / 3., -1. / 3.],
            [1. / 3., 2. / 3.]
        ];
        assert_abs_diff_eq!(successive_differences(3), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_successive_differences_recover_adjacent_means() {
        // With an intercept, the coefficients are the differences of adjacent means.
        let n = 4;
        let mut full = Array2::<f64>::ones((n, n));
        full.slice_mut(s![.., 1..]).assign(&successive_differences(n));
        let means = array![2.0, 5.0, 4.0, 10.0];

        // Intercept is the grand mean; the rest are 5-2, 4-5, 10-4.
        let beta = array![5.25, 3.0, -1.0, 6.0];
        assert_abs_diff_eq!(full.dot(&beta), means, epsilon = 1e-12);
    }

    #[test]
    fn test_custom_shape_check() {
        let good = array![[1.0], [-1.0]];
        assert_eq!(custom(good.view(), 2).unwrap(), good);

        match custom(good.view(), 3).unwrap_err() {
            ContrastsError::MatrixSize {
                levels,
                expected,
                actual,
            } => {
                assert_eq!(levels, 3);
                assert_eq!(expected, (3, 2));
                assert_eq!(actual, (2, 1));
            }
            other => panic!("Expected MatrixSize error, got {:?}", other),
        }
    }

    #[test]
    fn test_term_names() {
        let lv = levels(["a", "b", "c"]);
        assert_eq!(names_without_base(&lv, 1), vec!["a", "c"]);
        assert_eq!(names_all_levels(&lv), vec!["a", "b", "c"]);
        assert_eq!(names_successive_differences(&lv), vec!["b - a", "c - b"]);
    }
}
