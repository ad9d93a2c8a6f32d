use gnomon_contrasts::{Coding, ContrastsError, ContrastsMatrix, Level, levels};
use ndarray::{Array2, Axis, array};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn numbered_levels(k: usize) -> Vec<Level> {
    (0..k).map(|i| Level::from(format!("L{i}"))).collect()
}

/// Every scheme that takes a base, with the base set to `base`.
fn codings_with_base(base: &Level) -> Vec<Coding> {
    vec![
        Coding::dummy().with_base(base.clone()).unwrap(),
        Coding::effects().with_base(base.clone()).unwrap(),
        Coding::helmert().with_base(base.clone()).unwrap(),
    ]
}

#[test]
fn shapes_match_level_count_for_random_inputs() {
    let mut rng = StdRng::seed_from_u64(0xC0DE);
    for _ in 0..50 {
        let k = rng.gen_range(2..12);
        let data = numbered_levels(k);
        let base = data[rng.gen_range(0..k)].clone();

        let mut codings = codings_with_base(&base);
        codings.push(Coding::seq_diff());
        for coding in codings {
            let contrasts = ContrastsMatrix::build(&coding, &data).unwrap();
            assert_eq!(contrasts.matrix().dim(), (k, k - 1));
            assert_eq!(contrasts.term_names().len(), k - 1);
            assert_eq!(contrasts.levels(), data.as_slice());
        }

        let full = ContrastsMatrix::build(&Coding::full_dummy(), &data).unwrap();
        assert_eq!(full.matrix().dim(), (k, k));
        assert_eq!(full.term_names().len(), k);
    }
}

#[test]
fn dummy_columns_mark_exactly_one_non_base_level() {
    let data = numbered_levels(5);
    let coding = Coding::dummy().with_base("L2").unwrap();
    let contrasts = ContrastsMatrix::build(&coding, &data).unwrap();
    let matrix = contrasts.matrix();

    assert!(matrix.row(2).iter().all(|&value| value == 0.0));
    for column in matrix.axis_iter(Axis(1)) {
        assert_eq!(column.iter().filter(|&&value| value == 1.0).count(), 1);
        assert_eq!(column.sum(), 1.0);
    }
    for (name, column) in contrasts.term_names().iter().zip(matrix.axis_iter(Axis(1))) {
        let marked = column.iter().position(|&value| value == 1.0).unwrap();
        assert_eq!(name, &data[marked].to_string());
    }
}

#[test]
fn effects_base_row_is_all_negative_one() {
    let data = numbered_levels(4);
    let coding = Coding::effects().with_base("L1").unwrap();
    let contrasts = ContrastsMatrix::build(&coding, &data).unwrap();
    let dummy = ContrastsMatrix::build(&Coding::dummy().with_base("L1").unwrap(), &data).unwrap();

    for (row, (effects_row, dummy_row)) in contrasts
        .matrix()
        .rows()
        .into_iter()
        .zip(dummy.matrix().rows())
        .enumerate()
    {
        if row == 1 {
            assert!(effects_row.iter().all(|&value| value == -1.0));
        } else {
            assert_eq!(effects_row, dummy_row);
        }
    }
}

#[test]
fn helmert_four_levels_first_base() {
    let contrasts =
        ContrastsMatrix::build(&Coding::helmert(), &levels([1_i64, 2, 3, 4])).unwrap();
    assert_eq!(
        contrasts.matrix(),
        array![
            [-1., -1., -1.],
            [1., -1., -1.],
            [0., 2., -1.],
            [0., 0., 3.]
        ]
    );
    assert_eq!(contrasts.term_names(), ["2", "3", "4"]);
}

#[test]
fn full_dummy_is_identity_named_by_levels() {
    let data = levels(["x", "y", "z"]);
    let contrasts = ContrastsMatrix::build(&Coding::full_dummy(), &data).unwrap();
    assert_eq!(contrasts.matrix(), Array2::<f64>::eye(3));
    assert_eq!(contrasts.term_names(), ["x", "y", "z"]);
}

#[test]
fn extra_configured_level_is_rejected() {
    let coding = Coding::dummy().with_levels(["a", "b", "c"]).unwrap();
    match ContrastsMatrix::build(&coding, &levels(["a", "b"])).unwrap_err() {
        ContrastsError::LevelSetMismatch { offending, .. } => {
            assert_eq!(offending, levels(["c"]));
        }
        other => panic!("Expected LevelSetMismatch error, got {:?}", other),
    }
}

#[test]
fn single_level_is_rejected() {
    assert_eq!(
        ContrastsMatrix::build(&Coding::dummy(), &levels(["a"])).unwrap_err(),
        ContrastsError::SingleLevel(Level::from("a"))
    );
}

#[test]
fn revalidation_accepts_subsets_only() {
    let contrasts = ContrastsMatrix::build(&Coding::effects(), &levels(["a", "b", "c"])).unwrap();
    let revalidated = contrasts.revalidate(&levels(["a", "b"])).unwrap();
    assert_eq!(revalidated.matrix(), contrasts.matrix());
    assert_eq!(revalidated, &contrasts);

    let narrow = ContrastsMatrix::build(&Coding::effects(), &levels(["a", "b"])).unwrap();
    match narrow.revalidate(&levels(["a", "b", "c"])).unwrap_err() {
        ContrastsError::LevelSubset {
            offending,
            original,
            new,
        } => {
            assert_eq!(offending, levels(["c"]));
            assert_eq!(original, levels(["a", "b"]));
            assert_eq!(new, levels(["a", "b", "c"]));
        }
        other => panic!("Expected LevelSubset error, got {:?}", other),
    }
}

#[test]
fn full_rank_round_trip_is_scheme_independent() {
    let mut rng = StdRng::seed_from_u64(0xF011);
    for _ in 0..20 {
        let k = rng.gen_range(2..9);
        let data = numbered_levels(k);
        let base = data[rng.gen_range(0..k)].clone();

        let mut codings = codings_with_base(&base);
        codings.push(Coding::seq_diff());
        codings.push(Coding::full_dummy());
        for coding in codings {
            let full = ContrastsMatrix::build(&coding, &data).unwrap().to_full_rank();
            assert_eq!(full.levels(), data.as_slice());
            assert_eq!(full.matrix(), Array2::<f64>::eye(k));
        }
    }
}

#[test]
fn repeated_builds_are_bit_identical() {
    let data = levels(["lo", "mid", "hi", "max"]);
    for coding in [
        Coding::helmert().with_base("hi").unwrap(),
        Coding::seq_diff(),
        Coding::effects(),
    ] {
        let first = ContrastsMatrix::build(&coding, &data).unwrap();
        let second = ContrastsMatrix::build(&coding, &data).unwrap();
        let first_bits: Vec<u64> = first.matrix().iter().map(|v| v.to_bits()).collect();
        let second_bits: Vec<u64> = second.matrix().iter().map(|v| v.to_bits()).collect();
        assert_eq!(first_bits, second_bits);
        assert_eq!(first.term_names(), second.term_names());
    }
}

#[test]
fn encoded_column_reproduces_indicator_product() {
    // Encoding a column must equal multiplying its full-rank indicators by the matrix.
    let data = levels(["a", "b", "c"]);
    let coding = Coding::helmert().with_base("b").unwrap();
    let contrasts = ContrastsMatrix::build(&coding, &data).unwrap();
    let column = levels(["c", "a", "a", "b"]);

    let indicators = contrasts.to_full_rank().encode(&column).unwrap();
    let expected = indicators.dot(&contrasts.matrix());
    assert_eq!(contrasts.encode(&column).unwrap(), expected);
}
