//! AB-join engine output validated against the brute-force oracle.

mod common;

use common::{assert_indices_consistent, assert_profiles_match, pseudo_random_series};
use matrix_profile::{ab_join, naive};

const T_A: [f64; 4] = [9.0, 8100.0, -60.0, 7.0];
const T_B: [f64; 7] = [584.0, -11.0, 23.0, 79.0, 1001.0, 0.0, -19.0];

#[test]
fn test_ab_join_matches_oracle_small() {
    let m = 3;
    let (got_a, got_b) = ab_join(&T_A, &T_B, m).unwrap();
    let (want_a, want_b) = naive::ab_join(&T_A, &T_B, m).unwrap();
    assert_profiles_match("ab/a-side", &got_a, &want_a);
    assert_profiles_match("ab/b-side", &got_b, &want_b);
    assert_indices_consistent("ab/a-side", &got_a, &T_A, &T_B);
    assert_indices_consistent("ab/b-side", &got_b, &T_B, &T_A);
}

#[test]
fn test_ab_join_matches_oracle_random() {
    for (n_a, n_b, m, seed) in [(8, 64, 3, 3), (60, 90, 9, 5), (120, 80, 15, 17)] {
        let a = pseudo_random_series(n_a, seed);
        let b = pseudo_random_series(n_b, seed + 1);
        let (got_a, got_b) = ab_join(&a, &b, m).unwrap();
        let (want_a, want_b) = naive::ab_join(&a, &b, m).unwrap();
        let tag = format!("ab n_a={n_a} n_b={n_b} m={m}");
        assert_profiles_match(&format!("{tag}/a"), &got_a, &want_a);
        assert_profiles_match(&format!("{tag}/b"), &got_b, &want_b);
    }
}

#[test]
fn test_ab_join_role_swap_consistent_with_oracle() {
    // Joining (A, B) and (B, A) must reproduce distances for matching roles.
    let a = pseudo_random_series(40, 23);
    let b = pseudo_random_series(55, 29);
    let m = 6;

    let (fwd_a, fwd_b) = ab_join(&a, &b, m).unwrap();
    let (rev_b, rev_a) = ab_join(&b, &a, m).unwrap();
    let (oracle_a, oracle_b) = naive::ab_join(&a, &b, m).unwrap();

    assert_profiles_match("swap/a-fwd", &fwd_a, &oracle_a);
    assert_profiles_match("swap/a-rev", &rev_a, &oracle_a);
    assert_profiles_match("swap/b-fwd", &fwd_b, &oracle_b);
    assert_profiles_match("swap/b-rev", &rev_b, &oracle_b);
}

#[test]
fn test_ab_join_one_constant_input() {
    // All-constant A: every A window hits the fixed fallback distance
    // against non-constant B windows.
    let a = vec![4.2; 10];
    let b = pseudo_random_series(30, 31);
    let m = 3;
    let (got_a, got_b) = ab_join(&a, &b, m).unwrap();
    let (want_a, want_b) = naive::ab_join(&a, &b, m).unwrap();
    assert_profiles_match("const-a/a", &got_a, &want_a);
    assert_profiles_match("const-a/b", &got_b, &want_b);

    let expected = (2.0 * m as f64).sqrt();
    for &d in &got_a.distances {
        assert!((d - expected).abs() < 1e-9);
    }
}

#[test]
fn test_ab_join_two_constant_regions() {
    let a = [vec![0.0; 10], vec![1.0; 10]].concat();
    let b = [vec![0.0; 20], vec![1.0; 5]].concat();
    let m = 3;
    let (got_a, got_b) = ab_join(&a, &b, m).unwrap();
    let (want_a, want_b) = naive::ab_join(&a, &b, m).unwrap();
    assert_profiles_match("two-const/a", &got_a, &want_a);
    assert_profiles_match("two-const/b", &got_b, &want_b);
    // Constant windows exist on both sides, so minima are exactly zero.
    assert!(got_a.distances[0].abs() < 1e-12);
    assert!(got_a.distances.iter().all(|d| !d.is_nan()));
}
