//! Tests for `stats` reducers.

use super::stats::*;

#[test]
fn test_empty_input_reduces_to_zero() {
    assert_eq!(sum(&[]), 0.0);
    assert_eq!(mean(&[]), 0.0);
    assert_eq!(min(&[]), 0.0);
    assert_eq!(max(&[]), 0.0);
    assert_eq!(median(&[]), 0.0);
    assert_eq!(population_std_dev(&[]), 0.0);
}

#[test]
fn test_sum_and_mean() {
    let values = [1.0, 2.0, 3.0, 4.0];

    assert_eq!(sum(&values), 10.0);
    assert_eq!(mean(&values), 2.5);
}

#[test]
fn test_min_max_with_negatives() {
    let values = [3.0, -7.5, 12.0, 0.0];

    assert_eq!(min(&values), -7.5);
    assert_eq!(max(&values), 12.0);
}

#[test]
fn test_median_odd_length_is_middle_element() {
    assert_eq!(median(&[9.0, 1.0, 5.0]), 5.0);
}

#[test]
fn test_median_even_length_averages_middle_pair() {
    assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
}

#[test]
fn test_median_does_not_reorder_input() {
    let values = [3.0, 1.0, 2.0];

    let _ = median(&values);

    assert_eq!(values, [3.0, 1.0, 2.0]);
}

#[test]
fn test_population_std_dev_golden_value() {
    let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

    assert!((population_std_dev(&values) - 2.0).abs() < 1e-12);
}

#[test]
fn test_std_dev_of_constant_series_is_zero() {
    assert_eq!(population_std_dev(&[5.0, 5.0, 5.0]), 0.0);
}
