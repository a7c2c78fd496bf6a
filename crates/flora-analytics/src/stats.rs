//! Small statistics helpers shared by the anomaly and rollup modules.

/// Conventional median: the middle value of the sorted set, or the
/// arithmetic mean of the two middle values when the count is even.
/// `None` for an empty set.
pub(crate) fn median(values: &[f64]) -> Option<f64> {
  if values.is_empty() {
    return None;
  }
  let mut sorted = values.to_vec();
  sorted.sort_by(f64::total_cmp);
  let mid = sorted.len() / 2;
  Some(if sorted.len() % 2 == 0 {
    (sorted[mid - 1] + sorted[mid]) / 2.0
  } else {
    sorted[mid]
  })
}

#[cfg(test)]
mod tests {
  use super::median;

  #[test]
  fn median_of_odd_count_is_middle_value() {
    assert_eq!(median(&[23.0, 21.5, 22.5]), Some(22.5));
  }

  #[test]
  fn median_of_even_count_averages_the_middle_pair() {
    assert_eq!(median(&[19.0, 18.0]), Some(18.5));
    assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
  }

  #[test]
  fn median_of_single_value_is_that_value() {
    assert_eq!(median(&[30.0]), Some(30.0));
  }

  #[test]
  fn median_of_empty_set_is_none() {
    assert_eq!(median(&[]), None);
  }
}
