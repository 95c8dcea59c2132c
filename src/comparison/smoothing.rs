// Moving-average smoothing for plotted series

/// Centered moving average with `neighbors` values on each side
///
/// Windows are truncated at the ends of the series, so the output has the
/// same length as the input. `neighbors == 0` returns the input unchanged.
pub fn smooth(values: &[f64], neighbors: usize) -> Vec<f64> {
    if neighbors == 0 || values.len() < 3 {
        return values.to_vec();
    }

    let last = values.len() - 1;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(neighbors);
            let hi = (i + neighbors).min(last);
            let window = &values[lo..=hi];
            window.iter().sum::<f64>() / window.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_neighbors_is_identity() {
        let values = vec![1.0, 5.0, 2.0, 8.0];
        assert_eq!(smooth(&values, 0), values);
    }

    #[test]
    fn test_constant_series_unchanged() {
        assert_eq!(smooth(&[3.0; 6], 2), vec![3.0; 6]);
    }

    #[test]
    fn test_edges_use_truncated_window() {
        let smoothed = smooth(&[0.0, 3.0, 6.0, 9.0], 1);
        assert_eq!(smoothed, vec![1.5, 3.0, 6.0, 7.5]);
    }

    #[test]
    fn test_spike_is_flattened() {
        let smoothed = smooth(&[0.0, 0.0, 10.0, 0.0, 0.0], 2);
        assert!(smoothed[2] < 10.0);
        assert!((smoothed[2] - 2.0).abs() < 1e-12);
    }
}
