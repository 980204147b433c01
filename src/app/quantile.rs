/// Quantile thresholds for one sample set. `boundaries[i]` is the upper
/// (inclusive) edge of bin `i`; values above every threshold fall in the last
/// bin.
#[derive(Clone, Debug, Default, PartialEq)]
pub(super) struct QuantileScale {
    boundaries: Vec<f64>,
    bins: usize,
}

impl QuantileScale {
    pub(super) fn from_samples(samples: impl IntoIterator<Item = f64>, bins: usize) -> Self {
        Self {
            boundaries: compute_boundaries(samples, bins),
            bins,
        }
    }

    #[cfg(test)]
    pub(super) fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub(super) fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub(super) fn bin(&self, value: Option<f64>) -> usize {
        classify(value, &self.boundaries)
    }

    /// One-based bin, as shown to users (`Q1`..`Qn`).
    pub(super) fn rank(&self, value: Option<f64>) -> usize {
        self.bin(value) + 1
    }

    pub(super) fn bins(&self) -> usize {
        self.bins
    }
}

/// `bins - 1` non-decreasing thresholds. Non-finite samples are ignored and
/// an empty sample yields no thresholds.
pub(super) fn compute_boundaries(samples: impl IntoIterator<Item = f64>, bins: usize) -> Vec<f64> {
    let mut sorted = samples
        .into_iter()
        .filter(|value| value.is_finite())
        .collect::<Vec<_>>();
    if sorted.is_empty() || bins < 2 {
        return Vec::new();
    }
    sorted.sort_by(f64::total_cmp);

    let last = sorted.len() - 1;
    (1..bins)
        .map(|cut| sorted[((cut * last) / bins).min(last)])
        .collect()
}

/// Zero-based bin for `value`. Unknown values and empty boundaries map to the
/// lowest bin.
pub(super) fn classify(value: Option<f64>, boundaries: &[f64]) -> usize {
    let Some(value) = value.filter(|value| !value.is_nan()) else {
        return 0;
    };

    boundaries
        .iter()
        .position(|threshold| value <= *threshold)
        .unwrap_or(boundaries.len())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn ten_samples_in_five_bins() {
        let scale = QuantileScale::from_samples((1..=10).map(f64::from), 5);

        assert_eq!(scale.boundaries(), [2.0, 4.0, 6.0, 8.0]);
        assert_eq!(scale.rank(Some(2.0)), 1);
        assert_eq!(scale.rank(Some(2.5)), 2);
        assert_eq!(scale.rank(Some(10.0)), 5);
    }

    #[test]
    fn maximum_of_three_lands_in_top_bin() {
        let scale = QuantileScale::from_samples([9.0, 1.0, 5.0], 5);
        assert_eq!(scale.rank(Some(9.0)), 5);
        assert_eq!(scale.rank(Some(1.0)), 1);
    }

    #[test]
    fn unknown_values_use_the_lowest_bin() {
        let scale = QuantileScale::from_samples([1.0, 2.0, 3.0], 6);
        assert_eq!(scale.bin(None), 0);
        assert_eq!(scale.bin(Some(f64::NAN)), 0);
    }

    #[test]
    fn empty_samples_give_no_boundaries() {
        let scale = QuantileScale::from_samples([f64::NAN], 5);
        assert!(scale.is_empty());
        assert_eq!(scale.rank(Some(42.0)), 1);
    }

    #[test]
    fn sample_order_does_not_matter() {
        let forward = compute_boundaries([3.0, 1.0, 4.0, 1.5, 9.0, 2.6], 5);
        let backward = compute_boundaries([2.6, 9.0, 1.5, 4.0, 1.0, 3.0], 5);
        assert_eq!(forward, backward);
    }

    proptest! {
        #[test]
        fn boundaries_are_sorted_and_sized(
            samples in prop::collection::vec(-1.0e6f64..1.0e6, 1..200),
            bins in 2usize..10,
        ) {
            let boundaries = compute_boundaries(samples, bins);
            prop_assert_eq!(boundaries.len(), bins - 1);
            prop_assert!(boundaries.windows(2).all(|pair| pair[0] <= pair[1]));
        }

        #[test]
        fn classification_is_monotonic(
            samples in prop::collection::vec(-100.0f64..100.0, 1..100),
            a in -150.0f64..150.0,
            b in -150.0f64..150.0,
        ) {
            let boundaries = compute_boundaries(samples, 5);
            let (low, high) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify(Some(low), &boundaries) <= classify(Some(high), &boundaries));
        }
    }
}
