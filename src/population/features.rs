#[cfg(test)]
#[path = "../../tests/unit/population/features_test.rs"]
mod features_test;

use crate::population::Metrics;
use crate::utils::Float;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A function which derives a feature signature from candidate code and its metrics.
/// Each dimension is expected to be in the `[0, 1]` range; out of range values are clamped
/// during bucketing.
pub type FeatureExtractor = Arc<dyn Fn(&str, &Metrics) -> Vec<Float> + Send + Sync>;

/// A key of a cell in an island's feature grid: one bin index per feature dimension.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BucketKey(pub Vec<usize>);

/// Discretizes feature signatures into grid buckets (MAP-Elites style).
#[derive(Clone)]
pub struct FeatureSpace {
    bins: usize,
    extractor: FeatureExtractor,
}

impl FeatureSpace {
    /// Creates a feature space with a given amount of bins per dimension.
    pub fn new(bins: usize, extractor: FeatureExtractor) -> Self {
        assert!(bins > 0);
        Self { bins, extractor }
    }

    /// Derives a feature signature for given code and metrics.
    pub fn signature(&self, code: &str, metrics: &Metrics) -> Vec<Float> {
        (self.extractor)(code, metrics)
    }

    /// Maps a feature signature to its bucket.
    pub fn bucket_of(&self, signature: &[Float]) -> BucketKey {
        BucketKey(
            signature
                .iter()
                .map(|&value| {
                    let value = if value.is_finite() { value.clamp(0., 1.) } else { 0. };
                    ((value * self.bins as Float) as usize).min(self.bins - 1)
                })
                .collect(),
        )
    }

    /// Returns amount of bins per dimension.
    pub fn bins(&self) -> usize {
        self.bins
    }
}

/// A default structural feature extractor with two dimensions: normalized code length and
/// distinct-line ratio. Both land in `[0, 1]` without any knowledge of the target domain.
pub fn default_feature_extractor() -> FeatureExtractor {
    const LENGTH_SCALE: Float = 10_000.;

    Arc::new(|code: &str, _: &Metrics| {
        let length = (code.len() as Float / LENGTH_SCALE).min(1.);

        let lines = code.lines().map(str::trim).filter(|line| !line.is_empty()).collect::<Vec<_>>();
        let distinct = lines.iter().collect::<std::collections::HashSet<_>>().len();
        let distinct_ratio = if lines.is_empty() { 0. } else { distinct as Float / lines.len() as Float };

        vec![length, distinct_ratio]
    })
}
