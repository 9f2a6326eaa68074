use rayon::prelude::*;

use super::{FeatureMatcher, FeatureSet, Match, hamming_distance};

/// Exhaustive nearest-neighbour matcher over Hamming distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForceMatcher;

impl FeatureMatcher for BruteForceMatcher {
    fn match_sets(&self, query: &FeatureSet, reference: &FeatureSet) -> Vec<Match> {
        if query.is_empty() || reference.is_empty() {
            return Vec::new();
        }
        let reference: Vec<_> = reference.iter().collect();
        let query: Vec<_> = query.iter().collect();
        query
            .par_iter()
            .enumerate()
            .filter_map(|(query_idx, q)| {
                reference
                    .iter()
                    .enumerate()
                    .map(|(i, r)| (i, hamming_distance(&q.descriptor, &r.descriptor)))
                    // first minimum wins ties
                    .min_by_key(|(_, d)| *d)
                    .map(|(reference_idx, d)| Match {
                        query_idx,
                        reference_idx,
                        distance: d as f32,
                    })
            })
            .collect()
    }
}
