//! Feature extraction and matching capabilities.
//!
//! The pipeline only depends on [`FeatureExtractor`] and [`FeatureMatcher`];
//! the FAST/BRIEF extractor and brute-force matcher here are the production
//! implementations.

pub mod brute_force;
pub mod fast_brief;

pub use brute_force::BruteForceMatcher;
pub use fast_brief::FastBriefExtractor;

use glam::Vec2;
use image::GrayImage;

use crate::frame::Frame;

/// Bytes in a binary descriptor (256 bits).
pub const DESCRIPTOR_BYTES: usize = 32;

pub type Descriptor = [u8; DESCRIPTOR_BYTES];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPoint {
    pub pt: Vec2,
    pub response: f32,
}

impl KeyPoint {
    pub fn new(x: f32, y: f32, response: f32) -> KeyPoint {
        KeyPoint {
            pt: Vec2::new(x, y),
            response,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub keypoint: KeyPoint,
    pub descriptor: Descriptor,
}

/// Ordered features extracted from one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    features: Vec<Feature>,
}

impl FeatureSet {
    pub fn new(features: Vec<Feature>) -> FeatureSet {
        FeatureSet { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Feature> {
        self.features.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Feature> {
        self.features.iter()
    }

    pub fn keypoints(&self) -> impl Iterator<Item = &KeyPoint> + '_ {
        self.features.iter().map(|f| &f.keypoint)
    }
}

impl FromIterator<Feature> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        FeatureSet {
            features: iter.into_iter().collect(),
        }
    }
}

/// A query feature paired with its closest reference feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub query_idx: usize,
    pub reference_idx: usize,
    pub distance: f32,
}

pub trait FeatureExtractor {
    /// Detects keypoints and computes descriptors. With a `mask`, only pixels
    /// where the mask is non-zero may hold keypoints.
    fn extract(&self, frame: &Frame, mask: Option<&GrayImage>) -> FeatureSet;
}

pub trait FeatureMatcher {
    /// Matches are ordered by query index. Either set being empty yields none.
    fn match_sets(&self, query: &FeatureSet, reference: &FeatureSet) -> Vec<Match>;
}

pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter().zip(b).map(|(x, y)| (x ^ y).count_ones()).sum()
}
