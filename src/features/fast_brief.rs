use image::GrayImage;
use imageproc::corners::{Corner, corners_fast9};
use log::trace;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use super::{DESCRIPTOR_BYTES, Descriptor, Feature, FeatureExtractor, FeatureSet, KeyPoint};
use crate::config::FeatureConfig;
use crate::frame::Frame;

/// FAST-9 corners described by 256 intensity comparisons (BRIEF).
///
/// The comparison pattern is drawn once from a seeded generator, so two
/// extractors built from the same config produce identical descriptors.
pub struct FastBriefExtractor {
    fast_threshold: u8,
    max_features: usize,
    patch_radius: u32,
    blur_sigma: f32,
    pattern: Vec<[i32; 4]>,
}

impl FastBriefExtractor {
    pub fn new(config: &FeatureConfig) -> FastBriefExtractor {
        let patch_radius = config.patch_radius.max(1);
        FastBriefExtractor {
            fast_threshold: config.fast_threshold,
            max_features: config.max_features,
            patch_radius,
            blur_sigma: config.blur_sigma,
            pattern: sampling_pattern(config.pattern_seed, patch_radius as i32),
        }
    }

    fn in_patch_bounds(&self, c: &Corner, w: u32, h: u32) -> bool {
        let r = self.patch_radius;
        c.x >= r && c.y >= r && c.x + r < w && c.y + r < h
    }

    fn describe(&self, smoothed: &GrayImage, x: u32, y: u32) -> Descriptor {
        let mut descriptor = [0u8; DESCRIPTOR_BYTES];
        let sample = |dx: i32, dy: i32| {
            smoothed.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32)[0]
        };
        for (bit, [x0, y0, x1, y1]) in self.pattern.iter().enumerate() {
            if sample(*x0, *y0) < sample(*x1, *y1) {
                descriptor[bit / 8] |= 1 << (bit % 8);
            }
        }
        descriptor
    }
}

fn sampling_pattern(seed: u64, radius: i32) -> Vec<[i32; 4]> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..DESCRIPTOR_BYTES * 8)
        .map(|_| {
            [
                rng.random_range(-radius..=radius),
                rng.random_range(-radius..=radius),
                rng.random_range(-radius..=radius),
                rng.random_range(-radius..=radius),
            ]
        })
        .collect()
}

impl FeatureExtractor for FastBriefExtractor {
    fn extract(&self, frame: &Frame, mask: Option<&GrayImage>) -> FeatureSet {
        let gray = image::imageops::grayscale(&frame.image);
        let (w, h) = gray.dimensions();
        let mut corners: Vec<Corner> = corners_fast9(&gray, self.fast_threshold)
            .into_iter()
            .filter(|c| self.in_patch_bounds(c, w, h))
            .filter(|c| {
                mask.is_none_or(|m| m.get_pixel_checked(c.x, c.y).is_some_and(|p| p[0] != 0))
            })
            .collect();
        corners.sort_by(|a, b| b.score.total_cmp(&a.score));
        corners.truncate(self.max_features);
        trace!("{} corners kept on {}x{} frame", corners.len(), w, h);
        if corners.is_empty() {
            return FeatureSet::default();
        }

        let smoothed = if self.blur_sigma > 0.0 {
            imageproc::filter::gaussian_blur_f32(&gray, self.blur_sigma)
        } else {
            gray
        };
        FeatureSet::new(
            corners
                .par_iter()
                .map(|c| Feature {
                    keypoint: KeyPoint::new(c.x as f32, c.y as f32, c.score),
                    descriptor: self.describe(&smoothed, c.x, c.y),
                })
                .collect(),
        )
    }
}
