use serde::{Deserialize, Serialize};

use crate::frame_rate::DEFAULT_WINDOW;
use crate::resolution::{CameraResolution, MAX_CAPTURE_HEIGHT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub fast_threshold: u8,
    pub max_features: usize,
    /// Half size of the BRIEF sampling patch; keypoints closer than this to the
    /// border are dropped.
    pub patch_radius: u32,
    pub blur_sigma: f32,
    pub pattern_seed: u64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            fast_threshold: 20,
            max_features: 500,
            patch_radius: 15,
            blur_sigma: 2.0,
            pattern_seed: 0x6765_6f69_64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub camera_index: u32,
    /// Size handed to resolution negotiation. `None` uses the view size.
    pub target_resolution: Option<CameraResolution>,
    pub max_capture_height: u32,
    pub fps_window: usize,
    pub match_threshold_factor: f32,
    /// Lower bound on the match threshold so exact matches survive a zero
    /// minimum distance.
    pub min_match_threshold: f32,
    pub features: FeatureConfig,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            target_resolution: None,
            max_capture_height: MAX_CAPTURE_HEIGHT,
            fps_window: DEFAULT_WINDOW,
            match_threshold_factor: 2.0,
            min_match_threshold: 1.0,
            features: FeatureConfig::default(),
        }
    }
}
