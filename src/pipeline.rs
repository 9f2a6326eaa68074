use image::GrayImage;
use log::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::features::{FeatureExtractor, FeatureMatcher, FeatureSet, Match};
use crate::frame::{Annotation, Frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// No reference set yet.
    Idle,
    /// A non-empty reference set exists and every frame is matched against it.
    Trained,
}

/// What a single `process` call did with the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// Keypoints drawn, nothing stored.
    Preview,
    /// Reference set replaced by this frame's features.
    Training,
    /// Training was requested but the frame had no features.
    TrainingRejected,
    Matching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineReport {
    pub mode: PipelineMode,
    pub keypoints: usize,
    pub matches: usize,
    pub annotated: usize,
}

/// Training/matching state machine over an injected extractor and matcher.
pub struct FeaturePipeline<E, M> {
    extractor: E,
    matcher: M,
    reference: Option<FeatureSet>,
    mask: Option<GrayImage>,
    threshold_factor: f32,
    min_threshold: f32,
}

impl<E: FeatureExtractor, M: FeatureMatcher> FeaturePipeline<E, M> {
    pub fn new(extractor: E, matcher: M) -> FeaturePipeline<E, M> {
        let config = TrackerConfig::default();
        Self::from_config(extractor, matcher, &config)
    }

    pub fn from_config(extractor: E, matcher: M, config: &TrackerConfig) -> FeaturePipeline<E, M> {
        FeaturePipeline {
            extractor,
            matcher,
            reference: None,
            mask: None,
            threshold_factor: config.match_threshold_factor,
            min_threshold: config.min_match_threshold,
        }
    }

    /// Restricts extraction to pixels where `mask` is non-zero.
    pub fn with_mask(mut self, mask: GrayImage) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn state(&self) -> PipelineState {
        if self.reference.is_some() {
            PipelineState::Trained
        } else {
            PipelineState::Idle
        }
    }

    pub fn reference(&self) -> Option<&FeatureSet> {
        self.reference.as_ref()
    }

    /// Drops the reference set and returns to `Idle`.
    pub fn reset(&mut self) {
        self.reference = None;
    }

    /// Annotates `frame` according to the current state. `capture_reference`
    /// retrains on this frame instead of matching it.
    pub fn process(&mut self, frame: &mut Frame, capture_reference: bool) -> PipelineReport {
        let features = self.extractor.extract(frame, self.mask.as_ref());
        if capture_reference {
            return self.train(frame, features);
        }
        match self.reference.as_ref() {
            Some(reference) => {
                let matches = self.matcher.match_sets(&features, reference);
                let annotated = annotate_matches(
                    frame,
                    &features,
                    &matches,
                    self.threshold_factor,
                    self.min_threshold,
                );
                PipelineReport {
                    mode: PipelineMode::Matching,
                    keypoints: features.len(),
                    matches: matches.len(),
                    annotated,
                }
            }
            None => {
                draw_keypoints(frame, &features);
                PipelineReport {
                    mode: PipelineMode::Preview,
                    keypoints: features.len(),
                    matches: 0,
                    annotated: 0,
                }
            }
        }
    }

    fn train(&mut self, frame: &mut Frame, features: FeatureSet) -> PipelineReport {
        draw_keypoints(frame, &features);
        let keypoints = features.len();
        let mode = if features.is_empty() {
            warn!("no features on the training frame, keeping {:?} state", self.state());
            PipelineMode::TrainingRejected
        } else {
            info!("got {} training descriptors", keypoints);
            self.reference = Some(features);
            PipelineMode::Training
        };
        PipelineReport {
            mode,
            keypoints,
            matches: 0,
            annotated: 0,
        }
    }
}

fn draw_keypoints(frame: &mut Frame, features: &FeatureSet) {
    frame
        .overlay
        .extend(features.keypoints().map(|kp| Annotation::Keypoint {
            position: kp.pt,
            response: kp.response,
        }));
}

/// `factor × min distance`, floored at `min_threshold`. `None` without matches.
pub fn match_threshold(matches: &[Match], factor: f32, min_threshold: f32) -> Option<f32> {
    matches
        .iter()
        .map(|m| m.distance)
        .min_by(|a, b| a.total_cmp(b))
        .map(|min| (factor * min).max(min_threshold))
}

fn annotate_matches(
    frame: &mut Frame,
    query: &FeatureSet,
    matches: &[Match],
    factor: f32,
    min_threshold: f32,
) -> usize {
    let Some(threshold) = match_threshold(matches, factor, min_threshold) else {
        return 0;
    };
    debug!("{} matches, threshold {:.2}", matches.len(), threshold);
    let before = frame.overlay.len();
    frame.overlay.extend(
        matches
            .iter()
            .filter(|m| m.distance < threshold)
            .filter_map(|m| {
                query.get(m.query_idx).map(|f| Annotation::MatchLabel {
                    position: f.keypoint.pt,
                    reference_index: m.reference_idx,
                })
            }),
    );
    frame.overlay.len() - before
}
