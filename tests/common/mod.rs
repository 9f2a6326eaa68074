#![allow(dead_code)]

use std::collections::VecDeque;

use geoid::capture::{CaptureDevice, DeviceError};
use geoid::features::{
    DESCRIPTOR_BYTES, Feature, FeatureExtractor, FeatureMatcher, FeatureSet, KeyPoint, Match,
};
use geoid::frame::Frame;
use geoid::lifecycle::{AppEvent, EventSource, Poll, PollTimeout};
use geoid::presentation::{PresentationError, Presenter};
use image::{GrayImage, Rgb, RgbImage};

/// Black frame with one marker pixel `(255, id, 0)` per entry.
pub fn marker_frame(width: u32, height: u32, markers: &[(u32, u32, u8)]) -> Frame {
    let mut img = RgbImage::new(width, height);
    for &(x, y, id) in markers {
        img.put_pixel(x, y, Rgb([255, id, 0]));
    }
    Frame::new(img, 0)
}

/// Every pixel with a saturated red channel is a feature whose descriptor is
/// filled with the green value.
pub struct MarkerExtractor;

impl FeatureExtractor for MarkerExtractor {
    fn extract(&self, frame: &Frame, mask: Option<&GrayImage>) -> FeatureSet {
        frame
            .image
            .enumerate_pixels()
            .filter(|(_, _, p)| p[0] == 255)
            .filter(|(x, y, _)| mask.is_none_or(|m| m.get_pixel(*x, *y)[0] != 0))
            .map(|(x, y, p)| Feature {
                keypoint: KeyPoint::new(x as f32, y as f32, 1.0),
                descriptor: [p[1]; DESCRIPTOR_BYTES],
            })
            .collect()
    }
}

fn marker_id(f: &Feature) -> u8 {
    f.descriptor[0]
}

/// Matches only identical marker ids, at distance 0.
pub struct ExactMatcher;

impl FeatureMatcher for ExactMatcher {
    fn match_sets(&self, query: &FeatureSet, reference: &FeatureSet) -> Vec<Match> {
        query
            .iter()
            .enumerate()
            .filter_map(|(query_idx, q)| {
                reference
                    .iter()
                    .position(|r| marker_id(r) == marker_id(q))
                    .map(|reference_idx| Match {
                        query_idx,
                        reference_idx,
                        distance: 0.0,
                    })
            })
            .collect()
    }
}

/// Nearest marker id, distance is the id difference.
pub struct NearestIdMatcher;

impl FeatureMatcher for NearestIdMatcher {
    fn match_sets(&self, query: &FeatureSet, reference: &FeatureSet) -> Vec<Match> {
        query
            .iter()
            .enumerate()
            .filter_map(|(query_idx, q)| {
                reference
                    .iter()
                    .enumerate()
                    .map(|(i, r)| (i, marker_id(q).abs_diff(marker_id(r))))
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

#[derive(Default)]
pub struct MockCamera {
    pub supported: Option<String>,
    pub fail_open: bool,
    /// Number of upcoming grabs that fail.
    pub failing_grabs: usize,
    pub frames: Vec<Frame>,
    pub opened: bool,
    pub opens: usize,
    pub releases: usize,
    pub grabs: usize,
    pub grabs_while_closed: usize,
    pub resolutions: Vec<geoid::CameraResolution>,
}

impl MockCamera {
    pub fn with_supported(supported: &str) -> MockCamera {
        MockCamera {
            supported: Some(supported.to_string()),
            frames: vec![marker_frame(64, 48, &[(10, 10, 1), (20, 30, 2), (40, 12, 3)])],
            ..Default::default()
        }
    }
}

impl CaptureDevice for MockCamera {
    fn open(&mut self, index: u32) -> Result<(), DeviceError> {
        self.opens += 1;
        if self.fail_open {
            return Err(DeviceError::Open {
                index,
                reason: "mock".to_string(),
            });
        }
        self.opened = true;
        Ok(())
    }

    fn supported_resolutions(&self) -> Option<String> {
        self.supported.clone()
    }

    fn set_resolution(&mut self, resolution: geoid::CameraResolution) -> Result<(), DeviceError> {
        self.resolutions.push(resolution);
        Ok(())
    }

    fn grab_frame(&mut self) -> Result<Frame, DeviceError> {
        if !self.opened {
            self.grabs_while_closed += 1;
            return Err(DeviceError::NotOpened);
        }
        self.grabs += 1;
        if self.failing_grabs > 0 {
            self.failing_grabs -= 1;
            return Err(DeviceError::EndOfStream);
        }
        let mut frame = if self.frames.is_empty() {
            marker_frame(64, 48, &[])
        } else {
            self.frames[(self.grabs - 1) % self.frames.len()].clone()
        };
        frame.time_ns = self.grabs as i64;
        Ok(frame)
    }

    fn release(&mut self) {
        self.releases += 1;
        self.opened = false;
    }
}

#[derive(Default)]
pub struct MockPresenter {
    /// Number of upcoming `init_context` calls that fail.
    pub failing_inits: usize,
    pub live: bool,
    pub inits: Vec<(u32, u32)>,
    pub teardowns: usize,
    pub presented: Vec<Frame>,
    pub presents_without_context: usize,
}

impl Presenter for MockPresenter {
    fn init_context(&mut self, width: u32, height: u32) -> Result<(), PresentationError> {
        self.inits.push((width, height));
        if self.failing_inits > 0 {
            self.failing_inits -= 1;
            return Err(PresentationError::Backend("link failed".to_string()));
        }
        self.live = true;
        Ok(())
    }

    fn present(&mut self, frame: Frame) -> Result<(), PresentationError> {
        if !self.live {
            self.presents_without_context += 1;
            return Err(PresentationError::NoContext);
        }
        self.presented.push(frame);
        Ok(())
    }

    fn teardown_context(&mut self) {
        self.teardowns += 1;
        self.live = false;
    }
}

/// Host script. The first batch is delivered before any frame; every later
/// batch is delivered after one more frame iteration. When the script runs out
/// the source reports `Closed`.
pub struct ScriptedEvents {
    batches: VecDeque<Vec<AppEvent>>,
    current: VecDeque<AppEvent>,
    pub polls: Vec<PollTimeout>,
}

impl ScriptedEvents {
    pub fn new(batches: Vec<Vec<AppEvent>>) -> ScriptedEvents {
        ScriptedEvents {
            batches: batches.into(),
            current: VecDeque::new(),
            polls: Vec::new(),
        }
    }
}

impl EventSource for ScriptedEvents {
    fn poll(&mut self, timeout: PollTimeout) -> Poll {
        self.polls.push(timeout);
        if let Some(event) = self.current.pop_front() {
            return Poll::Event(event);
        }
        match timeout {
            PollTimeout::Immediate => match self.batches.pop_front() {
                Some(batch) => {
                    self.current = batch.into();
                    Poll::Empty
                }
                None => Poll::Closed,
            },
            PollTimeout::Forever => {
                while let Some(batch) = self.batches.pop_front() {
                    self.current = batch.into();
                    if let Some(event) = self.current.pop_front() {
                        return Poll::Event(event);
                    }
                }
                Poll::Closed
            }
        }
    }
}
