use image::DynamicImage;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rerun::{RecordingStream, TimeCell};

use crate::frame::{Annotation, Frame};
use crate::presentation::{PresentationError, Presenter};
use crate::resolution::CameraResolution;

/// Stable pseudo-random color per id, so a reference feature keeps its color
/// across frames.
pub fn id_to_color(id: usize) -> rerun::Color {
    let mut rng = ChaCha8Rng::seed_from_u64(id as u64);
    let color_num = rng.random_range(0..2u32.pow(24));
    rerun::Color::from_unmultiplied_rgba(
        ((color_num >> 16) % 256) as u8,
        ((color_num >> 8) % 256) as u8,
        (color_num % 256) as u8,
        255,
    )
}

fn response_to_color(response: f32, max_response: f32) -> rerun::Color {
    let t = if max_response > 0.0 {
        (response / max_response).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let c = colorous::VIRIDIS.eval_continuous(t as f64);
    rerun::Color::from_unmultiplied_rgba(c.r, c.g, c.b, 255)
}

/// rerun use top left corner as (0, 0)
pub fn rerun_shift(p2ds: &[(f32, f32)]) -> Vec<(f32, f32)> {
    p2ds.iter().map(|(x, y)| (*x + 0.5, *y + 0.5)).collect()
}

fn backend_err(e: impl std::fmt::Display) -> PresentationError {
    PresentationError::Backend(e.to_string())
}

/// Logs the frame image and its overlay under `topic`.
pub fn log_frame(
    recording: &RecordingStream,
    topic: &str,
    frame: Frame,
) -> Result<(), PresentationError> {
    let mut keypoints = Vec::new();
    let mut labels = Vec::new();
    let mut texts = Vec::new();
    for annotation in &frame.overlay {
        match annotation {
            Annotation::Keypoint { position, response } => {
                keypoints.push(((position.x, position.y), *response))
            }
            Annotation::MatchLabel {
                position,
                reference_index,
            } => labels.push(((position.x, position.y), *reference_index)),
            Annotation::Text { text, .. } => texts.push(text.clone()),
        }
    }

    let image =
        rerun::Image::from_image(DynamicImage::ImageRgb8(frame.image)).map_err(backend_err)?;
    recording
        .log(format!("{}/image", topic), &image)
        .map_err(backend_err)?;

    let max_response = keypoints.iter().map(|(_, r)| *r).fold(0.0f32, f32::max);
    let (pts, colors): (Vec<_>, Vec<_>) = keypoints
        .iter()
        .map(|(p, r)| (*p, response_to_color(*r, max_response)))
        .unzip();
    recording
        .log(
            format!("{}/image/keypoints", topic),
            &rerun::Points2D::new(rerun_shift(&pts))
                .with_colors(colors)
                .with_radii([rerun::Radius::new_ui_points(3.0)]),
        )
        .map_err(backend_err)?;

    let (pts, ids): (Vec<_>, Vec<_>) = labels.into_iter().unzip();
    recording
        .log(
            format!("{}/image/matches", topic),
            &rerun::Points2D::new(rerun_shift(&pts))
                .with_colors(ids.iter().map(|id| id_to_color(*id)))
                .with_labels(ids.iter().map(|id| id.to_string()))
                .with_radii([rerun::Radius::new_ui_points(5.0)]),
        )
        .map_err(backend_err)?;

    for text in texts {
        recording
            .log(format!("{}/performance", topic), &rerun::TextLog::new(text))
            .map_err(backend_err)?;
    }
    Ok(())
}

/// Presents frames to a rerun recording, one entity tree per `topic`.
pub struct RerunPresenter {
    recording: RecordingStream,
    topic: String,
    surface: Option<CameraResolution>,
    presented: i64,
}

impl RerunPresenter {
    pub fn new(recording: RecordingStream, topic: impl Into<String>) -> RerunPresenter {
        RerunPresenter {
            recording,
            topic: topic.into(),
            surface: None,
            presented: 0,
        }
    }
}

impl Presenter for RerunPresenter {
    fn init_context(&mut self, width: u32, height: u32) -> Result<(), PresentationError> {
        let surface = CameraResolution::new(width, height);
        if surface.is_empty() {
            return Err(PresentationError::InvalidSurface { width, height });
        }
        log::info!("presenting on {} surface {}", self.topic, surface);
        self.surface = Some(surface);
        Ok(())
    }

    fn present(&mut self, frame: Frame) -> Result<(), PresentationError> {
        if self.surface.is_none() {
            return Err(PresentationError::NoContext);
        }
        // replayed streams may loop, so the sequence timeline is the monotonic one
        self.recording
            .set_time("frame", TimeCell::from_sequence(self.presented));
        self.recording.set_time(
            "stable",
            TimeCell::from_timestamp_nanos_since_epoch(frame.time_ns),
        );
        self.presented += 1;
        log_frame(&self.recording, &self.topic, frame)
    }

    fn teardown_context(&mut self) {
        self.surface = None;
    }
}
