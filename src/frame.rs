use glam::Vec2;
use image::RgbImage;

/// Something drawn on top of a frame by the presentation side.
#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    /// A detected keypoint, `response` is the detector score.
    Keypoint { position: Vec2, response: f32 },
    /// A query keypoint matched to reference feature `reference_index`.
    MatchLabel {
        position: Vec2,
        reference_index: usize,
    },
    Text { position: Vec2, text: String },
}

impl Annotation {
    pub fn label(&self) -> Option<String> {
        match self {
            Annotation::Keypoint { .. } => None,
            Annotation::MatchLabel {
                reference_index, ..
            } => Some(reference_index.to_string()),
            Annotation::Text { text, .. } => Some(text.clone()),
        }
    }
}

/// One captured RGB image plus the overlay accumulated while processing it.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub time_ns: i64,
    pub overlay: Vec<Annotation>,
}

impl Frame {
    pub fn new(image: RgbImage, time_ns: i64) -> Frame {
        Frame {
            image,
            time_ns,
            overlay: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn keypoint_count(&self) -> usize {
        self.overlay
            .iter()
            .filter(|a| matches!(a, Annotation::Keypoint { .. }))
            .count()
    }

    pub fn match_labels(&self) -> impl Iterator<Item = (Vec2, usize)> + '_ {
        self.overlay.iter().filter_map(|a| match a {
            Annotation::MatchLabel {
                position,
                reference_index,
            } => Some((*position, *reference_index)),
            _ => None,
        })
    }
}
