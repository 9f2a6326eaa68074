pub mod capture;
pub mod config;
pub mod engine;
pub mod features;
pub mod frame;
pub mod frame_rate;
pub mod io;
pub mod lifecycle;
pub mod pipeline;
pub mod presentation;
pub mod resolution;
pub mod visualization;

pub use config::{FeatureConfig, TrackerConfig};
pub use engine::{Engine, RunSummary};
pub use frame::{Annotation, Frame};
pub use pipeline::{FeaturePipeline, PipelineState};
pub use resolution::CameraResolution;
