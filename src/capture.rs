use std::path::{Path, PathBuf};

use glob::glob;
use image::imageops::FilterType;
use image::{ImageReader, RgbImage};
use indicatif::ParallelProgressIterator;
use log::{info, trace, warn};
use rayon::prelude::*;
use thiserror::Error;

use crate::frame::Frame;
use crate::resolution::CameraResolution;

/// Default spacing of replayed frames whose file names carry no timestamp.
const FRAME_INTERVAL_NS: i64 = 33_333_333;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("camera {index} could not be opened: {reason}")]
    Open { index: u32, reason: String },
    #[error("capture device is not open")]
    NotOpened,
    #[error("no more frames")]
    EndOfStream,
    #[error("resolution {0} is not usable")]
    InvalidResolution(CameraResolution),
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

/// The camera as seen by the render loop.
pub trait CaptureDevice {
    fn open(&mut self, index: u32) -> Result<(), DeviceError>;
    /// Comma separated `<w>x<h>` list, `None` if the device cannot report one.
    fn supported_resolutions(&self) -> Option<String>;
    fn set_resolution(&mut self, resolution: CameraResolution) -> Result<(), DeviceError>;
    fn grab_frame(&mut self) -> Result<Frame, DeviceError>;
    fn release(&mut self);
}

/// Parses the timestamp from a file path.
///
/// Assumes the filename (without extension) is a timestamp in nanoseconds.
fn path_to_timestamp(path: &Path) -> Option<i64> {
    path.file_stem()?.to_str()?.parse().ok()
}

fn img_filter(rp: glob::GlobResult) -> Option<PathBuf> {
    if let Ok(p) = rp {
        for ext in &[".png", ".jpg"] {
            if p.as_os_str().to_string_lossy().ends_with(ext) {
                return Some(p);
            }
        }
    }
    None
}

/// Replays the images under `<root>/**/cam<index>/**` as a camera stream.
pub struct ImageFolderCamera {
    root: PathBuf,
    advertised: Option<String>,
    looping: bool,
    frames: Vec<(i64, RgbImage)>,
    cursor: usize,
    resolution: Option<CameraResolution>,
    opened: bool,
}

impl ImageFolderCamera {
    pub fn new(root: impl Into<PathBuf>) -> ImageFolderCamera {
        ImageFolderCamera {
            root: root.into(),
            advertised: None,
            looping: false,
            frames: Vec::new(),
            cursor: 0,
            resolution: None,
            opened: false,
        }
    }

    /// Advertise this resolution list instead of one derived from the images.
    pub fn with_supported_resolutions(mut self, supported: impl Into<String>) -> Self {
        self.advertised = Some(supported.into());
        self
    }

    /// Restart from the first frame instead of ending the stream.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn native_resolution(&self) -> Option<CameraResolution> {
        self.frames
            .first()
            .map(|(_, img)| CameraResolution::new(img.width(), img.height()))
    }
}

impl CaptureDevice for ImageFolderCamera {
    fn open(&mut self, index: u32) -> Result<(), DeviceError> {
        let pattern = format!("{}/**/cam{}/**/*", self.root.display(), index);
        trace!("loading {}", pattern);
        let mut sorted_path: Vec<PathBuf> = glob(&pattern)?.filter_map(img_filter).collect();
        sorted_path.sort();
        if sorted_path.is_empty() {
            return Err(DeviceError::Open {
                index,
                reason: format!("no images match {}", pattern),
            });
        }

        let mut frames: Vec<(i64, RgbImage)> = sorted_path
            .par_iter()
            .enumerate()
            .progress_count(sorted_path.len() as u64)
            .filter_map(|(idx, path)| {
                let time_ns = path_to_timestamp(path).unwrap_or(idx as i64 * FRAME_INTERVAL_NS);
                let decoded = ImageReader::open(path)
                    .map_err(image::ImageError::from)
                    .and_then(|r| r.decode());
                match decoded {
                    Ok(img) => Some((time_ns, img.to_rgb8())),
                    Err(e) => {
                        warn!("skipping {}: {}", path.display(), e);
                        None
                    }
                }
            })
            .collect();
        frames.sort_by_key(|f| f.0);
        if frames.is_empty() {
            return Err(DeviceError::Open {
                index,
                reason: "no image could be decoded".to_string(),
            });
        }

        info!("camera {} opened with {} frames", index, frames.len());
        self.frames = frames;
        self.cursor = 0;
        self.opened = true;
        Ok(())
    }

    fn supported_resolutions(&self) -> Option<String> {
        if let Some(advertised) = &self.advertised {
            return Some(advertised.clone());
        }
        let native = self.native_resolution()?;
        let sizes: Vec<String> = (0..3)
            .map(|shift| CameraResolution::new(native.width >> shift, native.height >> shift))
            .filter(|r| !r.is_empty())
            .map(|r| r.to_string())
            .collect();
        Some(sizes.join(","))
    }

    fn set_resolution(&mut self, resolution: CameraResolution) -> Result<(), DeviceError> {
        if !self.opened {
            return Err(DeviceError::NotOpened);
        }
        if resolution.is_empty() {
            return Err(DeviceError::InvalidResolution(resolution));
        }
        self.resolution = Some(resolution);
        Ok(())
    }

    fn grab_frame(&mut self) -> Result<Frame, DeviceError> {
        if !self.opened {
            return Err(DeviceError::NotOpened);
        }
        if self.cursor >= self.frames.len() {
            if !self.looping {
                return Err(DeviceError::EndOfStream);
            }
            self.cursor = 0;
        }
        let (time_ns, img) = &self.frames[self.cursor];
        self.cursor += 1;
        let image = match self.resolution {
            Some(r) if (r.width, r.height) != img.dimensions() => {
                image::imageops::resize(img, r.width, r.height, FilterType::Triangle)
            }
            _ => img.clone(),
        };
        Ok(Frame::new(image, *time_ns))
    }

    fn release(&mut self) {
        self.frames.clear();
        self.cursor = 0;
        self.resolution = None;
        self.opened = false;
    }
}
