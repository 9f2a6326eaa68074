use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Capture sizes taller than this are never requested from the device.
pub const MAX_CAPTURE_HEIGHT: u32 = 720;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraResolution {
    pub width: u32,
    pub height: u32,
}

impl CameraResolution {
    pub const fn new(width: u32, height: u32) -> CameraResolution {
        CameraResolution { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for CameraResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed resolution token {token:?}, expected <width>x<height>")]
pub struct ResolutionParseError {
    pub token: String,
}

impl FromStr for CameraResolution {
    type Err = ResolutionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ResolutionParseError {
            token: s.to_string(),
        };
        let (w, h) = s.trim().split_once('x').ok_or_else(malformed)?;
        let width = w.parse().map_err(|_| malformed())?;
        let height = h.parse().map_err(|_| malformed())?;
        Ok(CameraResolution { width, height })
    }
}

/// Parses a device-reported list such as `"320x240,640x480,1280x720"`.
///
/// Malformed tokens are skipped; the scan always runs to the end of the string.
pub fn parse_supported_resolutions(supported: &str) -> Vec<CameraResolution> {
    supported
        .split(',')
        .filter_map(|token| match token.parse::<CameraResolution>() {
            Ok(r) => Some(r),
            Err(e) => {
                debug!("skipping {}", e);
                None
            }
        })
        .collect()
}

/// Picks the capture resolution closest in height to `target` without exceeding
/// it in either dimension or exceeding `max_height`.
///
/// Ties keep the first candidate in device order. Zero-sized entries never
/// qualify. `None` means no advertised size is acceptable and the caller should fall back to the view size.
pub fn select_resolution(
    candidates: &[CameraResolution],
    target: CameraResolution,
    max_height: u32,
) -> Option<CameraResolution> {
    let mut best: Option<(u32, CameraResolution)> = None;
    for candidate in candidates {
        if candidate.is_empty()
            || candidate.width > target.width
            || candidate.height > target.height
            || candidate.height > max_height
        {
            continue;
        }
        let h_diff = target.height - candidate.height;
        match best {
            Some((min_diff, _)) if h_diff >= min_diff => {}
            _ => best = Some((h_diff, *candidate)),
        }
    }
    best.map(|(_, r)| r)
}

/// Parses `supported` and selects from it, see [`select_resolution`].
pub fn calc_optimal_camera_resolution(
    supported: &str,
    target: CameraResolution,
    max_height: u32,
) -> Option<CameraResolution> {
    select_resolution(&parse_supported_resolutions(supported), target, max_height)
}

/// Buffer size of the presentation surface so that a `camera` frame fits the
/// `view` with its aspect ratio preserved.
pub fn surface_geometry(view: CameraResolution, camera: CameraResolution) -> CameraResolution {
    if camera.is_empty() || view.is_empty() {
        return view;
    }
    let scale = (view.width as f32 / camera.width as f32)
        .min(view.height as f32 / camera.height as f32);
    CameraResolution {
        width: (view.width as f32 / scale) as u32,
        height: (view.height as f32 / scale) as u32,
    }
}
