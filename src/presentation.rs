use thiserror::Error;

use crate::frame::Frame;

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("no presentation context")]
    NoContext,
    #[error("surface size {width}x{height} is not usable")]
    InvalidSurface { width: u32, height: u32 },
    #[error("presentation backend failed: {0}")]
    Backend(String),
}

/// Where annotated frames end up.
///
/// `present` is only called between a successful `init_context` and the
/// matching `teardown_context`.
pub trait Presenter {
    fn init_context(&mut self, width: u32, height: u32) -> Result<(), PresentationError>;
    fn present(&mut self, frame: Frame) -> Result<(), PresentationError>;
    fn teardown_context(&mut self);
}
