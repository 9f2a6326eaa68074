//! The capture/render loop.
//!
//! One [`Engine`] owns the capture device, the feature pipeline and the
//! presenter. It is driven by host events: it blocks while unfocused and
//! processes one frame per iteration while focused.

use std::ops::ControlFlow;
use std::time::Instant;

use glam::Vec2;
use log::{debug, error, info, warn};

use crate::capture::CaptureDevice;
use crate::config::TrackerConfig;
use crate::features::{FeatureExtractor, FeatureMatcher};
use crate::frame::Annotation;
use crate::frame_rate::FrameRateEstimator;
use crate::lifecycle::{AppEvent, EventSource, Poll, PollTimeout};
use crate::pipeline::{FeaturePipeline, PipelineMode, PipelineReport};
use crate::presentation::Presenter;
use crate::resolution::{self, CameraResolution};

/// Engine timestamps are nanoseconds on a monotonic clock.
pub const TICKS_PER_SECOND: f64 = 1e9;

const PERFORMANCE_TEXT_POS: Vec2 = Vec2::new(8.0, 64.0);

/// Resources bound to one window-created … window-destroyed bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSession {
    pub view: CameraResolution,
    pub camera: CameraResolution,
    pub surface: CameraResolution,
    /// False when `open` failed; no frames are grabbed, but the device is
    /// still released when the window goes away.
    pub device_open: bool,
    /// False when the presentation context failed to initialise.
    pub presenting: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub iterations: u64,
    pub frames_presented: u64,
    pub grab_failures: u64,
    pub trainings: u64,
}

pub struct Engine<D, P, E, M> {
    device: D,
    presenter: P,
    pipeline: FeaturePipeline<E, M>,
    fps: FrameRateEstimator,
    config: TrackerConfig,
    window: Option<WindowSession>,
    focused: bool,
    pending_grab: bool,
    clock: Instant,
    summary: RunSummary,
}

impl<D, P, E, M> Engine<D, P, E, M>
where
    D: CaptureDevice,
    P: Presenter,
    E: FeatureExtractor,
    M: FeatureMatcher,
{
    pub fn new(
        device: D,
        presenter: P,
        pipeline: FeaturePipeline<E, M>,
        config: TrackerConfig,
    ) -> Engine<D, P, E, M> {
        Engine {
            device,
            presenter,
            pipeline,
            fps: FrameRateEstimator::new(config.fps_window),
            config,
            window: None,
            focused: false,
            pending_grab: false,
            clock: Instant::now(),
            summary: RunSummary::default(),
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn pipeline(&self) -> &FeaturePipeline<E, M> {
        &self.pipeline
    }

    pub fn window(&self) -> Option<&WindowSession> {
        self.window.as_ref()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn frame_rate(&self) -> &FrameRateEstimator {
        &self.fps
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Runs until the host requests destruction or goes away.
    pub fn run<S: EventSource>(&mut self, events: &mut S) -> RunSummary {
        loop {
            // unfocused: block until the host wakes us, focused: drain and go on
            loop {
                let timeout = if self.focused {
                    PollTimeout::Immediate
                } else {
                    PollTimeout::Forever
                };
                match events.poll(timeout) {
                    Poll::Event(event) => {
                        if self.handle_event(event).is_break() {
                            return self.summary;
                        }
                    }
                    Poll::Empty => break,
                    Poll::Closed => {
                        info!("event source closed");
                        self.on_window_destroyed();
                        return self.summary;
                    }
                }
            }
            self.summary.iterations += 1;
            self.step();
        }
    }

    /// Applies one host event. `Break` means the loop must terminate.
    pub fn handle_event(&mut self, event: AppEvent) -> ControlFlow<()> {
        debug!("event {:?}", event);
        match event {
            AppEvent::WindowCreated { view } => self.on_window_created(view),
            AppEvent::WindowDestroyed => self.on_window_destroyed(),
            AppEvent::FocusGained => {
                self.focused = true;
                self.fps.clear();
            }
            AppEvent::FocusLost => self.focused = false,
            AppEvent::FeatureGrabRequest => self.pending_grab = true,
            AppEvent::DestroyRequested => {
                info!("engine destroy requested");
                self.on_window_destroyed();
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn on_window_created(&mut self, view: CameraResolution) {
        if self.window.is_some() {
            warn!("window created while another is active, closing the old one");
            self.on_window_destroyed();
        }

        let device_open = match self.device.open(self.config.camera_index) {
            Ok(()) => true,
            Err(e) => {
                error!("{}", e);
                false
            }
        };
        let camera = if device_open {
            self.negotiate_resolution(view)
        } else {
            view
        };
        if device_open {
            if let Err(e) = self.device.set_resolution(camera) {
                warn!("cannot set capture resolution {}: {}", camera, e);
            }
        }
        info!("camera initialized at resolution {}", camera);

        let surface = resolution::surface_geometry(view, camera);
        let presenting = match self.presenter.init_context(surface.width, surface.height) {
            Ok(()) => true,
            Err(e) => {
                error!("presentation disabled for this window: {}", e);
                false
            }
        };
        self.window = Some(WindowSession {
            view,
            camera,
            surface,
            device_open,
            presenting,
        });
    }

    fn negotiate_resolution(&self, view: CameraResolution) -> CameraResolution {
        let target = self.config.target_resolution.unwrap_or(view);
        let Some(supported) = self.device.supported_resolutions() else {
            error!("cannot get supported camera resolutions");
            return view;
        };
        resolution::calc_optimal_camera_resolution(
            &supported,
            target,
            self.config.max_capture_height,
        )
        .unwrap_or_else(|| {
            warn!(
                "no supported resolution fits {} in {:?}, using view size",
                target, supported
            );
            view
        })
    }

    fn on_window_destroyed(&mut self) {
        let Some(window) = self.window.take() else {
            return;
        };
        if window.presenting {
            self.presenter.teardown_context();
        }
        // every window bracket releases once, even when the open failed
        self.device.release();
        self.focused = false;
    }

    /// Captures, annotates and presents one frame if the engine is focused
    /// and the current window has a device and a presentation context.
    pub fn step(&mut self) -> Option<PipelineReport> {
        if !self.focused {
            return None;
        }
        let window = self.window?;
        if !window.device_open || !window.presenting {
            return None;
        }

        let mut frame = match self.device.grab_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("frame grab failed: {}", e);
                self.summary.grab_failures += 1;
                return None;
            }
        };
        self.fps.record(self.clock.elapsed().as_nanos() as i64);

        let grab = std::mem::take(&mut self.pending_grab);
        let report = self.pipeline.process(&mut frame, grab);
        if report.mode == PipelineMode::Training {
            self.summary.trainings += 1;
        }

        let fps = self.fps.current_fps(TICKS_PER_SECOND);
        let text = format!(
            "Display performance: {}x{} @ {:.3}",
            frame.width(),
            frame.height(),
            fps
        );
        frame.overlay.push(Annotation::Text {
            position: PERFORMANCE_TEXT_POS,
            text,
        });

        match self.presenter.present(frame) {
            Ok(()) => self.summary.frames_presented += 1,
            Err(e) => warn!("frame dropped: {}", e),
        }
        Some(report)
    }
}
