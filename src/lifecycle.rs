use std::sync::mpsc::{Receiver, RecvError, TryRecvError};

use crate::resolution::CameraResolution;

/// Lifecycle and input notifications delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// A window exists; `view` is its size in pixels.
    WindowCreated { view: CameraResolution },
    WindowDestroyed,
    FocusGained,
    FocusLost,
    DestroyRequested,
    /// Use the next processed frame as the tracking reference.
    FeatureGrabRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTimeout {
    /// Return at once, possibly with nothing.
    Immediate,
    /// Block until an event arrives or the host goes away.
    Forever,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    Event(AppEvent),
    Empty,
    /// The host is gone; no event will ever arrive.
    Closed,
}

pub trait EventSource {
    fn poll(&mut self, timeout: PollTimeout) -> Poll;
}

/// Events sent from a host thread over a channel.
pub struct ChannelEventSource {
    rx: Receiver<AppEvent>,
}

impl ChannelEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> ChannelEventSource {
        ChannelEventSource { rx }
    }
}

impl EventSource for ChannelEventSource {
    fn poll(&mut self, timeout: PollTimeout) -> Poll {
        match timeout {
            PollTimeout::Immediate => match self.rx.try_recv() {
                Ok(e) => Poll::Event(e),
                Err(TryRecvError::Empty) => Poll::Empty,
                Err(TryRecvError::Disconnected) => Poll::Closed,
            },
            PollTimeout::Forever => match self.rx.recv() {
                Ok(e) => Poll::Event(e),
                Err(RecvError) => Poll::Closed,
            },
        }
    }
}
