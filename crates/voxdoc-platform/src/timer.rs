//! Timer adapter over gloo-timers.
//!
//! The interval is cancelled when its `TickerHandle` is dropped, which
//! couples every periodic task to the lifetime of the state machine
//! that owns it.

use std::future::Future;
use std::pin::Pin;

use gloo_timers::callback::Interval;
use gloo_timers::future::TimeoutFuture;

use voxdoc_core::ports::{TickerHandle, TimerPort};

pub struct GlooTimer;

impl GlooTimer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GlooTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerPort for GlooTimer {
    fn every(&self, period_ms: u32, mut tick: Box<dyn FnMut()>) -> TickerHandle {
        TickerHandle::new(Interval::new(period_ms, move || tick()))
    }

    fn sleep(&self, ms: u32) -> Pin<Box<dyn Future<Output = ()>>> {
        Box::pin(TimeoutFuture::new(ms))
    }
}
