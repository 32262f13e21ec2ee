//! Capture rendered tracing events in memory.
//!
//! Install [`CaptureLayer`] in a subscriber and read the events back through
//! its [`LogBuffer`]. The buffer is bounded; events past the limit are counted
//! and discarded.

use std::{mem, sync::Arc};

use parking_lot::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::fmt::{self, RenderedLog};

/// Default number of events a buffer holds.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Buffer contents.
#[derive(Debug, Default)]
struct Captured {
    /// Events in arrival order.
    events: Vec<RenderedLog>,
    /// Events discarded because the buffer was full.
    dropped: u64,
}

/// Shared handle to captured events.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    /// Captured events.
    inner: Arc<Mutex<Captured>>,
    /// Maximum number of retained events.
    capacity: usize,
}

impl LogBuffer {
    /// Create an empty buffer that keeps at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Captured::default())),
            capacity,
        }
    }

    /// Append an event, or count it as dropped when full.
    pub fn push(&self, log: RenderedLog) {
        let mut st = self.inner.lock();
        if st.events.len() < self.capacity {
            st.events.push(log);
        } else {
            st.dropped += 1;
        }
    }

    /// Copy of the captured events.
    pub fn snapshot(&self) -> Vec<RenderedLog> {
        self.inner.lock().events.clone()
    }

    /// Take the captured events, leaving the buffer empty.
    pub fn drain(&self) -> Vec<RenderedLog> {
        mem::take(&mut self.inner.lock().events)
    }

    /// Number of events discarded so far.
    pub fn dropped(&self) -> u64 {
        self.inner.lock().dropped
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Tracing layer that renders each event into a [`LogBuffer`].
#[derive(Debug, Clone)]
pub struct CaptureLayer {
    /// Destination buffer.
    buffer: LogBuffer,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.buffer.push(fmt::render_event(event));
    }
}

/// Create a capture layer writing into `buffer`.
pub fn layer(buffer: &LogBuffer) -> CaptureLayer {
    CaptureLayer {
        buffer: buffer.clone(),
    }
}
