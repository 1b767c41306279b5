//! Stream session state shared between the async reader task and the
//! sync core, plus the ICY protocol helpers the task uses.

pub mod icy;

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;
use skywave_core::stream::{MetadataEvent, StreamPipeline};

/// Single-slot mailbox for metadata events.
///
/// Posting only swaps the slot contents under a critical section, so the
/// reader task may post from inside its decode path while the core
/// drains once per tick. A newer event overwrites an undrained one.
pub struct MetadataSlot {
    slot: Mutex<RefCell<Option<MetadataEvent>>>,
}

impl MetadataSlot {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    pub fn post(&self, event: MetadataEvent) {
        critical_section::with(|cs| {
            self.slot.borrow(cs).replace(Some(event));
        });
    }

    pub fn take(&self) -> Option<MetadataEvent> {
        critical_section::with(|cs| self.slot.borrow(cs).take())
    }
}

impl Default for MetadataSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Consumer of demuxed audio bytes. The codec behind it is a
/// collaborator, not part of this crate.
pub trait AudioSink {
    fn push(&mut self, bytes: &[u8]);
}

/// Lock-free session status plus start/stop commands for the reader
/// task.
///
/// A session is `pending` from the start request until the task reports
/// it running or stopped; the core-facing adapter treats pending as
/// alive so connect latency is not misread as a pump failure.
pub struct StreamHandle {
    running: AtomicBool,
    pending: AtomicBool,
    start_requests: AtomicU32,
    stop_requested: AtomicBool,
    bytes_received: AtomicU32,
    url: Mutex<Cell<Option<&'static str>>>,
    pub metadata: MetadataSlot,
}

impl StreamHandle {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            pending: AtomicBool::new(false),
            start_requests: AtomicU32::new(0),
            stop_requested: AtomicBool::new(false),
            bytes_received: AtomicU32::new(0),
            url: Mutex::new(Cell::new(None)),
            metadata: MetadataSlot::new(),
        }
    }

    /// Core side: asks the task to open a session on `url`.
    pub fn request_start(&self, url: &'static str) {
        critical_section::with(|cs| self.url.borrow(cs).set(Some(url)));
        self.pending.store(true, Ordering::Release);
        self.start_requests.fetch_add(1, Ordering::AcqRel);
    }

    /// Core side: asks the task to tear the session down.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.running.load(Ordering::Acquire) || self.pending.load(Ordering::Acquire)
    }

    /// Task side: total start requests issued so far.
    pub fn start_requests(&self) -> u32 {
        self.start_requests.load(Ordering::Acquire)
    }

    /// Task side: URL named by the most recent start request.
    pub fn url(&self) -> Option<&'static str> {
        critical_section::with(|cs| self.url.borrow(cs).get())
    }

    /// Task side: consumes a pending stop request.
    pub fn take_stop_request(&self) -> bool {
        self.stop_requested.swap(false, Ordering::AcqRel)
    }

    pub fn mark_running(&self) {
        self.running.store(true, Ordering::Release);
        self.pending.store(false, Ordering::Release);
    }

    pub fn mark_stopped(&self) {
        self.running.store(false, Ordering::Release);
        self.pending.store(false, Ordering::Release);
    }

    pub fn note_progress(&self, bytes: usize) {
        self.bytes_received
            .fetch_add(bytes as u32, Ordering::AcqRel);
    }

    pub fn bytes_received(&self) -> u32 {
        self.bytes_received.load(Ordering::Acquire)
    }
}

impl Default for StreamHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Core-facing adapter over a shared [`StreamHandle`].
pub struct StreamControl {
    handle: &'static StreamHandle,
}

impl StreamControl {
    pub const fn new(handle: &'static StreamHandle) -> Self {
        Self { handle }
    }
}

impl StreamPipeline for StreamControl {
    type Error = core::convert::Infallible;

    fn start(&mut self, url: &'static str) -> Result<(), Self::Error> {
        self.handle.request_start(url);
        Ok(())
    }

    fn pump(&mut self) -> bool {
        self.handle.is_active()
    }

    fn stop(&mut self) {
        self.handle.request_stop();
    }

    fn is_running(&self) -> bool {
        self.handle.is_active()
    }

    fn poll_metadata(&mut self) -> Option<MetadataEvent> {
        self.handle.metadata.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skywave_core::stream::{MetadataKind, copy_truncated};

    fn event(text: &str) -> MetadataEvent {
        MetadataEvent {
            kind: MetadataKind::TrackTitle,
            text: copy_truncated(text),
        }
    }

    #[test]
    fn mailbox_keeps_latest_event_only() {
        let slot = MetadataSlot::new();
        slot.post(event("one"));
        slot.post(event("two"));

        assert_eq!(slot.take().unwrap().text.as_str(), "two");
        assert!(slot.take().is_none());
    }

    #[test]
    fn session_is_active_while_pending_or_running() {
        let handle = StreamHandle::new();
        assert!(!handle.is_active());

        handle.request_start("http://radio.example/s");
        assert!(handle.is_active());
        assert_eq!(handle.url(), Some("http://radio.example/s"));

        handle.mark_running();
        assert!(handle.is_active());

        handle.mark_stopped();
        assert!(!handle.is_active());
    }

    #[test]
    fn stop_request_is_consumed_once() {
        let handle = StreamHandle::new();
        handle.request_stop();
        assert!(handle.take_stop_request());
        assert!(!handle.take_stop_request());
    }
}
