//! SNTP-backed clock shared between the time worker and the sync core.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use critical_section::Mutex;
use skywave_core::clock::ClockSource;

/// Sync result plus the command cells the worker consumes.
///
/// The worker anchors one Unix timestamp against uptime; `now_unix`
/// extrapolates from there so the core sees a monotonic wall clock
/// between syncs.
pub struct ClockHandle {
    synced: AtomicBool,
    unix_at_sync: AtomicU32,
    uptime_secs_at_sync: AtomicU32,
    sync_requests: AtomicU32,
    servers: Mutex<Cell<Option<&'static [&'static str]>>>,
}

impl ClockHandle {
    pub const fn new() -> Self {
        Self {
            synced: AtomicBool::new(false),
            unix_at_sync: AtomicU32::new(0),
            uptime_secs_at_sync: AtomicU32::new(0),
            sync_requests: AtomicU32::new(0),
            servers: Mutex::new(Cell::new(None)),
        }
    }

    /// Core side: asks the worker to (re)synchronize.
    pub fn request_sync(&self, servers: &'static [&'static str]) {
        critical_section::with(|cs| self.servers.borrow(cs).set(Some(servers)));
        self.sync_requests.fetch_add(1, Ordering::AcqRel);
    }

    /// Worker side: total sync requests issued so far.
    pub fn sync_requests(&self) -> u32 {
        self.sync_requests.load(Ordering::Acquire)
    }

    /// Worker side: servers named by the most recent request.
    pub fn servers(&self) -> Option<&'static [&'static str]> {
        critical_section::with(|cs| self.servers.borrow(cs).get())
    }

    /// Worker side: records a fresh result against current uptime.
    pub fn set_unix(&self, unix: u32, uptime_secs: u32) {
        self.unix_at_sync.store(unix, Ordering::Release);
        self.uptime_secs_at_sync.store(uptime_secs, Ordering::Release);
        self.synced.store(true, Ordering::Release);
    }

    pub fn now_unix(&self, uptime_secs: u32) -> Option<i64> {
        if !self.synced.load(Ordering::Acquire) {
            return None;
        }

        let base = self.unix_at_sync.load(Ordering::Acquire);
        let anchored = self.uptime_secs_at_sync.load(Ordering::Acquire);
        Some(i64::from(base) + i64::from(uptime_secs.saturating_sub(anchored)))
    }
}

impl Default for ClockHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Core-facing adapter; uptime is supplied by the board loop.
pub struct SntpClock<U>
where
    U: Fn() -> u32,
{
    handle: &'static ClockHandle,
    uptime_secs: U,
}

impl<U> SntpClock<U>
where
    U: Fn() -> u32,
{
    pub const fn new(handle: &'static ClockHandle, uptime_secs: U) -> Self {
        Self {
            handle,
            uptime_secs,
        }
    }
}

impl<U> ClockSource for SntpClock<U>
where
    U: Fn() -> u32,
{
    type Error = core::convert::Infallible;

    fn begin_sync(&mut self, servers: &'static [&'static str]) -> Result<(), Self::Error> {
        self.handle.request_sync(servers);
        Ok(())
    }

    fn now_unix(&self) -> Option<i64> {
        self.handle.now_unix((self.uptime_secs)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsynced_clock_reports_nothing() {
        let handle = ClockHandle::new();
        assert_eq!(handle.now_unix(100), None);
    }

    #[test]
    fn synced_clock_extrapolates_from_uptime() {
        let handle = ClockHandle::new();
        handle.set_unix(1_700_000_000, 50);

        assert_eq!(handle.now_unix(50), Some(1_700_000_000));
        assert_eq!(handle.now_unix(53), Some(1_700_000_003));
    }

    #[test]
    fn request_carries_server_list_to_worker() {
        static SERVERS: &[&str] = &["a.example", "b.example"];
        let handle = ClockHandle::new();
        assert_eq!(handle.sync_requests(), 0);
        assert!(handle.servers().is_none());

        handle.request_sync(SERVERS);
        assert_eq!(handle.sync_requests(), 1);
        assert_eq!(handle.servers(), Some(SERVERS));
    }
}
