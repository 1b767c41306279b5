//! Wi-Fi link state and commands shared between the async network
//! worker and the sync core.

use core::sync::atomic::{AtomicBool, AtomicI8, AtomicU32, Ordering};

use skywave_core::link::NetworkLink;

/// Immutable link snapshot for the core adapter and logs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LinkSnapshot {
    pub link_up: bool,
    pub has_ipv4: bool,
    pub rssi_dbm: Option<i8>,
    pub address: Option<[u8; 4]>,
}

impl LinkSnapshot {
    /// Association for the core: link plus a DHCP lease.
    pub const fn associated(self) -> bool {
        self.link_up && self.has_ipv4
    }
}

/// Lock-free link status plus the command cells the worker consumes.
///
/// The worker owns the status side (`mark_*`, `update_link_ip`,
/// `set_rssi`, `set_address`); the core adapter owns the command side
/// (`request_join`, `request_disconnect`).
#[derive(Debug)]
pub struct LinkHandle {
    link_up: AtomicBool,
    has_ipv4: AtomicBool,
    rssi_valid: AtomicBool,
    rssi_dbm: AtomicI8,
    /// Packed a.b.c.d octets; 0 = unset.
    address: AtomicU32,
    join_requests: AtomicU32,
    force_disconnect: AtomicBool,
}

impl LinkHandle {
    pub const fn new() -> Self {
        Self {
            link_up: AtomicBool::new(false),
            has_ipv4: AtomicBool::new(false),
            rssi_valid: AtomicBool::new(false),
            rssi_dbm: AtomicI8::new(0),
            address: AtomicU32::new(0),
            join_requests: AtomicU32::new(0),
            force_disconnect: AtomicBool::new(false),
        }
    }

    pub fn snapshot(&self) -> LinkSnapshot {
        let packed = self.address.load(Ordering::Acquire);
        LinkSnapshot {
            link_up: self.link_up.load(Ordering::Acquire),
            has_ipv4: self.has_ipv4.load(Ordering::Acquire),
            rssi_dbm: self
                .rssi_valid
                .load(Ordering::Acquire)
                .then(|| self.rssi_dbm.load(Ordering::Acquire)),
            address: (packed != 0).then(|| packed.to_be_bytes()),
        }
    }

    pub fn mark_connecting(&self) {
        self.link_up.store(false, Ordering::Release);
        self.has_ipv4.store(false, Ordering::Release);
    }

    pub fn mark_disconnected(&self) {
        self.link_up.store(false, Ordering::Release);
        self.has_ipv4.store(false, Ordering::Release);
        self.rssi_valid.store(false, Ordering::Release);
        self.address.store(0, Ordering::Release);
    }

    pub fn update_link_ip(&self, link_up: bool, has_ipv4: bool) {
        self.link_up.store(link_up, Ordering::Release);
        self.has_ipv4.store(has_ipv4, Ordering::Release);
    }

    pub fn set_rssi(&self, dbm: i8) {
        self.rssi_dbm.store(dbm, Ordering::Release);
        self.rssi_valid.store(true, Ordering::Release);
    }

    pub fn set_address(&self, octets: [u8; 4]) {
        self.address
            .store(u32::from_be_bytes(octets), Ordering::Release);
    }

    /// Core side: asks the worker for a fresh join attempt.
    pub fn request_join(&self) {
        self.join_requests.fetch_add(1, Ordering::AcqRel);
    }

    /// Core side: asks the worker to drop the current association.
    pub fn request_disconnect(&self) {
        self.force_disconnect.store(true, Ordering::Release);
    }

    /// Worker side: total join requests issued so far.
    pub fn join_requests(&self) -> u32 {
        self.join_requests.load(Ordering::Acquire)
    }

    /// Worker side: consumes a pending disconnect request.
    pub fn take_disconnect_request(&self) -> bool {
        self.force_disconnect.swap(false, Ordering::AcqRel)
    }
}

impl Default for LinkHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Core-facing adapter over a shared [`LinkHandle`].
pub struct WifiLink {
    handle: &'static LinkHandle,
}

impl WifiLink {
    pub const fn new(handle: &'static LinkHandle) -> Self {
        Self { handle }
    }
}

impl NetworkLink for WifiLink {
    type Error = core::convert::Infallible;

    fn begin_join(&mut self) -> Result<(), Self::Error> {
        self.handle.request_join();
        Ok(())
    }

    fn is_associated(&self) -> bool {
        self.handle.snapshot().associated()
    }

    fn signal_dbm(&self) -> Option<i8> {
        self.handle.snapshot().rssi_dbm
    }

    fn assigned_address(&self) -> Option<[u8; 4]> {
        self.handle.snapshot().address
    }

    fn disconnect(&mut self, _force: bool) {
        self.handle.request_disconnect();
    }
}
