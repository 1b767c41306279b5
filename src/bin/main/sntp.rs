//! SNTP worker: answers core sync requests with a single unicast query
//! per server and re-syncs on a fixed interval afterwards.

use embassy_net::{
    IpEndpoint, Stack,
    dns::DnsQueryType,
    udp::{PacketMetadata, UdpSocket},
};
use embassy_time::{Duration, Instant, Timer, WithTimeout};
use log::{info, warn};
use skywave_hal_esp32s3::clock::ClockHandle;

const NTP_PORT: u16 = 123;
const LOCAL_PORT: u16 = 55123;
const QUERY_TIMEOUT_SECS: u64 = 5;
const RESYNC_INTERVAL_SECS: u64 = 3_600;
const RETRY_DELAY_SECS: u64 = 5;
const COMMAND_POLL_MS: u64 = 200;
/// Seconds between the NTP epoch (1900) and the Unix epoch (1970).
const NTP_UNIX_DELTA: u32 = 2_208_988_800;

pub async fn sync_task(stack: Stack<'_>, clock: &'static ClockHandle) -> ! {
    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0u8; 256];
    let mut tx_buffer = [0u8; 256];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    if let Err(err) = socket.bind(LOCAL_PORT) {
        warn!("sntp bind failed: {:?}", err);
    }

    let mut served = 0u32;
    let mut synced_at: Option<Instant> = None;

    loop {
        let requested = clock.sync_requests();
        let resync_due = synced_at
            .is_some_and(|at| at.elapsed() >= Duration::from_secs(RESYNC_INTERVAL_SECS));
        if requested == served && !resync_due {
            Timer::after_millis(COMMAND_POLL_MS).await;
            continue;
        }

        let Some(servers) = clock.servers() else {
            Timer::after_millis(COMMAND_POLL_MS).await;
            continue;
        };

        let mut answered = false;
        for server in servers {
            if let Some(unix) = query_server(stack, &mut socket, server).await {
                clock.set_unix(unix, Instant::now().as_secs() as u32);
                info!("sntp synced from {} unix={}", server, unix);
                synced_at = Some(Instant::now());
                answered = true;
                break;
            }
        }

        if answered {
            served = requested;
        } else {
            // An unserved request stays pending, so the next pass tries
            // again. Not escalated: the core keeps polling and the sync
            // screen stays up.
            warn!("sntp: no server reachable");
            Timer::after_secs(RETRY_DELAY_SECS).await;
        }
    }
}

async fn query_server(
    stack: Stack<'_>,
    socket: &mut UdpSocket<'_>,
    server: &str,
) -> Option<u32> {
    let addrs = stack.dns_query(server, DnsQueryType::A).await.ok()?;
    let addr = addrs.first().copied()?;

    // Mode 3 (client), version 4; the transmit timestamp is all we use.
    let mut packet = [0u8; 48];
    packet[0] = 0x23;
    socket
        .send_to(&packet, IpEndpoint::new(addr, NTP_PORT))
        .await
        .ok()?;

    let mut response = [0u8; 48];
    let (len, _meta) = socket
        .recv_from(&mut response)
        .with_timeout(Duration::from_secs(QUERY_TIMEOUT_SECS))
        .await
        .ok()?
        .ok()?;
    if len < 48 {
        return None;
    }

    let seconds = u32::from_be_bytes([response[40], response[41], response[42], response[43]]);
    seconds.checked_sub(NTP_UNIX_DELTA)
}
