//! Stream reader: one ICY session per core start command, feeding audio
//! bytes to the sink and titles to the metadata slot.

use core::fmt::Write as _;

use embassy_net::{Stack, dns::DnsQueryType, tcp::TcpSocket};
use embassy_time::{Duration, Timer, WithTimeout};
use embedded_io_async::Write as _;
use heapless::String;
use log::{info, warn};
use skywave_core::stream::{METADATA_TEXT_BYTES, MetadataEvent, MetadataKind, copy_truncated};
use skywave_hal_esp32s3::stream::{
    AudioSink, StreamHandle,
    icy::{self, MetadataDemux, Step},
};

const COMMAND_POLL_MS: u64 = 100;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 10;
const HEAD_BYTES: usize = 1024;
const CHUNK_BYTES: usize = 1024;
const USER_AGENT: &str = "skywave/0.1";

/// Bring-up sink: accounts throughput until a codec is wired behind it.
#[derive(Debug, Default)]
struct ThroughputSink {
    bytes: u64,
    last_report: u64,
}

impl AudioSink for ThroughputSink {
    fn push(&mut self, bytes: &[u8]) {
        self.bytes += bytes.len() as u64;
        if self.bytes - self.last_report >= 256 * 1024 {
            self.last_report = self.bytes;
            info!("stream audio bytes={}", self.bytes);
        }
    }
}

pub async fn reader_task(stack: Stack<'_>, handle: &'static StreamHandle) -> ! {
    let mut rx_buffer = [0u8; 4096];
    let mut tx_buffer = [0u8; 512];
    let mut sink = ThroughputSink::default();
    let mut served = 0u32;

    loop {
        if handle.take_stop_request() {
            handle.mark_stopped();
        }

        let requested = handle.start_requests();
        if requested == served {
            Timer::after_millis(COMMAND_POLL_MS).await;
            continue;
        }
        served = requested;

        let Some(url) = handle.url() else {
            handle.mark_stopped();
            continue;
        };
        // A start supersedes any stop issued before it.
        let _ = handle.take_stop_request();

        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(READ_TIMEOUT_SECS)));
        match run_session(stack, &mut socket, handle, &mut sink, url).await {
            Ok(()) => info!("stream session ended"),
            Err(reason) => warn!("stream session failed: {}", reason),
        }
        socket.close();
        handle.mark_stopped();
    }
}

async fn run_session(
    stack: Stack<'_>,
    socket: &mut TcpSocket<'_>,
    handle: &'static StreamHandle,
    sink: &mut impl AudioSink,
    url: &'static str,
) -> Result<(), &'static str> {
    let parts = icy::parse_url(url).ok_or("unsupported url")?;
    let addrs = stack
        .dns_query(parts.host, DnsQueryType::A)
        .await
        .map_err(|_| "dns lookup failed")?;
    let addr = *addrs.first().ok_or("dns returned nothing")?;

    socket
        .connect((addr, parts.port))
        .with_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .await
        .map_err(|_| "connect timeout")?
        .map_err(|_| "connect failed")?;

    let mut request: String<256> = String::new();
    write!(
        request,
        "GET {} HTTP/1.1\r\nHost: {}\r\nUser-Agent: {}\r\nIcy-MetaData: 1\r\nConnection: close\r\n\r\n",
        parts.path, parts.host, USER_AGENT
    )
    .map_err(|_| "request too long")?;
    socket
        .write_all(request.as_bytes())
        .await
        .map_err(|_| "request write failed")?;

    let mut head = [0u8; HEAD_BYTES];
    let mut head_len = 0usize;
    let body_start = loop {
        if head_len == head.len() {
            return Err("response head too large");
        }
        let n = socket
            .read(&mut head[head_len..])
            .await
            .map_err(|_| "head read failed")?;
        if n == 0 {
            return Err("closed during head");
        }
        head_len += n;
        if let Some(end) = icy::find_head_end(&head[..head_len]) {
            break end;
        }
    };

    let head_text = core::str::from_utf8(&head[..body_start]).map_err(|_| "head not utf-8")?;
    let headers = icy::parse_response_head(head_text).ok_or("malformed response head")?;
    if headers.status != 200 {
        return Err("non-200 response");
    }
    info!(
        "stream connected metaint={:?} bitrate_kbps={:?}",
        headers.metaint, headers.bitrate_kbps
    );

    if let Some(station) = headers.station.as_ref() {
        post_metadata(handle, MetadataKind::StationName, station.as_str());
    }

    handle.mark_running();

    let mut demux = MetadataDemux::new(headers.metaint.unwrap_or(0));
    // Head bytes past the header block are already stream payload.
    feed(handle, sink, &mut demux, &head[body_start..head_len]);

    let mut chunk = [0u8; CHUNK_BYTES];
    loop {
        if handle.take_stop_request() {
            return Ok(());
        }

        let n = socket.read(&mut chunk).await.map_err(|_| "read failed")?;
        if n == 0 {
            return Err("end of stream");
        }
        handle.note_progress(n);
        feed(handle, sink, &mut demux, &chunk[..n]);
    }
}

fn feed(
    handle: &'static StreamHandle,
    sink: &mut impl AudioSink,
    demux: &mut MetadataDemux,
    mut bytes: &[u8],
) {
    while !bytes.is_empty() {
        let (used, step) = demux.advance(bytes);
        match step {
            Step::Audio(len) => sink.push(&bytes[..len]),
            Step::Title(title) => {
                post_metadata(handle, MetadataKind::TrackTitle, title.as_str());
            }
            Step::Skip => {}
        }
        bytes = &bytes[used..];
    }
}

fn post_metadata(handle: &'static StreamHandle, kind: MetadataKind, text: &str) {
    info!("stream metadata {:?}: {}", kind, text);
    let text: String<METADATA_TEXT_BYTES> = copy_truncated(text);
    handle.metadata.post(MetadataEvent { kind, text });
}
