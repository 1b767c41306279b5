//! ICY (Shoutcast/Icecast) response parsing and metadata demuxing.
//!
//! Servers asked for `Icy-MetaData: 1` interleave metadata blocks into
//! the audio stream every `icy-metaint` bytes: one length byte (block
//! size in 16-byte units, usually zero) followed by the NUL-padded
//! block text, e.g. `StreamTitle='Artist - Song';`.

use heapless::String;
use skywave_core::stream::{METADATA_TEXT_BYTES, copy_truncated};

/// Collection cap while reading a block; blocks can reach 4080 bytes on
/// the wire but the leading `StreamTitle` is all that matters.
const META_BUF_BYTES: usize = 512;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UrlParts<'a> {
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
}

/// Splits a plain-HTTP stream locator into host, port, and path.
pub fn parse_url(url: &str) -> Option<UrlParts<'_>> {
    let rest = url.strip_prefix("http://")?;
    let (authority, path) = match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, "/"),
    };
    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => (host, port.parse().ok()?),
        None => (authority, 80),
    };

    if host.is_empty() {
        return None;
    }
    Some(UrlParts { host, port, path })
}

/// Offset just past the `\r\n\r\n` head terminator, if present.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|window| window == b"\r\n\r\n")
        .map(|idx| idx + 4)
}

/// Fields parsed from an ICY (or plain HTTP) response head.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IcyHeaders {
    pub status: u16,
    pub metaint: Option<u32>,
    pub station: Option<String<METADATA_TEXT_BYTES>>,
    pub bitrate_kbps: Option<u32>,
}

/// Parses the status line (`ICY 200 OK` or `HTTP/1.x 200 OK`) and the
/// icy-* headers the session cares about.
pub fn parse_response_head(head: &str) -> Option<IcyHeaders> {
    let mut lines = head.split("\r\n");
    let status = lines.next()?.split_whitespace().nth(1)?.parse().ok()?;

    let mut headers = IcyHeaders {
        status,
        metaint: None,
        station: None,
        bitrate_kbps: None,
    };

    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        if name.eq_ignore_ascii_case("icy-metaint") {
            headers.metaint = value.parse().ok();
        } else if name.eq_ignore_ascii_case("icy-name") {
            headers.station = Some(copy_truncated(value));
        } else if name.eq_ignore_ascii_case("icy-br") {
            headers.bitrate_kbps = value.parse().ok();
        }
    }

    Some(headers)
}

/// Pulls the title out of `StreamTitle='…';` block text.
pub fn extract_stream_title(meta: &str) -> Option<&str> {
    let start = meta.find("StreamTitle='")? + "StreamTitle='".len();
    let rest = &meta[start..];
    let end = rest.find("';").or_else(|| rest.rfind('\''))?;
    let title = rest[..end].trim();

    (!title.is_empty()).then_some(title)
}

/// One demux step over the head of the input chunk.
pub enum Step {
    /// The first `n` input bytes are audio payload.
    Audio(usize),
    /// A metadata block completed with this title inside.
    Title(String<METADATA_TEXT_BYTES>),
    /// Framing or metadata bytes were consumed with nothing to emit.
    Skip,
}

/// Incremental demuxer separating audio from metaint-framed metadata.
pub struct MetadataDemux {
    metaint: u32,
    /// Audio bytes before the next length byte.
    audio_left: u32,
    /// Metadata bytes still owed for the current block.
    meta_left: u16,
    buf: [u8; META_BUF_BYTES],
    buf_len: usize,
}

impl MetadataDemux {
    /// `metaint == 0` disables framing (plain audio stream).
    pub fn new(metaint: u32) -> Self {
        Self {
            metaint,
            audio_left: metaint,
            meta_left: 0,
            buf: [0; META_BUF_BYTES],
            buf_len: 0,
        }
    }

    /// Consumes a prefix of `chunk`; returns how many bytes were used
    /// and what they were. Call repeatedly until the chunk is drained.
    pub fn advance(&mut self, chunk: &[u8]) -> (usize, Step) {
        if chunk.is_empty() {
            return (0, Step::Skip);
        }

        if self.metaint == 0 {
            return (chunk.len(), Step::Audio(chunk.len()));
        }

        if self.meta_left > 0 {
            let take = (self.meta_left as usize).min(chunk.len());
            let copy = take.min(META_BUF_BYTES - self.buf_len);
            self.buf[self.buf_len..self.buf_len + copy].copy_from_slice(&chunk[..copy]);
            self.buf_len += copy;
            self.meta_left -= take as u16;

            if self.meta_left == 0 {
                return (take, self.finish_block());
            }
            return (take, Step::Skip);
        }

        if self.audio_left == 0 {
            // Length byte: block size in 16-byte units.
            self.meta_left = u16::from(chunk[0]) * 16;
            self.audio_left = self.metaint;
            self.buf_len = 0;
            return (1, Step::Skip);
        }

        let take = (self.audio_left as usize).min(chunk.len());
        self.audio_left -= take as u32;
        (take, Step::Audio(take))
    }

    fn finish_block(&mut self) -> Step {
        let text = core::str::from_utf8(&self.buf[..self.buf_len]).unwrap_or("");
        let text = text.trim_end_matches('\0');

        match extract_stream_title(text) {
            Some(title) => Step::Title(copy_truncated(title)),
            None => Step::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::string::{String as StdString, ToString};
    use std::vec::Vec;

    #[test]
    fn url_parsing_covers_port_and_path_defaults() {
        let parts = parse_url("http://ice1.somafm.com/groovesalad-128-mp3").unwrap();
        assert_eq!(parts.host, "ice1.somafm.com");
        assert_eq!(parts.port, 80);
        assert_eq!(parts.path, "/groovesalad-128-mp3");

        let parts = parse_url("http://radio.example:8000").unwrap();
        assert_eq!(parts.host, "radio.example");
        assert_eq!(parts.port, 8000);
        assert_eq!(parts.path, "/");

        assert!(parse_url("https://radio.example/s").is_none());
        assert!(parse_url("http://:8000/s").is_none());
    }

    #[test]
    fn head_end_is_found_past_terminator() {
        assert_eq!(find_head_end(b"ICY 200 OK\r\n\r\nmp3"), Some(14));
        assert_eq!(find_head_end(b"ICY 200 OK\r\n"), None);
    }

    #[test]
    fn response_head_yields_icy_fields() {
        let head = "ICY 200 OK\r\nicy-name: SomaFM Groove Salad\r\nICY-MetaInt:8192\r\nicy-br:128\r\nContent-Type: audio/mpeg";
        let headers = parse_response_head(head).unwrap();

        assert_eq!(headers.status, 200);
        assert_eq!(headers.metaint, Some(8192));
        assert_eq!(headers.station.unwrap().as_str(), "SomaFM Groove Salad");
        assert_eq!(headers.bitrate_kbps, Some(128));

        let plain = parse_response_head("HTTP/1.1 404 Not Found\r\n").unwrap();
        assert_eq!(plain.status, 404);
        assert_eq!(plain.metaint, None);
    }

    #[test]
    fn stream_title_extraction_handles_quotes_and_padding() {
        assert_eq!(
            extract_stream_title("StreamTitle='Artist - Song';StreamUrl='';"),
            Some("Artist - Song")
        );
        assert_eq!(
            extract_stream_title("StreamTitle='It's mine';"),
            Some("It's mine")
        );
        assert_eq!(extract_stream_title("StreamTitle='';"), None);
        assert_eq!(extract_stream_title("StreamUrl='x';"), None);
    }

    fn drain(
        demux: &mut MetadataDemux,
        bytes: &[u8],
        audio: &mut Vec<u8>,
        titles: &mut Vec<StdString>,
    ) {
        let mut rest = bytes;
        while !rest.is_empty() {
            let (used, step) = demux.advance(rest);
            assert!(used > 0);
            match step {
                Step::Audio(n) => audio.extend_from_slice(&rest[..n]),
                Step::Title(title) => titles.push(title.as_str().to_string()),
                Step::Skip => {}
            }
            rest = &rest[used..];
        }
    }

    #[test]
    fn demux_separates_audio_and_titles_across_chunks() {
        let mut wire = Vec::new();
        wire.extend_from_slice(&[0xAAu8; 8]);
        let mut block = b"StreamTitle='Song';".to_vec();
        block.resize(32, 0);
        wire.push(2);
        wire.extend_from_slice(&block);
        wire.extend_from_slice(&[0xBBu8; 8]);
        wire.push(0);
        wire.extend_from_slice(&[0xCCu8; 3]);

        let mut demux = MetadataDemux::new(8);
        let mut audio = Vec::new();
        let mut titles = Vec::new();

        // Feed in awkward chunk sizes to cross every boundary.
        for chunk in wire.chunks(5) {
            drain(&mut demux, chunk, &mut audio, &mut titles);
        }

        assert_eq!(audio.len(), 19);
        assert!(audio[..8].iter().all(|&b| b == 0xAA));
        assert!(audio[8..16].iter().all(|&b| b == 0xBB));
        assert!(audio[16..].iter().all(|&b| b == 0xCC));
        assert_eq!(titles, ["Song"]);
    }

    #[test]
    fn zero_metaint_passes_audio_through() {
        let mut demux = MetadataDemux::new(0);
        let mut audio = Vec::new();
        let mut titles = Vec::new();

        drain(&mut demux, &[1, 2, 3, 4], &mut audio, &mut titles);
        assert_eq!(audio, [1, 2, 3, 4]);
        assert!(titles.is_empty());
    }
}
