//! Stream pipeline abstraction and now-playing metadata state.

use heapless::String;

/// Byte budget for one metadata text field.
pub const METADATA_TEXT_BYTES: usize = 64;
/// Character cap applied to titles before display; longer titles are
/// truncated, never wrapped.
pub const TITLE_DISPLAY_CHARS: usize = 21;
/// A track title is shown this long after arrival before the status line
/// falls back to the generic running/stopped label.
pub const TITLE_WINDOW_MS: u64 = 120_000;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetadataKind {
    StationName,
    TrackTitle,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetadataEvent {
    pub kind: MetadataKind,
    pub text: String<METADATA_TEXT_BYTES>,
}

/// Polled stream session collaborator.
///
/// `pump` runs one decode step and must return promptly; metadata is
/// drained from a single-slot mailbox rather than delivered through a
/// callback, so arrival never does unbounded work in the decode path.
pub trait StreamPipeline {
    type Error;

    fn start(&mut self, url: &'static str) -> Result<(), Self::Error>;
    /// One decode step; `false` means the session stopped (end of
    /// stream or decode error).
    fn pump(&mut self) -> bool;
    fn stop(&mut self);
    fn is_running(&self) -> bool;
    fn poll_metadata(&mut self) -> Option<MetadataEvent>;
}

/// Station/track fields shown on the ready screen.
#[derive(Clone, Debug, Default)]
pub struct NowPlaying {
    station: String<METADATA_TEXT_BYTES>,
    title: String<METADATA_TEXT_BYTES>,
    title_arrived_ms: Option<u64>,
}

impl NowPlaying {
    pub const fn new() -> Self {
        Self {
            station: String::new(),
            title: String::new(),
            title_arrived_ms: None,
        }
    }

    /// Overwrites the matching field and, for titles, the arrival stamp.
    pub fn apply(&mut self, event: &MetadataEvent, now_ms: u64) {
        match event.kind {
            MetadataKind::StationName => {
                self.station = event.text.clone();
            }
            MetadataKind::TrackTitle => {
                self.title = event.text.clone();
                self.title_arrived_ms = Some(now_ms);
            }
        }
    }

    pub fn station(&self) -> Option<&str> {
        (!self.station.is_empty()).then_some(self.station.as_str())
    }

    /// Current title while inside its display window.
    pub fn title(&self, now_ms: u64) -> Option<&str> {
        let arrived = self.title_arrived_ms?;
        if self.title.is_empty() || now_ms.saturating_sub(arrived) >= TITLE_WINDOW_MS {
            return None;
        }
        Some(self.title.as_str())
    }

    pub fn clear(&mut self) {
        self.station.clear();
        self.title.clear();
        self.title_arrived_ms = None;
    }
}

/// Truncates at a character cap without splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, cap: usize) -> &str {
    match text.char_indices().nth(cap) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Copies as many leading characters as fit the capacity.
pub fn copy_truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title_event(text: &str) -> MetadataEvent {
        MetadataEvent {
            kind: MetadataKind::TrackTitle,
            text: copy_truncated(text),
        }
    }

    #[test]
    fn title_expires_after_window() {
        let mut playing = NowPlaying::new();
        playing.apply(&title_event("Boards of Canada - Dayvan Cowboy"), 1_000);

        assert_eq!(
            playing.title(1_001),
            Some("Boards of Canada - Dayvan Cowboy")
        );
        assert!(playing.title(1_000 + TITLE_WINDOW_MS - 1).is_some());
        assert!(playing.title(1_000 + TITLE_WINDOW_MS).is_none());
    }

    #[test]
    fn new_arrival_restarts_window() {
        let mut playing = NowPlaying::new();
        playing.apply(&title_event("first"), 0);
        playing.apply(&title_event("second"), TITLE_WINDOW_MS);

        assert_eq!(playing.title(TITLE_WINDOW_MS + 1), Some("second"));
    }

    #[test]
    fn station_is_kept_separately() {
        let mut playing = NowPlaying::new();
        playing.apply(
            &MetadataEvent {
                kind: MetadataKind::StationName,
                text: copy_truncated("SomaFM"),
            },
            5,
        );

        assert_eq!(playing.station(), Some("SomaFM"));
        assert!(playing.title(5).is_none());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("abcdef", 4), "abcd");
        assert_eq!(truncate_chars("ab", 4), "ab");
        assert_eq!(truncate_chars("éééééé", 3), "ééé");

        let copied: String<4> = copy_truncated("éééé");
        assert_eq!(copied.as_str(), "éé");
    }
}
