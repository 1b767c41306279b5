impl<NET, CLK, STR> RadioApp<NET, CLK, STR>
where
    NET: NetworkLink,
    CLK: ClockSource,
    STR: StreamPipeline,
{
    /// Composes the screen for the current phase. Presentation stays
    /// with the caller; the tick's render decision is the only gate.
    pub fn with_screen<F>(&self, now_ms: u64, f: F)
    where
        F: FnOnce(Screen<'_>),
    {
        match self.phase {
            Phase::Booting => f(Screen::Progress {
                title: self.config.app_title,
                subtitle: "STARTING",
                detail: "",
                spinner_step: self.spinner_step,
            }),
            Phase::ConnectingNetwork => f(Screen::Progress {
                title: self.config.app_title,
                subtitle: "CONNECTING",
                detail: self.config.network_label,
                spinner_step: self.spinner_step,
            }),
            Phase::SyncingClock => f(Screen::Progress {
                title: self.config.app_title,
                subtitle: "SYNCING CLOCK",
                detail: self.config.time_servers.first().copied().unwrap_or(""),
                spinner_step: self.spinner_step,
            }),
            Phase::Ready => {
                let quality =
                    QualityLevel::from_link(self.link.is_associated(), self.link.signal_dbm());
                let clock = self
                    .clock
                    .now_unix()
                    .filter(|&unix| is_plausible(unix))
                    .and_then(|unix| WallClock::from_unix(unix, self.config.utc_offset_minutes));
                let status = match self.now_playing.title(now_ms) {
                    Some(title) => StatusLine::Track(truncate_chars(title, TITLE_DISPLAY_CHARS)),
                    None if self.session.running => StatusLine::Playing,
                    None => StatusLine::Stopped,
                };
                let station = self
                    .now_playing
                    .station()
                    .unwrap_or(self.config.station_label);

                f(Screen::Ready {
                    station,
                    quality,
                    clock,
                    status,
                });
            }
        }
    }
}
