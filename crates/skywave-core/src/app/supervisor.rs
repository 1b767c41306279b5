impl<NET, CLK, STR> RadioApp<NET, CLK, STR>
where
    NET: NetworkLink,
    CLK: ClockSource,
    STR: StreamPipeline,
{
    fn supervise_stream(&mut self, now_ms: u64) {
        // Mailbox drained once per tick; arrival touches metadata fields
        // only, never phase or timers.
        while let Some(event) = self.stream.poll_metadata() {
            self.now_playing.apply(&event, now_ms);
        }

        if self.session.running && !self.stream.is_running() {
            info!("stream reported stopped");
            self.session.running = false;
            self.session.cooldown_since_ms = Some(now_ms);
        }

        if self.session.running {
            if !self.stream.pump() {
                info!("stream pump failed");
                self.session.running = false;
                self.session.cooldown_since_ms = Some(now_ms);
            }
            return;
        }

        let cooled_down = self
            .session
            .cooldown_since_ms
            .is_none_or(|since| now_ms.saturating_sub(since) >= STREAM_RESTART_COOLDOWN_MS);
        if cooled_down {
            self.start_session(now_ms);
        }
    }

    fn start_session(&mut self, now_ms: u64) {
        // Stamped even when the start fails so retries stay bounded.
        self.session.cooldown_since_ms = Some(now_ms);
        match self.stream.start(self.config.station_url) {
            Ok(()) => {
                info!("stream session started url={}", self.config.station_url);
                self.session.running = true;
            }
            Err(_) => {
                warn!("stream start failed");
                self.session.running = false;
            }
        }
    }

    fn stop_session(&mut self) {
        if self.session.running {
            info!("stream session stopped");
        }
        self.stream.stop();
        self.session = SessionState::default();
        self.now_playing.clear();
    }
}
