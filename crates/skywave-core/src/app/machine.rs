impl<NET, CLK, STR> RadioApp<NET, CLK, STR>
where
    NET: NetworkLink,
    CLK: ClockSource,
    STR: StreamPipeline,
{
    /// The app is constructed only after display bring-up succeeded,
    /// which is the `Booting` phase's exit condition.
    pub fn new(link: NET, clock: CLK, stream: STR, config: RadioConfig) -> Self {
        Self {
            link,
            clock,
            stream,
            config,
            phase: Phase::Booting,
            attempt_started_ms: 0,
            rejoin_at_ms: None,
            address: None,
            last_link_poll_ms: 0,
            session: SessionState::default(),
            now_playing: NowPlaying::new(),
            throttle: RenderThrottle::default(),
            spinner_step: 0,
        }
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn assigned_address(&self) -> Option<[u8; 4]> {
        self.address
    }

    /// One cooperative step. Transition evaluation runs before the
    /// stream pump, which runs before the render decision, so a
    /// transition taken this tick shows in this tick's frame.
    pub fn tick(&mut self, now_ms: u64) -> TickResult {
        self.advance_phase(now_ms);
        if self.phase == Phase::Ready {
            self.supervise_stream(now_ms);
        }
        self.render_decision(now_ms)
    }

    fn advance_phase(&mut self, now_ms: u64) {
        match self.phase {
            Phase::Booting => {
                self.begin_attempt(now_ms);
                self.enter(Phase::ConnectingNetwork);
            }
            Phase::ConnectingNetwork => self.tick_connecting(now_ms),
            Phase::SyncingClock => self.tick_syncing(now_ms),
            Phase::Ready => self.tick_ready_link(now_ms),
        }
    }

    fn tick_connecting(&mut self, now_ms: u64) {
        if self.link.is_associated() {
            self.rejoin_at_ms = None;
            self.address = self.link.assigned_address();
            if let Some([a, b, c, d]) = self.address {
                info!("network associated addr={}.{}.{}.{}", a, b, c, d);
            }
            if self.clock.begin_sync(self.config.time_servers).is_err() {
                warn!("time sync request failed");
            }
            self.enter(Phase::SyncingClock);
            return;
        }

        if let Some(rejoin_at) = self.rejoin_at_ms {
            if now_ms >= rejoin_at {
                self.rejoin_at_ms = None;
                self.begin_attempt(now_ms);
            }
            return;
        }

        if now_ms.saturating_sub(self.attempt_started_ms) > JOIN_TIMEOUT_MS {
            info!("join attempt timed out; restarting");
            self.link.disconnect(true);
            self.rejoin_at_ms = Some(now_ms + REJOIN_SETTLE_MS);
        }
    }

    fn tick_syncing(&mut self, now_ms: u64) {
        // No server reachable yet just keeps us here; the sync screen is
        // the whole report.
        if self.clock.now_unix().is_some_and(is_plausible) {
            info!("clock synchronized");
            self.start_session(now_ms);
            self.enter(Phase::Ready);
            self.last_link_poll_ms = now_ms;
        }
    }

    fn tick_ready_link(&mut self, now_ms: u64) {
        if now_ms.saturating_sub(self.last_link_poll_ms) < LINK_POLL_INTERVAL_MS {
            return;
        }
        self.last_link_poll_ms = now_ms;

        if !self.link.is_associated() {
            warn!("association lost; rejoining");
            self.stop_session();
            self.begin_attempt(now_ms);
            self.enter(Phase::ConnectingNetwork);
        }
    }

    fn begin_attempt(&mut self, now_ms: u64) {
        self.attempt_started_ms = now_ms;
        if self.link.begin_join().is_err() {
            warn!("join request failed");
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        // The first frame of a freshly entered phase is never held back
        // by a stale throttle slot.
        self.throttle.clear(phase);
    }

    fn render_decision(&mut self, now_ms: u64) -> TickResult {
        if !self.throttle.due(self.phase, now_ms) {
            return TickResult::NoRender;
        }

        if self.phase != Phase::Ready {
            self.spinner_step = self.spinner_step.wrapping_add(1) % SPINNER_STEPS;
        }
        self.throttle.mark(self.phase, now_ms);
        TickResult::RenderRequested
    }
}
