use std::time::Duration;

use crate::{
    app::{App, AppHost},
    config::EngineConfig,
    error::{EngineError, EngineResult},
    frame::{FrameClock, FrameContext},
    instantiate::instantiate,
    logsys::Logger,
    platform::{HeadlessPlatform, Platform},
    registry::ModuleCatalog,
    schedule::StageScheduler,
    signals::{ShutdownFlag, StopReason},
    stage::Stage,
    table::ModuleTable,
    telemetry::Telemetry,
    time::{Clock, Interval, SystemClock, TimePoint},
    version::Version,
};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EngineState {
    Constructed,
    Running,
    Stopped,
}

/// What one loop iteration did.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Iteration {
    /// The loop is over; nothing else ran.
    pub closed: bool,
    /// Whole logic intervals that had passed.
    pub logic_elapsed: u32,
    /// Logic dispatches actually performed.
    pub logic_steps: u32,
    pub rendered: bool,
}

pub struct EngineBuilder {
    catalog: ModuleCatalog,
    cfg: EngineConfig,
    platform: Option<Box<dyn Platform>>,
    clock: Option<Box<dyn Clock>>,
}

impl EngineBuilder {
    pub fn new(catalog: ModuleCatalog) -> Self {
        Self {
            catalog,
            cfg: EngineConfig::default(),
            platform: None,
            clock: None,
        }
    }

    pub fn config(mut self, cfg: EngineConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn platform(mut self, platform: impl Platform + 'static) -> Self {
        self.platform = Some(Box::new(platform));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    pub fn build(self) -> EngineResult<Engine> {
        Engine::construct(self)
    }
}

/// Owns the modules and the app, and drives them through the stages.
///
/// A catalog feeds exactly one engine: it is consumed on construction and
/// cleared when the engine is dropped.
pub struct Engine {
    log: Logger,
    cfg: EngineConfig,
    version: Version,
    state: EngineState,

    app: Option<AppHost>,
    scheduler: StageScheduler,
    catalog: ModuleCatalog,

    platform: Box<dyn Platform>,
    time_source: Box<dyn Clock>,
    clock: FrameClock,
    telemetry: Telemetry,

    shutdown: ShutdownFlag,
}

impl Engine {
    pub fn builder(catalog: ModuleCatalog) -> EngineBuilder {
        EngineBuilder::new(catalog)
    }

    fn construct(b: EngineBuilder) -> EngineResult<Self> {
        let log = Logger::new("Engine");
        let EngineBuilder { catalog, cfg, platform, clock } = b;

        let table = instantiate(&catalog)?;
        log.info(format!("{} modules instantiated", table.len()));

        let time_source = clock.unwrap_or_else(|| Box::new(SystemClock::new()));
        let platform = platform.unwrap_or_else(|| Box::new(HeadlessPlatform::new()));

        let now = time_source.now();
        let clock = FrameClock::new(Interval::from_millis(cfg.logic_interval_ms), cfg.fps_cap, now);

        let mut telemetry = Telemetry::new();
        telemetry.configure(cfg.log_rates, cfg.rate_log_period_sec);

        // process-wide and one-shot: only once nothing else can fail
        let shutdown = ShutdownFlag::new();
        if cfg.install_ctrlc {
            shutdown.install_ctrlc()?;
        }

        Ok(Self {
            log,
            cfg,
            version: Version::default(),
            state: EngineState::Constructed,
            app: None,
            scheduler: StageScheduler::new(table),
            catalog,
            platform,
            time_source,
            clock,
            telemetry,
            shutdown,
        })
    }

    /// Hosts `app`, replacing (and dropping) any app loaded before.
    pub fn load(&mut self, app: impl App + 'static) {
        if let Some(old) = self.app.take() {
            self.log.warn(format!("replacing loaded app {}; it will be dropped", old.name()));
        }
        self.app = Some(AppHost::new(Box::new(app)));
    }

    /// Whether the loaded app has run its start task.
    pub fn app_is_running(&self) -> Option<bool> {
        self.app.as_ref().map(AppHost::is_running)
    }

    /// Loops until a stop is requested or the platform closes.
    pub fn run(&mut self) -> EngineResult<()> {
        self.log.info(format!("run v{}", self.version));

        loop {
            match self.step() {
                Ok(it) if it.closed => break,
                Ok(_) => {}
                Err(e) => {
                    self.log.error(format!("loop aborted: {e}"));
                    self.state = EngineState::Stopped;
                    return Err(e);
                }
            }
        }

        self.log.info(format!("stopped after {} iterations", self.clock.iteration()));
        Ok(())
    }

    /// One loop iteration.
    pub fn step(&mut self) -> EngineResult<Iteration> {
        let mut it = Iteration::default();

        if self.state == EngineState::Stopped {
            it.closed = true;
            return Ok(it);
        }
        self.state = EngineState::Running;

        if !self.shutdown.is_set() && self.platform.should_close() {
            self.shutdown.request(StopReason::PlatformClosed);
        }
        if let Some(reason) = self.shutdown.reason() {
            self.state = EngineState::Stopped;
            self.log.info(format!("close requested: {reason}"));
            it.closed = true;
            return Ok(it);
        }

        let now = self.time_source.now();
        self.clock.begin_iteration();

        if let Some(app) = self.app.as_mut() {
            let time = self.clock.snapshot(now, Stage::None);
            let mut ctx = FrameContext::new(&time, self.scheduler.modules_mut(), &self.shutdown);
            app.tick(&mut ctx)?;
        }

        self.platform.poll_events().map_err(EngineError::Platform)?;

        self.dispatch(Stage::Invariably, now)?;

        let elapsed = self.clock.logic_elapsed(now);
        it.logic_elapsed = elapsed;
        if elapsed > 0 {
            let steps = elapsed.min(self.cfg.max_logic_steps.max(1));
            if steps < elapsed {
                self.log.debug(format!("dropping {} late logic ticks", elapsed - steps));
            }

            for _ in 0..steps {
                self.clock.count_logic_step(now);
                for stage in Stage::LOGIC {
                    self.dispatch(stage, now)?;
                }
            }
            self.clock.finish_logic(now);
            it.logic_steps = steps;
        }

        if self.clock.render_elapsed(now) > 0 {
            self.clock.count_render(now);
            self.dispatch(Stage::Render, now)?;
            self.clock.finish_render(now);
            it.rendered = true;
        }

        self.clock.end_iteration(now);
        self.telemetry
            .report(now, self.clock.updates_per_second(), self.clock.frames_per_second());

        Ok(it)
    }

    fn dispatch(&mut self, stage: Stage, now: TimePoint) -> EngineResult<()> {
        let time = self.clock.snapshot(now, stage);
        self.scheduler
            .run_stage(stage, &time, &self.shutdown, &mut self.telemetry)
    }

    /// Takes effect at the top of the next iteration.
    pub fn stop(&self) {
        self.shutdown.set();
    }

    /// Stop switch usable from outside the loop, including other threads.
    pub fn stop_handle(&self) -> ShutdownFlag {
        self.shutdown.clone()
    }

    /// Why the loop stopped (or is about to), if it was asked to.
    #[inline]
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.shutdown.reason()
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state != EngineState::Stopped && !self.shutdown.is_set()
    }

    #[inline]
    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn set_fps_cap(&mut self, fps_cap: f32) {
        self.cfg.fps_cap = fps_cap;
        self.clock.set_fps_cap(fps_cap);
    }

    #[inline]
    pub fn fps_cap(&self) -> f32 {
        self.clock.fps_cap()
    }

    pub fn set_logic_interval(&mut self, interval: Duration) {
        self.cfg.logic_interval_ms = interval.as_secs_f64() * 1000.0;
        self.clock.set_logic_interval(Interval::from(interval));
    }

    #[inline]
    pub fn frame_clock(&self) -> &FrameClock {
        &self.clock
    }

    #[inline]
    pub fn updates_per_second(&self) -> u32 {
        self.clock.updates_per_second()
    }

    #[inline]
    pub fn frames_per_second(&self) -> u32 {
        self.clock.frames_per_second()
    }

    #[inline]
    pub fn modules(&self) -> &ModuleTable {
        self.scheduler.modules()
    }

    #[inline]
    pub fn modules_mut(&mut self) -> &mut ModuleTable {
        self.scheduler.modules_mut()
    }

    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    #[inline]
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(app) = self.app.take() {
            self.log.debug(format!("release app {}", app.name()));
        }
        self.scheduler.teardown();
        self.catalog.clear();
        self.log.info("shutdown");
    }
}
