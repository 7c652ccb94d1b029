use crate::{
    module::Module,
    signals::ShutdownFlag,
    stage::Stage,
    table::{Handle, ModuleTable},
    time::{ChangePerSecond, ElapsedTime, Interval, Time, TimePoint},
};

/// Logic and render timers of the loop.
///
/// The two run independently: logic ticks on a fixed interval, render is
/// rate-limited by an fps cap (`<= 0` means every iteration).
#[derive(Debug, Clone)]
pub struct FrameClock {
    logic: ElapsedTime,
    render: ElapsedTime,
    fps_cap: f32,

    ups: ChangePerSecond,
    fps: ChangePerSecond,

    iteration: u64,
    logic_tick: u64,
    render_frame: u64,
    last_iteration: TimePoint,
}

impl FrameClock {
    pub fn new(logic_interval: Interval, fps_cap: f32, now: TimePoint) -> Self {
        Self {
            logic: ElapsedTime::new(logic_interval, now),
            render: ElapsedTime::new(Self::render_interval_for(fps_cap), now),
            fps_cap,
            ups: ChangePerSecond::default(),
            fps: ChangePerSecond::default(),
            iteration: 0,
            logic_tick: 0,
            render_frame: 0,
            last_iteration: now,
        }
    }

    pub fn render_interval_for(fps_cap: f32) -> Interval {
        if !fps_cap.is_finite() || fps_cap <= 0.0 {
            return Interval::Unbounded;
        }
        Interval::from_micros((1_000_000.0 / f64::from(fps_cap)).round() as i64)
    }

    pub fn set_fps_cap(&mut self, fps_cap: f32) {
        self.fps_cap = fps_cap;
        self.render.set_interval(Self::render_interval_for(fps_cap));
    }

    #[inline]
    pub fn fps_cap(&self) -> f32 {
        self.fps_cap
    }

    #[inline]
    pub fn set_logic_interval(&mut self, interval: Interval) {
        self.logic.set_interval(interval);
    }

    #[inline]
    pub fn logic_interval(&self) -> Interval {
        self.logic.interval()
    }

    #[inline]
    pub fn render_interval(&self) -> Interval {
        self.render.interval()
    }

    pub(crate) fn begin_iteration(&mut self) {
        self.iteration += 1;
    }

    pub(crate) fn end_iteration(&mut self, now: TimePoint) {
        self.last_iteration = now;
    }

    #[inline]
    pub fn logic_elapsed(&self, now: TimePoint) -> u32 {
        self.logic.ticks(now)
    }

    #[inline]
    pub fn render_elapsed(&self, now: TimePoint) -> u32 {
        self.render.ticks(now)
    }

    pub(crate) fn count_logic_step(&mut self, now: TimePoint) {
        self.logic_tick += 1;
        self.ups.update(now);
    }

    pub(crate) fn finish_logic(&mut self, now: TimePoint) {
        self.logic.reset(now);
    }

    pub(crate) fn count_render(&mut self, now: TimePoint) {
        self.render_frame += 1;
        self.fps.update(now);
    }

    pub(crate) fn finish_render(&mut self, now: TimePoint) {
        self.render.reset(now);
    }

    #[inline]
    pub fn updates_per_second(&self) -> u32 {
        self.ups.value()
    }

    #[inline]
    pub fn frames_per_second(&self) -> u32 {
        self.fps.value()
    }

    #[inline]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn snapshot(&self, now: TimePoint, stage: Stage) -> Time {
        let delta = match stage {
            Stage::Pre | Stage::Normal | Stage::Post => self.logic.since_start(now),
            Stage::Render => self.render.since_start(now),
            Stage::None | Stage::Invariably => (now - self.last_iteration).max(TimePoint::ZERO),
        };

        Time {
            now,
            delta,
            stage,
            iteration: self.iteration,
            logic_tick: self.logic_tick,
            render_frame: self.render_frame,
            updates_per_second: self.ups.value(),
            frames_per_second: self.fps.value(),
        }
    }
}

/// What a module (or the app) can touch while it runs.
///
/// The module being updated is checked out of the table for the duration of
/// the call, so looking itself up returns `None`.
pub struct FrameContext<'a> {
    time: &'a Time,
    modules: &'a mut ModuleTable,
    shutdown: &'a ShutdownFlag,
}

impl<'a> FrameContext<'a> {
    pub(crate) fn new(time: &'a Time, modules: &'a mut ModuleTable, shutdown: &'a ShutdownFlag) -> Self {
        Self { time, modules, shutdown }
    }

    #[inline]
    pub fn time(&self) -> &Time {
        self.time
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.time.stage
    }

    #[inline]
    pub fn module<T: Module>(&self, handle: Handle<T>) -> Option<&T> {
        self.modules.get(handle)
    }

    #[inline]
    pub fn module_mut<T: Module>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        self.modules.get_mut(handle)
    }

    #[inline]
    pub fn modules(&self) -> &ModuleTable {
        &*self.modules
    }

    #[inline]
    pub fn modules_mut(&mut self) -> &mut ModuleTable {
        &mut *self.modules
    }

    /// Stops the loop at the top of the next iteration; the current one still finishes.
    #[inline]
    pub fn request_stop(&mut self) {
        self.shutdown.set();
    }

    #[inline]
    pub fn is_stop_requested(&self) -> bool {
        self.shutdown.is_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_cap_sets_render_interval() {
        let clock = FrameClock::new(Interval::from_millis(15.0), 30.0, TimePoint::ZERO);
        assert_eq!(clock.render_interval(), Interval::Every(TimePoint::from_micros(33_333)));
    }

    #[test]
    fn non_positive_cap_renders_every_iteration() {
        let mut clock = FrameClock::new(Interval::from_millis(15.0), 30.0, TimePoint::ZERO);
        clock.set_fps_cap(0.0);
        assert_eq!(clock.render_interval(), Interval::Unbounded);
        assert_eq!(clock.render_elapsed(TimePoint::ZERO), 1);

        clock.set_fps_cap(-5.0);
        assert_eq!(clock.render_interval(), Interval::Unbounded);

        clock.set_fps_cap(60.0);
        assert_eq!(clock.render_elapsed(TimePoint::from_millis(16)), 0);
        assert_eq!(clock.render_elapsed(TimePoint::from_millis(17)), 1);
    }

    #[test]
    fn logic_delta_measures_since_last_tick() {
        let mut clock = FrameClock::new(Interval::from_millis(15.0), 0.0, TimePoint::ZERO);
        let now = TimePoint::from_millis(16);
        assert_eq!(clock.logic_elapsed(now), 1);
        assert_eq!(clock.snapshot(now, Stage::Normal).delta, now);

        clock.count_logic_step(now);
        clock.finish_logic(now);
        assert_eq!(clock.logic_elapsed(TimePoint::from_millis(30)), 0);
        assert_eq!(clock.snapshot(now, Stage::Post).logic_tick, 1);
    }
}
