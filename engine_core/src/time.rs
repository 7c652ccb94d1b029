use std::ops::{Add, Sub};
use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use crate::stage::Stage;

/// Microseconds since the clock's epoch. Signed so a clock going backwards stays representable.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TimePoint(i64);

impl TimePoint {
    pub const ZERO: TimePoint = TimePoint(0);

    #[inline]
    pub const fn from_micros(us: i64) -> Self {
        Self(us)
    }

    #[inline]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms.saturating_mul(1_000))
    }

    #[inline]
    pub fn from_secs_f64(secs: f64) -> Self {
        Self((secs * 1_000_000.0).round() as i64)
    }

    #[inline]
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Whole seconds, rounded towards negative infinity.
    #[inline]
    pub const fn whole_secs(self) -> i64 {
        self.0.div_euclid(1_000_000)
    }
}

impl From<Duration> for TimePoint {
    fn from(d: Duration) -> Self {
        Self(i64::try_from(d.as_micros()).unwrap_or(i64::MAX))
    }
}

impl Add for TimePoint {
    type Output = TimePoint;

    fn add(self, rhs: TimePoint) -> TimePoint {
        TimePoint(self.0.saturating_add(rhs.0))
    }
}

impl Sub for TimePoint {
    type Output = TimePoint;

    fn sub(self, rhs: TimePoint) -> TimePoint {
        TimePoint(self.0.saturating_sub(rhs.0))
    }
}

/// Source of "now" for the engine loop.
pub trait Clock {
    fn now(&self) -> TimePoint;
}

/// Monotonic wall clock with its epoch at construction.
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> TimePoint {
        TimePoint::from(self.epoch.elapsed())
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock {
    now_us: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: TimePoint) {
        self.now_us.fetch_add(by.as_micros(), Ordering::Relaxed);
    }

    pub fn set(&self, at: TimePoint) {
        self.now_us.store(at.as_micros(), Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> TimePoint {
        TimePoint(self.now_us.load(Ordering::Relaxed))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Interval {
    Every(TimePoint),
    /// Always elapsed.
    Unbounded,
}

impl Interval {
    /// Non-positive lengths mean `Unbounded`.
    pub fn from_micros(us: i64) -> Self {
        if us <= 0 {
            Interval::Unbounded
        } else {
            Interval::Every(TimePoint::from_micros(us))
        }
    }

    pub fn from_millis(ms: f64) -> Self {
        Self::from_micros((ms * 1_000.0).round() as i64)
    }
}

impl From<Duration> for Interval {
    fn from(d: Duration) -> Self {
        Self::from_micros(TimePoint::from(d).as_micros())
    }
}

/// Counts how many whole intervals passed since `start`.
#[derive(Debug, Clone)]
pub struct ElapsedTime {
    start: TimePoint,
    interval: Interval,
}

impl ElapsedTime {
    pub fn new(interval: Interval, start: TimePoint) -> Self {
        Self { start, interval }
    }

    /// `floor((now - start) / interval)`; zero when time did not move forward.
    pub fn ticks(&self, now: TimePoint) -> u32 {
        match self.interval {
            Interval::Unbounded => 1,
            Interval::Every(len) => {
                let delta = (now - self.start).as_micros();
                if delta <= 0 {
                    return 0;
                }
                u32::try_from(delta / len.as_micros().max(1)).unwrap_or(u32::MAX)
            }
        }
    }

    #[inline]
    pub fn since_start(&self, now: TimePoint) -> TimePoint {
        (now - self.start).max(TimePoint::ZERO)
    }

    #[inline]
    pub fn reset(&mut self, now: TimePoint) {
        self.start = now;
    }

    #[inline]
    pub fn interval(&self) -> Interval {
        self.interval
    }

    #[inline]
    pub fn set_interval(&mut self, interval: Interval) {
        self.interval = interval;
    }
}

/// Rolling per-second event counter.
///
/// Events accumulate until one lands in a later whole second than the previous
/// one; the accumulated count becomes the published rate.
#[derive(Debug, Clone, Default)]
pub struct ChangePerSecond {
    pending: u32,
    value: u32,
    last: TimePoint,
}

impl ChangePerSecond {
    pub fn update(&mut self, now: TimePoint) {
        self.pending += 1;

        if now.whole_secs() > self.last.whole_secs() {
            self.value = self.pending;
            self.pending = 0;
        }

        self.last = now;
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }
}

/// Timing snapshot handed to modules.
#[derive(Debug, Clone, Copy)]
pub struct Time {
    /// Current loop time.
    pub now: TimePoint,

    /// Time since the previous tick of the running stage's kind
    /// (logic for `Pre/Normal/Post`, render for `Render`, iteration otherwise).
    pub delta: TimePoint,

    /// Stage being dispatched, `Stage::None` for the app.
    pub stage: Stage,

    /// Loop iterations so far, this one included.
    pub iteration: u64,

    /// Logic ticks dispatched so far.
    pub logic_tick: u64,

    /// Render frames dispatched so far.
    pub render_frame: u64,

    pub updates_per_second: u32,
    pub frames_per_second: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticks_floor_the_elapsed_ratio() {
        let e = ElapsedTime::new(Interval::from_millis(15.0), TimePoint::ZERO);
        assert_eq!(e.ticks(TimePoint::from_millis(14)), 0);
        assert_eq!(e.ticks(TimePoint::from_millis(15)), 1);
        assert_eq!(e.ticks(TimePoint::from_millis(44)), 2);
        assert_eq!(e.ticks(TimePoint::from_millis(45)), 3);
    }

    #[test]
    fn backwards_clock_counts_as_zero() {
        let e = ElapsedTime::new(Interval::from_millis(15.0), TimePoint::from_millis(100));
        assert_eq!(e.ticks(TimePoint::from_millis(40)), 0);
        assert_eq!(e.ticks(TimePoint::from_millis(100)), 0);
        assert_eq!(e.since_start(TimePoint::from_millis(40)), TimePoint::ZERO);
    }

    #[test]
    fn unbounded_interval_is_always_elapsed() {
        assert_eq!(Interval::from_micros(0), Interval::Unbounded);
        assert_eq!(Interval::from_millis(-3.0), Interval::Unbounded);

        let e = ElapsedTime::new(Interval::Unbounded, TimePoint::from_millis(10));
        assert_eq!(e.ticks(TimePoint::from_millis(10)), 1);
        assert_eq!(e.ticks(TimePoint::ZERO), 1);
    }

    #[test]
    fn change_per_second_latches_on_second_boundary() {
        let mut c = ChangePerSecond::default();
        for i in 1..=9 {
            c.update(TimePoint::from_millis(i * 100));
        }
        assert_eq!(c.value(), 0);

        c.update(TimePoint::from_millis(1_000));
        assert_eq!(c.value(), 10);

        for i in 1..=4 {
            c.update(TimePoint::from_millis(1_000 + i * 250));
        }
        assert_eq!(c.value(), 4);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.advance(TimePoint::from_millis(5));
        clock.advance(TimePoint::from_millis(5));
        assert_eq!(view.now(), TimePoint::from_millis(10));
        view.set(TimePoint::from_micros(7));
        assert_eq!(clock.now().as_micros(), 7);
    }
}
