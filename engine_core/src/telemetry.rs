use std::time::Duration;

use crate::{logsys::Logger, stage::Stage, time::TimePoint};

/// Stage timings and periodic rate logging.
pub struct Telemetry {
    log: Logger,

    enabled: bool,
    period: TimePoint,
    last_report: TimePoint,

    // last measured duration per stage, indexed by Stage::index()
    stage_times: [Duration; 6],
}

impl Telemetry {
    pub fn new() -> Self {
        Self {
            log: Logger::new("Telemetry"),
            enabled: true,
            period: TimePoint::from_millis(1_000),
            last_report: TimePoint::ZERO,
            stage_times: [Duration::ZERO; 6],
        }
    }

    pub fn configure(&mut self, enabled: bool, period_sec: f32) {
        self.enabled = enabled;
        self.period = TimePoint::from_secs_f64(f64::from(period_sec.max(0.25)));
    }

    #[inline]
    pub fn record_stage(&mut self, stage: Stage, dur: Duration) {
        self.stage_times[stage.index()] = dur;
    }

    #[inline]
    pub fn last_stage(&self, stage: Stage) -> Duration {
        self.stage_times[stage.index()]
    }

    pub fn report(&mut self, now: TimePoint, ups: u32, fps: u32) {
        if !self.enabled || now - self.last_report < self.period {
            return;
        }
        self.last_report = now;

        self.log.info(format!("ups={ups} fps={fps}"));
        self.log.debug(
            Stage::DISPATCHED
                .iter()
                .map(|s| format!("{}={:.3}ms", s, self.last_stage(*s).as_secs_f64() * 1000.0))
                .collect::<Vec<_>>()
                .join(" "),
        );
    }
}

impl Default for Telemetry {
    fn default() -> Self {
        Self::new()
    }
}
