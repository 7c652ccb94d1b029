use crate::signals::ShutdownFlag;

/// Window / OS side of the loop.
///
/// `poll_events` runs once per iteration and must not block for longer than a frame.
pub trait Platform {
    fn poll_events(&mut self) -> anyhow::Result<()>;

    fn should_close(&self) -> bool;
}

/// Platform with no window: closes when its flag is set or after a poll budget.
#[derive(Default)]
pub struct HeadlessPlatform {
    close: ShutdownFlag,
    polls: u64,
    poll_limit: Option<u64>,
}

impl HeadlessPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_limit(limit: u64) -> Self {
        Self { poll_limit: Some(limit), ..Self::default() }
    }

    /// Shared close switch, e.g. to hand to a Ctrl+C handler.
    pub fn close_flag(&self) -> ShutdownFlag {
        self.close.clone()
    }

    #[inline]
    pub fn polls(&self) -> u64 {
        self.polls
    }
}

impl Platform for HeadlessPlatform {
    fn poll_events(&mut self) -> anyhow::Result<()> {
        self.polls += 1;
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.close.is_set() || self.poll_limit.is_some_and(|limit| self.polls >= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closes_after_poll_budget() {
        let mut p = HeadlessPlatform::with_poll_limit(2);
        assert!(!p.should_close());
        p.poll_events().unwrap();
        assert!(!p.should_close());
        p.poll_events().unwrap();
        assert!(p.should_close());
    }

    #[test]
    fn closes_when_flag_set() {
        let p = HeadlessPlatform::new();
        p.close_flag().set();
        assert!(p.should_close());
    }
}
