use std::fmt;
use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use crate::error::EngineResult;

/// Why the loop was asked to stop.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum StopReason {
    /// `Engine::stop`, a module, the app, or a stop handle.
    Requested,
    /// The platform reported a close.
    PlatformClosed,
    /// Ctrl+C.
    Interrupted,
}

impl StopReason {
    const fn code(self) -> u8 {
        match self {
            StopReason::Requested => 1,
            StopReason::PlatformClosed => 2,
            StopReason::Interrupted => 3,
        }
    }

    const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(StopReason::Requested),
            2 => Some(StopReason::PlatformClosed),
            3 => Some(StopReason::Interrupted),
            _ => None,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::Requested => "stop requested",
            StopReason::PlatformClosed => "platform closed",
            StopReason::Interrupted => "interrupted",
        })
    }
}

/// Engine stop switch, shared by the loop, modules, the platform and signal handlers.
///
/// The first request wins; later ones keep the original reason.
#[derive(Clone, Default)]
pub struct ShutdownFlag {
    reason: Arc<AtomicU8>,
}

impl ShutdownFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_set(&self) -> bool {
        self.reason().is_some()
    }

    pub fn reason(&self) -> Option<StopReason> {
        StopReason::from_code(self.reason.load(Ordering::Acquire))
    }

    pub fn set(&self) {
        self.request(StopReason::Requested);
    }

    pub fn request(&self, reason: StopReason) {
        let _ = self
            .reason
            .compare_exchange(0, reason.code(), Ordering::AcqRel, Ordering::Acquire);
    }

    /// Can only succeed once per process.
    pub fn install_ctrlc(&self) -> EngineResult<()> {
        let flag = self.clone();
        ctrlc::set_handler(move || flag.request(StopReason::Interrupted))?;
        Ok(())
    }
}
