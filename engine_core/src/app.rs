use crate::{
    error::{EngineError, EngineResult},
    frame::FrameContext,
    version::Version,
};

/// The user program the engine hosts.
pub trait App {
    fn name(&self) -> &str;

    fn version(&self) -> Version {
        Version::default()
    }

    /// One-time task, run lazily on the first iteration after loading.
    fn on_start(&mut self, ctx: &mut FrameContext<'_>) -> anyhow::Result<()>;

    /// Every iteration, after `on_start`.
    fn on_update(&mut self, _ctx: &mut FrameContext<'_>) -> anyhow::Result<()> {
        Ok(())
    }
}

pub(crate) struct AppHost {
    app: Box<dyn App>,
    running: bool,
}

impl AppHost {
    pub(crate) fn new(app: Box<dyn App>) -> Self {
        Self { app, running: false }
    }

    #[inline]
    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub(crate) fn name(&self) -> &str {
        self.app.name()
    }

    pub(crate) fn tick(&mut self, ctx: &mut FrameContext<'_>) -> EngineResult<()> {
        if !self.running {
            log::info!(target: "Engine", "start app {} {}", self.app.name(), self.app.version());
            self.app.on_start(ctx).map_err(|source| self.wrap(source))?;
            self.running = true;
        }

        self.app.on_update(ctx).map_err(|source| self.wrap(source))
    }

    fn wrap(&self, source: anyhow::Error) -> EngineError {
        EngineError::App { app: self.app.name().to_string(), source }
    }
}
