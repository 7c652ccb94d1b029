use cx_engine_core::{FrameContext, Handle, Module, ModuleCatalog, ModuleDeps, Registrar, Stage, TypeKey};

/// Stand-in for the OS window: counts the logic ticks it has seen.
pub struct Window {
    title: String,
    ticks: u64,
}

impl Window {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Module for Window {
    fn update(&mut self, _ctx: &mut FrameContext<'_>) -> anyhow::Result<()> {
        self.ticks += 1;
        Ok(())
    }
}

impl Registrar for Window {
    const STAGE: Stage = Stage::Pre;

    fn create(_deps: &ModuleDeps<'_>) -> anyhow::Result<Self> {
        log::info!("window created");
        Ok(Self { title: "Cx Engine".to_string(), ticks: 0 })
    }
}

pub struct Graphics {
    window: Handle<Window>,
    frames: u64,
}

impl Graphics {
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Module for Graphics {
    fn update(&mut self, ctx: &mut FrameContext<'_>) -> anyhow::Result<()> {
        let window = ctx
            .module(self.window)
            .ok_or_else(|| anyhow::anyhow!("window is gone"))?;

        self.frames += 1;
        if self.frames % 60 == 0 {
            log::debug!(
                "frame {} presented to '{}' (fps={})",
                self.frames,
                window.title(),
                ctx.time().frames_per_second
            );
        }
        Ok(())
    }
}

impl Registrar for Graphics {
    const STAGE: Stage = Stage::Render;

    fn requires(catalog: &ModuleCatalog) -> Vec<TypeKey> {
        vec![catalog.key_of::<Window>()]
    }

    fn create(deps: &ModuleDeps<'_>) -> anyhow::Result<Self> {
        log::info!("graphics created for '{}'", deps.get::<Window>()?.title());
        Ok(Self { window: deps.handle()?, frames: 0 })
    }
}

/// Overlay drawn after graphics each render frame.
pub struct Editor {
    graphics: Handle<Graphics>,
}

impl Module for Editor {
    fn update(&mut self, ctx: &mut FrameContext<'_>) -> anyhow::Result<()> {
        if let Some(g) = ctx.module(self.graphics) {
            if g.frames() == 1 {
                log::info!("editor attached to first frame");
            }
        }
        Ok(())
    }
}

impl Registrar for Editor {
    const STAGE: Stage = Stage::Render;

    fn requires(catalog: &ModuleCatalog) -> Vec<TypeKey> {
        vec![catalog.key_of::<Graphics>()]
    }

    fn create(deps: &ModuleDeps<'_>) -> anyhow::Result<Self> {
        Ok(Self { graphics: deps.handle()? })
    }
}

/// Registration list of the sandbox. Order does not matter; dependencies decide.
pub fn catalog() -> cx_engine_core::EngineResult<ModuleCatalog> {
    let mut catalog = ModuleCatalog::new();
    catalog.install::<Editor>()?;
    catalog.install::<Graphics>()?;
    catalog.install::<Window>()?;
    Ok(catalog)
}
