mod modules;

use cx_engine_core::{logsys, App, Engine, EngineConfig, FrameContext, HeadlessPlatform, TimePoint, Version};

use crate::modules::Window;

struct MyApp {
    run_for: TimePoint,
}

impl App for MyApp {
    fn name(&self) -> &str {
        "Cx Sandbox"
    }

    fn version(&self) -> Version {
        Version::new(1, 0, 0)
    }

    fn on_start(&mut self, ctx: &mut FrameContext<'_>) -> anyhow::Result<()> {
        let window = ctx
            .modules()
            .find::<Window>()
            .ok_or_else(|| anyhow::anyhow!("sandbox needs a window"))?;
        log::info!("app do work on '{}'", window.title());
        Ok(())
    }

    fn on_update(&mut self, ctx: &mut FrameContext<'_>) -> anyhow::Result<()> {
        if ctx.time().now >= self.run_for {
            let ticks = ctx.modules().find::<Window>().map_or(0, Window::ticks);
            log::info!("demo time is up after {ticks} logic ticks");
            ctx.request_stop();
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let mut cfg = EngineConfig::load_or_default("engine.toml")?;
    cfg.install_ctrlc = true;
    logsys::init(&cfg.log_filter);

    let mut engine = Engine::builder(modules::catalog()?)
        .config(cfg)
        .platform(HeadlessPlatform::new())
        .build()?;
    engine.set_version(Version::new(1, 1, 1));

    engine.load(MyApp { run_for: TimePoint::from_millis(3_000) });
    engine.run()?;
    Ok(())
}
