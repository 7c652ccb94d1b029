use std::time::Instant;

use crate::{
    error::{EngineError, EngineResult},
    frame::FrameContext,
    signals::ShutdownFlag,
    stage::Stage,
    table::ModuleTable,
    telemetry::Telemetry,
    time::Time,
};

/// Who runs in which stage, and in what order.
///
/// Built once from the instantiated table; within a stage modules run in
/// instantiation order.
pub struct StageScheduler {
    modules: ModuleTable,
    stages: [Vec<usize>; 6],
}

impl StageScheduler {
    pub fn new(modules: ModuleTable) -> Self {
        let mut stages: [Vec<usize>; 6] = Default::default();
        for info in modules.infos() {
            stages[info.stage.index()].push(info.sequence);
        }
        Self { modules, stages }
    }

    #[inline]
    pub fn modules(&self) -> &ModuleTable {
        &self.modules
    }

    #[inline]
    pub fn modules_mut(&mut self) -> &mut ModuleTable {
        &mut self.modules
    }

    /// Updates every module of `stage`. The first failure stops the stage and is returned.
    pub fn run_stage(
        &mut self,
        stage: Stage,
        time: &Time,
        shutdown: &ShutdownFlag,
        telemetry: &mut Telemetry,
    ) -> EngineResult<()> {
        if stage == Stage::None {
            return Ok(());
        }

        let t0 = Instant::now();

        for &index in &self.stages[stage.index()] {
            let Some(mut module) = self.modules.take(index) else {
                continue;
            };

            let result = {
                let mut ctx = FrameContext::new(time, &mut self.modules, shutdown);
                module.update(&mut ctx)
            };
            self.modules.restore(index, module);

            if let Err(source) = result {
                let name = self.modules.info(index).map_or("<unknown>", |i| i.name);
                return Err(EngineError::Module { module: name, source });
            }
        }

        telemetry.record_stage(stage, t0.elapsed());
        Ok(())
    }

    pub(crate) fn teardown(&mut self) {
        for members in self.stages.iter_mut() {
            members.clear();
        }
        self.modules.teardown();
    }
}
