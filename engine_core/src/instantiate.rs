use std::collections::HashSet;

use crate::{
    error::{EngineError, EngineResult, StuckModule},
    registry::ModuleCatalog,
    table::{ModuleDeps, ModuleTable},
    type_registry::TypeKey,
};

/// Builds every registered module so that dependencies always come first.
///
/// Repeated passes over the catalog in registration order: each pass creates
/// whatever has all of its requirements satisfied and postpones the rest. A pass
/// that creates nothing while something is still pending means a cycle or a
/// missing module, and fails instead of spinning.
pub fn instantiate(catalog: &ModuleCatalog) -> EngineResult<ModuleTable> {
    let descriptors = catalog.descriptors();
    let mut table = ModuleTable::with_capacity(descriptors.len());
    let mut created: HashSet<TypeKey> = HashSet::with_capacity(descriptors.len());
    let mut pass = 0u32;

    loop {
        pass += 1;
        let mut postponed = false;
        let mut progressed = false;

        for desc in descriptors {
            if created.contains(&desc.key()) {
                continue;
            }

            if !desc.requires().iter().all(|r| created.contains(r)) {
                postponed = true;
                continue;
            }

            let module = {
                let deps = ModuleDeps::new(&table, catalog.types(), desc.requires(), desc.name());
                desc.create(&deps)
            }
            .map_err(|source| EngineError::Module { module: desc.name(), source })?;

            let seq = table.push(desc.key(), desc.stage(), desc.name(), desc.type_id(), module);
            created.insert(desc.key());
            progressed = true;

            log::debug!(target: "Engine", "instantiated {} ({}) #{seq} in pass {pass}", desc.name(), desc.key());
        }

        if !postponed {
            break;
        }

        if !progressed {
            let stuck: Vec<StuckModule> = descriptors
                .iter()
                .filter(|d| !created.contains(&d.key()))
                .map(|d| StuckModule {
                    key: d.key(),
                    name: d.name(),
                    missing: d.requires().iter().copied().filter(|r| !created.contains(r)).collect(),
                })
                .collect();
            return Err(EngineError::UnsatisfiedDependencies { stuck });
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frame::FrameContext, module::Module, stage::Stage};

    macro_rules! modules {
        ($($name:ident),*) => {$(
            struct $name;
            impl Module for $name {
                fn update(&mut self, _ctx: &mut FrameContext<'_>) -> anyhow::Result<()> {
                    Ok(())
                }
            }
        )*};
    }

    modules!(Window, Graphics, Editor, Audio, Orphan);

    fn order(table: &ModuleTable) -> Vec<TypeKey> {
        table.infos().map(|i| i.key).collect()
    }

    #[test]
    fn dependencies_come_first_regardless_of_registration_order() {
        let mut c = ModuleCatalog::new();
        let window = c.key_of::<Window>();
        let graphics = c.key_of::<Graphics>();

        let editor = c.register::<Editor, _>(Stage::Render, &[graphics], |_| Ok(Editor)).unwrap();
        c.register::<Graphics, _>(Stage::Render, &[window], |_| Ok(Graphics)).unwrap();
        c.register::<Window, _>(Stage::Pre, &[], |_| Ok(Window)).unwrap();

        let table = instantiate(&c).unwrap();
        assert_eq!(order(&table), vec![window, graphics, editor]);
    }

    #[test]
    fn ready_modules_keep_registration_order() {
        let mut c = ModuleCatalog::new();
        let audio = c.register::<Audio, _>(Stage::Normal, &[], |_| Ok(Audio)).unwrap();
        let window = c.register::<Window, _>(Stage::Pre, &[], |_| Ok(Window)).unwrap();

        let table = instantiate(&c).unwrap();
        assert_eq!(order(&table), vec![audio, window]);
        assert_eq!(table.info(1).map(|i| i.stage), Some(Stage::Pre));
    }

    #[test]
    fn cycle_is_reported_instead_of_looping() {
        let mut c = ModuleCatalog::new();
        let a = c.key_of::<Window>();
        let b = c.key_of::<Graphics>();
        c.register::<Window, _>(Stage::Pre, &[b], |_| Ok(Window)).unwrap();
        c.register::<Graphics, _>(Stage::Render, &[a], |_| Ok(Graphics)).unwrap();
        c.register::<Audio, _>(Stage::Normal, &[], |_| Ok(Audio)).unwrap();

        match instantiate(&c) {
            Err(EngineError::UnsatisfiedDependencies { stuck }) => {
                let keys: Vec<_> = stuck.iter().map(|s| s.key).collect();
                assert_eq!(keys, vec![a, b]);
                assert_eq!(stuck[0].missing, vec![b]);
                assert_eq!(stuck[1].missing, vec![a]);
            }
            other => panic!("expected dependency error, got {:?}", other.map(|t| t.len())),
        }
    }

    #[test]
    fn dangling_dependency_names_the_missing_key() {
        let mut c = ModuleCatalog::new();
        let orphan = c.key_of::<Orphan>();
        c.register::<Editor, _>(Stage::Render, &[orphan], |_| Ok(Editor)).unwrap();

        let err = instantiate(&c).err().expect("must fail");
        let msg = err.to_string();
        assert!(msg.contains("unsatisfiable module dependency"), "{msg}");
        assert!(msg.contains(&orphan.to_string()), "{msg}");
    }

    #[test]
    fn factory_failure_aborts_construction() {
        let mut c = ModuleCatalog::new();
        c.register::<Window, _>(Stage::Pre, &[], |_| -> anyhow::Result<Window> {
            anyhow::bail!("no display")
        })
        .unwrap();

        let err = instantiate(&c).err().expect("must fail");
        assert!(matches!(err, EngineError::Module { .. }));
    }

    #[test]
    fn factories_only_see_declared_dependencies() {
        let mut c = ModuleCatalog::new();
        let window = c.register::<Window, _>(Stage::Pre, &[], |_| Ok(Window)).unwrap();
        c.register::<Graphics, _>(Stage::Render, &[window], |deps| {
            deps.handle::<Window>()?;
            Ok(Graphics)
        })
        .unwrap();
        c.register::<Editor, _>(Stage::Render, &[], |deps| {
            deps.handle::<Window>()?;
            Ok(Editor)
        })
        .unwrap();

        let err = instantiate(&c).err().expect("must fail");
        assert!(err.to_string().contains("without declaring"), "{err}");
    }
}
