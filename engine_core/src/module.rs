use std::any::Any;

use crate::{frame::FrameContext, registry::ModuleCatalog, stage::Stage, table::ModuleDeps, type_registry::TypeKey};

/// Downcasting support for boxed modules. Implemented for every `'static` type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// An engine subsystem, instantiated once and driven by the stage it was registered in.
///
/// Modules talk to each other only through handles resolved at construction
/// (see [`ModuleDeps`]) and the [`FrameContext`] they receive each update.
pub trait Module: AsAny {
    fn update(&mut self, ctx: &mut FrameContext<'_>) -> anyhow::Result<()>;
}

/// Self-registration contract: the module declares its own stage, dependencies and constructor.
///
/// ```ignore
/// impl Registrar for Graphics {
///     const STAGE: Stage = Stage::Render;
///
///     fn requires(catalog: &ModuleCatalog) -> Vec<TypeKey> {
///         vec![catalog.key_of::<Window>()]
///     }
///
///     fn create(deps: &ModuleDeps<'_>) -> anyhow::Result<Self> {
///         Ok(Graphics { window: deps.handle::<Window>()? })
///     }
/// }
/// ```
pub trait Registrar: Module + Sized {
    const STAGE: Stage;

    fn requires(_catalog: &ModuleCatalog) -> Vec<TypeKey> {
        Vec::new()
    }

    fn create(deps: &ModuleDeps<'_>) -> anyhow::Result<Self>;
}
