use std::any::{type_name, TypeId};
use std::fmt;
use std::marker::PhantomData;

use anyhow::{anyhow, bail};

use crate::{
    module::{AsAny, Module},
    stage::Stage,
    type_registry::{TypeKey, TypeRegistry},
};

/// Typed reference to an instantiated module. Only valid for the engine that produced it.
pub struct Handle<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: usize) -> Self {
        Self { index, _marker: PhantomData }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle<{}>({})", type_name::<T>(), self.index)
    }
}

/// Public view of one slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ModuleInfo {
    pub key: TypeKey,
    pub stage: Stage,
    /// Position in instantiation order.
    pub sequence: usize,
    pub name: &'static str,
}

struct Slot {
    info: ModuleInfo,
    type_id: TypeId,
    // None only while the module is inside its own update().
    module: Option<Box<dyn Module>>,
}

/// Owns every instantiated module, in instantiation order.
#[derive(Default)]
pub struct ModuleTable {
    slots: Vec<Slot>,
}

impl ModuleTable {
    pub(crate) fn with_capacity(cap: usize) -> Self {
        Self { slots: Vec::with_capacity(cap) }
    }

    pub(crate) fn push(
        &mut self,
        key: TypeKey,
        stage: Stage,
        name: &'static str,
        type_id: TypeId,
        module: Box<dyn Module>,
    ) -> usize {
        let sequence = self.slots.len();
        self.slots.push(Slot {
            info: ModuleInfo { key, stage, sequence, name },
            type_id,
            module: Some(module),
        });
        sequence
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn infos(&self) -> impl Iterator<Item = ModuleInfo> + '_ {
        self.slots.iter().map(|s| s.info)
    }

    pub fn info(&self, index: usize) -> Option<ModuleInfo> {
        self.slots.get(index).map(|s| s.info)
    }

    pub fn handle_of<T: Module>(&self) -> Option<Handle<T>> {
        self.slots
            .iter()
            .position(|s| s.type_id == TypeId::of::<T>())
            .map(Handle::new)
    }

    pub fn get<T: Module>(&self, handle: Handle<T>) -> Option<&T> {
        let module = self.slots.get(handle.index)?.module.as_deref()?;
        <dyn Module as AsAny>::as_any(module).downcast_ref::<T>()
    }

    pub fn get_mut<T: Module>(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let module = self.slots.get_mut(handle.index)?.module.as_deref_mut()?;
        <dyn Module as AsAny>::as_any_mut(module).downcast_mut::<T>()
    }

    pub fn find<T: Module>(&self) -> Option<&T> {
        self.handle_of::<T>().and_then(|h| self.get(h))
    }

    pub(crate) fn take(&mut self, index: usize) -> Option<Box<dyn Module>> {
        self.slots.get_mut(index)?.module.take()
    }

    pub(crate) fn restore(&mut self, index: usize, module: Box<dyn Module>) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.module = Some(module);
        }
    }

    /// Drops modules last-created first, so dependents go before their dependencies.
    pub(crate) fn teardown(&mut self) {
        while let Some(slot) = self.slots.pop() {
            log::debug!(target: "Engine", "drop module {} ({})", slot.info.name, slot.info.key);
            drop(slot);
        }
    }
}

impl Drop for ModuleTable {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// What a module factory sees: the modules created so far, restricted to the ones it declared.
pub struct ModuleDeps<'a> {
    table: &'a ModuleTable,
    types: &'a TypeRegistry,
    declared: &'a [TypeKey],
    module: &'static str,
}

impl<'a> ModuleDeps<'a> {
    pub(crate) fn new(
        table: &'a ModuleTable,
        types: &'a TypeRegistry,
        declared: &'a [TypeKey],
        module: &'static str,
    ) -> Self {
        Self { table, types, declared, module }
    }

    /// Resolves a declared dependency into a handle usable later through `FrameContext`.
    pub fn handle<T: Module>(&self) -> anyhow::Result<Handle<T>> {
        let declared = self
            .types
            .lookup::<T>()
            .is_some_and(|key| self.declared.contains(&key));
        if !declared {
            bail!(
                "{} requested {} without declaring it as a dependency",
                self.module,
                type_name::<T>()
            );
        }

        self.table
            .handle_of::<T>()
            .ok_or_else(|| anyhow!("{} is not instantiated", type_name::<T>()))
    }

    pub fn get<T: Module>(&self) -> anyhow::Result<&'a T> {
        let handle = self.handle::<T>()?;
        self.table
            .get(handle)
            .ok_or_else(|| anyhow!("{} is not available", type_name::<T>()))
    }
}
