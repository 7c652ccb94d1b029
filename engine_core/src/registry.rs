use std::any::{type_name, TypeId};
use std::collections::HashMap;

use crate::{
    error::{EngineError, EngineResult},
    module::{Module, Registrar},
    stage::Stage,
    table::ModuleDeps,
    type_registry::{TypeKey, TypeRegistry},
};

pub type ModuleFactory = Box<dyn Fn(&ModuleDeps<'_>) -> anyhow::Result<Box<dyn Module>>>;

/// Registration record of one module type.
pub struct ModuleDescriptor {
    key: TypeKey,
    name: &'static str,
    type_id: TypeId,
    stage: Stage,
    requires: Vec<TypeKey>,
    factory: ModuleFactory,
}

impl ModuleDescriptor {
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[inline]
    pub fn requires(&self) -> &[TypeKey] {
        &self.requires
    }

    #[inline]
    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub(crate) fn create(&self, deps: &ModuleDeps<'_>) -> anyhow::Result<Box<dyn Module>> {
        (self.factory)(deps)
    }
}

impl std::fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("stage", &self.stage)
            .field("requires", &self.requires)
            .finish_non_exhaustive()
    }
}

/// Table of every module the embedding application registered, in registration order.
///
/// Built once at startup and handed to the engine, which consumes it.
#[derive(Default)]
pub struct ModuleCatalog {
    types: TypeRegistry,
    descriptors: Vec<ModuleDescriptor>,
    index: HashMap<TypeKey, usize>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of `T` in this catalog. Allocated on first use, so a module can
    /// name a dependency that registers later.
    #[inline]
    pub fn key_of<T: 'static>(&self) -> TypeKey {
        self.types.identity_of::<T>()
    }

    pub fn register<T, F>(&mut self, stage: Stage, requires: &[TypeKey], factory: F) -> EngineResult<TypeKey>
    where
        T: Module,
        F: Fn(&ModuleDeps<'_>) -> anyhow::Result<T> + 'static,
    {
        let key = self.key_of::<T>();
        let name = type_name::<T>();

        if self.index.contains_key(&key) {
            return Err(EngineError::DuplicateModule { key, name });
        }

        log::debug!(target: "ModuleCatalog", "register {name} ({key}) stage={stage} requires={requires:?}");

        self.index.insert(key, self.descriptors.len());
        self.descriptors.push(ModuleDescriptor {
            key,
            name,
            type_id: TypeId::of::<T>(),
            stage,
            requires: requires.to_vec(),
            factory: Box::new(move |deps: &ModuleDeps<'_>| -> anyhow::Result<Box<dyn Module>> {
                Ok(Box::new(factory(deps)?) as Box<dyn Module>)
            }),
        });
        Ok(key)
    }

    /// Lets `T` register itself through its [`Registrar`] impl.
    pub fn install<T: Registrar>(&mut self) -> EngineResult<TypeKey> {
        let requires = T::requires(self);
        self.register::<T, _>(T::STAGE, &requires, T::create)
    }

    #[inline]
    pub fn descriptors(&self) -> &[ModuleDescriptor] {
        &self.descriptors
    }

    pub fn descriptor(&self, key: TypeKey) -> Option<&ModuleDescriptor> {
        self.index.get(&key).map(|i| &self.descriptors[*i])
    }

    pub fn is_registered<T: 'static>(&self) -> bool {
        self.types.lookup::<T>().is_some_and(|k| self.index.contains_key(&k))
    }

    #[inline]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Drops every descriptor. Type keys stay allocated.
    pub fn clear(&mut self) {
        self.descriptors.clear();
        self.index.clear();
    }
}
