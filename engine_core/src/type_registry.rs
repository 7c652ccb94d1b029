use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use parking_lot::Mutex;

/// Dense identity of a type inside one [`TypeRegistry`].
///
/// Keys are handed out in first-use order starting at 0 and never reused.
/// They are not stable across runs or across registries.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TypeKey(pub usize);

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Default)]
struct Keys {
    by_type: HashMap<TypeId, TypeKey>,
    names: Vec<&'static str>,
}

/// Memoized `type -> TypeKey` counter for one family of types.
///
/// First use of a type allocates the next key under the lock, so two threads
/// racing on the same type always observe the same key.
#[derive(Default)]
pub struct TypeRegistry {
    keys: Mutex<Keys>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity_of<T: 'static>(&self) -> TypeKey {
        let mut keys = self.keys.lock();
        if let Some(key) = keys.by_type.get(&TypeId::of::<T>()) {
            return *key;
        }

        let key = TypeKey(keys.names.len());
        keys.by_type.insert(TypeId::of::<T>(), key);
        keys.names.push(type_name::<T>());
        key
    }

    /// Key of `T` if it was seen before. Never allocates.
    pub fn lookup<T: 'static>(&self) -> Option<TypeKey> {
        self.keys.lock().by_type.get(&TypeId::of::<T>()).copied()
    }

    pub fn name_of(&self, key: TypeKey) -> Option<&'static str> {
        self.keys.lock().names.get(key.0).copied()
    }

    pub fn len(&self) -> usize {
        self.keys.lock().names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    struct Window;
    struct Graphics;
    struct Layer;

    #[test]
    fn keys_are_memoized_and_dense() {
        let reg = TypeRegistry::new();
        let w = reg.identity_of::<Window>();
        let g = reg.identity_of::<Graphics>();

        assert_eq!(w, TypeKey(0));
        assert_eq!(g, TypeKey(1));
        assert_eq!(reg.identity_of::<Window>(), w);
        assert_eq!(reg.len(), 2);
        assert!(reg.name_of(g).unwrap_or_default().ends_with("Graphics"));
    }

    #[test]
    fn lookup_does_not_allocate() {
        let reg = TypeRegistry::new();
        assert_eq!(reg.lookup::<Window>(), None);
        assert!(reg.is_empty());
        let w = reg.identity_of::<Window>();
        assert_eq!(reg.lookup::<Window>(), Some(w));
    }

    #[test]
    fn families_count_independently() {
        let modules = TypeRegistry::new();
        let layers = TypeRegistry::new();
        modules.identity_of::<Window>();
        modules.identity_of::<Graphics>();

        assert_eq!(layers.identity_of::<Layer>(), TypeKey(0));
    }

    #[test]
    fn concurrent_first_use_agrees() {
        let reg = Arc::new(TypeRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let reg = reg.clone();
                thread::spawn(move || reg.identity_of::<Window>())
            })
            .collect();

        let keys: Vec<TypeKey> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(keys.iter().all(|k| *k == keys[0]));
        assert_eq!(reg.len(), 1);
    }
}
