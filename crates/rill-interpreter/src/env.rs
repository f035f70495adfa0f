use std::ops::Deref;

use gc::{Finalize, Gc, GcCell, Trace};
use rustc_hash::FxHashMap;

use crate::object::Object;

/// A lexical frame. Frames are shared: a closure keeps the frame it was
/// declared in alive, and writes through any handle are seen by all of them.
#[derive(Clone, Debug, Default, Finalize, Trace)]
pub struct Env(Gc<GcCell<EnvImpl>>);

impl Deref for Env {
    type Target = Gc<GcCell<EnvImpl>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Env {
    pub fn with_parent(parent: &Env) -> Self {
        let env = EnvImpl { map: FxHashMap::default(), parent: Some(parent.clone()) };
        Self(Gc::new(GcCell::new(env)))
    }

    /// Binds `name` in this frame, replacing any earlier binding in the same
    /// frame.
    pub fn define(&self, name: &str, value: Object) {
        self.borrow_mut().map.insert(name.to_string(), value);
    }

    /// Looks `name` up from this frame outwards.
    pub fn get(&self, name: &str) -> Option<Object> {
        let mut env = self.clone();
        loop {
            let parent = {
                let inner = env.borrow();
                if let Some(value) = inner.map.get(name) {
                    return Some(value.clone());
                }
                inner.parent.clone()
            };
            env = parent?;
        }
    }

    /// Overwrites the innermost existing binding of `name`. Returns `false`
    /// if no frame declares it.
    pub fn assign(&self, name: &str, value: Object) -> bool {
        let mut env = self.clone();
        loop {
            let parent = {
                let mut inner = env.borrow_mut();
                if let Some(entry) = inner.map.get_mut(name) {
                    *entry = value;
                    return true;
                }
                inner.parent.clone()
            };
            match parent {
                Some(parent) => env = parent,
                None => return false,
            }
        }
    }
}

#[derive(Debug, Default, Finalize, Trace)]
pub struct EnvImpl {
    map: FxHashMap<String, Object>,
    parent: Option<Env>,
}
