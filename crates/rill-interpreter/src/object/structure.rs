use gc::{Finalize, Gc, GcCell, Trace};
use rustc_hash::FxHashMap;

use crate::object::Object;

/// A shared, mutable record. Fields keep their insertion order.
#[derive(Clone, Debug, Default, Finalize, Trace)]
pub struct Struct(Gc<GcCell<StructImpl>>);

impl Struct {
    pub fn get(&self, name: &str) -> Option<Object> {
        let inner = self.0.borrow();
        inner.index.get(name).map(|&idx| inner.fields[idx].value.clone())
    }

    /// Replaces the field `name`, or appends it if it is missing.
    pub fn set(&self, name: &str, value: Object) {
        let mut inner = self.0.borrow_mut();
        match inner.index.get(name).copied() {
            Some(idx) => inner.fields[idx].value = value,
            None => {
                let idx = inner.fields.len();
                inner.index.insert(name.to_string(), idx);
                inner.fields.push(Field { name: name.to_string(), value });
            }
        }
    }

    /// Snapshot of the fields, in insertion order.
    pub fn fields(&self) -> Vec<(String, Object)> {
        let inner = self.0.borrow();
        inner.fields.iter().map(|field| (field.name.clone(), field.value.clone())).collect()
    }

    /// A new struct holding the same field values.
    pub fn shallow_copy(&self) -> Self {
        let inner = self.0.borrow();
        let copy = StructImpl { index: inner.index.clone(), fields: inner.fields.clone() };
        Self(Gc::new(GcCell::new(copy)))
    }

    pub(super) fn id(&self) -> usize {
        let cell: &GcCell<StructImpl> = &self.0;
        cell as *const _ as usize
    }

    pub fn into_object(self) -> Object {
        Object::Struct(self)
    }
}

impl Eq for Struct {}

impl PartialEq for Struct {
    fn eq(&self, other: &Self) -> bool {
        Gc::ptr_eq(&self.0, &other.0)
    }
}

#[derive(Debug, Default, Finalize, Trace)]
pub struct StructImpl {
    index: FxHashMap<String, usize>,
    fields: Vec<Field>,
}

#[derive(Clone, Debug, Finalize, Trace)]
struct Field {
    name: String,
    value: Object,
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn fields_keep_insertion_order() {
        let struct_ = Struct::default();
        struct_.set("b", Object::Number(1.0));
        struct_.set("a", Object::Number(2.0));
        struct_.set("b", Object::Number(3.0));
        let names = struct_.fields().into_iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(struct_.get("b"), Some(Object::Number(3.0)));
        assert_eq!(struct_.get("c"), None);
    }

    #[test]
    fn shallow_copy_is_distinct() {
        let inner = Struct::default();
        let outer = Struct::default();
        outer.set("inner", inner.clone().into_object());

        let copy = outer.shallow_copy();
        assert_ne!(copy, outer);
        copy.set("x", Object::Nil);
        assert_eq!(outer.get("x"), None);
        assert_eq!(copy.get("inner"), Some(inner.into_object()));
    }
}
