use gc::{Finalize, Gc, GcCell, Trace};

use crate::object::Object;

/// A shared, mutable, resizable sequence. Clones share the same elements.
#[derive(Clone, Debug, Default, Finalize, Trace)]
pub struct Array(Gc<GcCell<Vec<Object>>>);

impl Array {
    pub fn new(elements: Vec<Object>) -> Self {
        Self(Gc::new(GcCell::new(elements)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, idx: usize) -> Option<Object> {
        self.0.borrow().get(idx).cloned()
    }

    /// Overwrites an existing element. Returns `false` if `idx` is out of
    /// range.
    pub fn set(&self, idx: usize, value: Object) -> bool {
        match self.0.borrow_mut().get_mut(idx) {
            Some(element) => {
                *element = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: Object) -> usize {
        let mut elements = self.0.borrow_mut();
        elements.push(value);
        elements.len()
    }

    pub fn pop(&self) -> Option<Object> {
        self.0.borrow_mut().pop()
    }

    pub fn insert(&self, idx: usize, value: Object) {
        self.0.borrow_mut().insert(idx, value);
    }

    pub fn remove(&self, idx: usize) -> Object {
        self.0.borrow_mut().remove(idx)
    }

    pub fn position(&self, value: &Object) -> Option<usize> {
        self.0.borrow().iter().position(|element| element == value)
    }

    /// Snapshot of the elements.
    pub fn to_vec(&self) -> Vec<Object> {
        self.0.borrow().clone()
    }

    pub(super) fn id(&self) -> usize {
        let cell: &GcCell<Vec<Object>> = &self.0;
        cell as *const _ as usize
    }

    pub fn into_object(self) -> Object {
        Object::Array(self)
    }
}

impl Eq for Array {}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        Gc::ptr_eq(&self.0, &other.0)
    }
}
