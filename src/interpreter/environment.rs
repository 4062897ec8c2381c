use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

use crate::value::Value;

/// One frame of the scope chain. Frames are created per call, loop
/// iteration, branch, `try` and `catch` block and are dropped once nothing
/// refers to them.
#[derive(Debug, Default)]
pub struct Scope {
    bindings: RefCell<IndexMap<Rc<str>, Value>>,
    parent: Option<Rc<Scope>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    Redeclared(Rc<str>),
    Undeclared(Rc<str>),
}

impl Scope {
    pub fn root() -> Rc<Scope> {
        Rc::new(Scope::default())
    }

    pub fn with_parent(parent: &Rc<Scope>) -> Rc<Scope> {
        Rc::new(Scope {
            bindings: RefCell::new(IndexMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Add a binding to this frame only.
    pub fn declare(&self, name: &Rc<str>, value: Value) -> Result<(), ScopeError> {
        let mut bindings = self.bindings.borrow_mut();
        if bindings.contains_key(name) {
            return Err(ScopeError::Redeclared(Rc::clone(name)));
        }
        bindings.insert(Rc::clone(name), value);
        Ok(())
    }

    /// Bind without the redeclaration check; a repeated parameter name
    /// resolves to its last occurrence.
    pub fn bind(&self, name: &Rc<str>, value: Value) {
        self.bindings.borrow_mut().insert(Rc::clone(name), value);
    }

    /// Resolve a name, searching this frame and then each parent.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut frame = self;
        loop {
            if let Some(value) = frame.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            frame = frame.parent.as_deref()?;
        }
    }

    /// Overwrite the binding in the nearest frame that already holds `name`.
    pub fn assign(&self, name: &Rc<str>, value: Value) -> Result<(), ScopeError> {
        let mut frame = self;
        loop {
            if let Some(slot) = frame.bindings.borrow_mut().get_mut(name.as_ref()) {
                *slot = value;
                return Ok(());
            }
            frame = match frame.parent.as_deref() {
                Some(parent) => parent,
                None => return Err(ScopeError::Undeclared(Rc::clone(name))),
            };
        }
    }
}
