//! Scoped variable environment for the Cypher evaluator.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::value::{Function, Value};

/// A single scope level.
#[derive(Default)]
struct Scope {
    bindings: BTreeMap<String, Value>,
    parent: Option<Environment>,
}

/// A shared handle to one scope and, through its parent links, every
/// enclosing scope.
///
/// Variables are looked up from innermost scope outward.
/// `define` always creates in this (innermost) scope.
/// `set` updates the first scope where the variable exists.
///
/// Cloning the handle shares the scope; closures hold such a clone.
#[derive(Clone, Default)]
pub struct Environment(Rc<RefCell<Scope>>);

impl Environment {
    /// Create a root scope with no parent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh scope whose parent is `self`.
    pub fn child(&self) -> Self {
        Self(Rc::new(RefCell::new(Scope {
            bindings: BTreeMap::new(),
            parent: Some(self.clone()),
        })))
    }

    /// Define (or shadow) a variable in this scope.
    pub fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().bindings.insert(name.to_string(), value);
    }

    /// Look up a variable, searching from this scope outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut current = self.clone();
        loop {
            let next = {
                let scope = current.0.borrow();
                if let Some(value) = scope.bindings.get(name) {
                    return Some(value.clone());
                }
                scope.parent.clone()?
            };
            current = next;
        }
    }

    /// Update a variable in the nearest scope that binds it.
    /// Returns `true` if found and updated, `false` if not found.
    pub fn set(&self, name: &str, value: Value) -> bool {
        let mut current = self.clone();
        loop {
            let next = {
                let mut scope = current.0.borrow_mut();
                if let Some(slot) = scope.bindings.get_mut(name) {
                    *slot = value;
                    return true;
                }
                match scope.parent.clone() {
                    Some(parent) => parent,
                    None => return false,
                }
            };
            current = next;
        }
    }

    /// Returns `true` if this scope itself binds `name`.
    pub fn is_bound_here(&self, name: &str) -> bool {
        self.0.borrow().bindings.contains_key(name)
    }

    /// Drop every binding and the parent link.
    ///
    /// Functions stored in a scope they also capture form a reference
    /// cycle. Clearing one scope on the cycle frees all of it.
    pub(crate) fn clear(&self) {
        // Take the contents out first: dropping them may release other
        // scopes that are borrowed along the way.
        let scope = std::mem::take(&mut *self.0.borrow_mut());
        drop(scope);
    }

    /// A handle that does not keep the scope alive.
    pub(crate) fn downgrade(&self) -> WeakEnvironment {
        WeakEnvironment(Rc::downgrade(&self.0))
    }

    /// Returns `true` if both handles refer to the same scope.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Clear every scope in `candidates` that is kept alive only by the
/// others, and return the rest.
///
/// References the group accounts for itself are the parent links of its
/// scopes and the closures of functions bound nowhere but in its scopes.
/// A scope with any other strong reference is live, as is everything it
/// reaches through its parent and its bound functions.
pub(crate) fn sweep(candidates: Vec<Environment>) -> Vec<Environment> {
    let index: HashMap<*const RefCell<Scope>, usize> = candidates
        .iter()
        .enumerate()
        .map(|(i, env)| (Rc::as_ptr(&env.0), i))
        .collect();
    let position = |env: &Environment| index.get(&Rc::as_ptr(&env.0)).copied();

    // Minus the handle held in `candidates`.
    let mut outside: Vec<usize> = candidates
        .iter()
        .map(|env| Rc::strong_count(&env.0) - 1)
        .collect();

    let mut bound: HashMap<*const Function, (Rc<Function>, usize)> = HashMap::new();
    for env in &candidates {
        let scope = env.0.borrow();
        if let Some(parent) = scope.parent.as_ref().and_then(position) {
            outside[parent] -= 1;
        }
        for value in scope.bindings.values() {
            if let Value::Function(function) = value {
                bound
                    .entry(Rc::as_ptr(function))
                    .or_insert_with(|| (Rc::clone(function), 0))
                    .1 += 1;
            }
        }
    }
    for (function, holders) in bound.values() {
        // One extra count for the clone in `bound`.
        if Rc::strong_count(function) == holders + 1 {
            if let Some(closure) = position(&function.closure) {
                outside[closure] -= 1;
            }
        }
    }
    drop(bound);

    let mut live: Vec<bool> = outside.iter().map(|&refs| refs > 0).collect();
    let mut pending: Vec<usize> = (0..candidates.len()).filter(|&i| live[i]).collect();
    while let Some(i) = pending.pop() {
        let scope = candidates[i].0.borrow();
        let closures = scope.bindings.values().filter_map(|value| match value {
            Value::Function(function) => Some(&function.closure),
            _ => None,
        });
        for env in scope.parent.iter().chain(closures) {
            if let Some(j) = position(env) {
                if !live[j] {
                    live[j] = true;
                    pending.push(j);
                }
            }
        }
    }

    candidates
        .into_iter()
        .zip(live)
        .filter_map(|(env, live)| {
            if !live {
                env.clear();
            }
            live.then_some(env)
        })
        .collect()
}

/// Non-owning counterpart of [`Environment`].
pub(crate) struct WeakEnvironment(Weak<RefCell<Scope>>);

impl WeakEnvironment {
    pub(crate) fn upgrade(&self) -> Option<Environment> {
        self.0.upgrade().map(Environment)
    }
}

// Bindings may hold closures that point back at this scope.
impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope = self.0.borrow();
        f.debug_struct("Environment")
            .field("names", &scope.bindings.keys().collect::<Vec<_>>())
            .field("has_parent", &scope.parent.is_some())
            .finish()
    }
}
