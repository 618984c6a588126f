//! Reactivity installation.
//!
//! [`observe`] walks a data object and turns every plain property it finds
//! into a [`ReactiveProp`]: the property's value moves into the prop, reads
//! go through [`ReactiveProp::get`] (which subscribes the evaluating
//! watcher) and writes through [`ReactiveProp::set`] (which notifies).
//!
//! Nested objects are observed once, with the values present at install
//! time. Assigning a fresh object to a property later does *not* make that
//! object's properties reactive unless [`ObserveOptions::observe_on_set`]
//! is enabled:
//!
//! ```rust
//! use trellis_core::*;
//!
//! let scope = Scope::new(Object::new().with("a", Object::new().with("b", 1)));
//! let a = scope.get("a").unwrap();
//! assert!(a.as_object().unwrap().is_reactive("b"));
//!
//! scope.set("a", Object::new().with("b", 3)).unwrap();
//! let a = scope.get("a").unwrap();
//! assert!(!a.as_object().unwrap().is_reactive("b"));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::dep::Dep;
use crate::error::{Error, Result};
use crate::reactive::Tracker;
use crate::value::{Object, Value};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    /// Re-run installation on object values written through a reactive
    /// setter. Off by default: only the object graph present at install
    /// time is reactive.
    pub observe_on_set: bool,
}

/// One intercepted property. The prop *is* the storage for its value.
pub struct ReactiveProp {
    key: Rc<str>,
    value: RefCell<Value>,
    dep: Rc<Dep>,
    tracker: Tracker,
    options: ObserveOptions,
}

impl ReactiveProp {
    fn new(key: Rc<str>, value: Value, tracker: Tracker, options: ObserveOptions) -> Self {
        Self {
            key,
            value: RefCell::new(value),
            dep: Rc::new(Dep::new()),
            tracker,
            options,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn dep(&self) -> &Rc<Dep> {
        &self.dep
    }

    pub fn get(&self) -> Value {
        self.tracker.track(&self.dep);
        self.value.borrow().clone()
    }

    /// Reads through `tracker` as well as the install-time tracker, so a
    /// scope built over an object another scope already observed still
    /// tracks its reads.
    pub fn get_in(&self, tracker: &Tracker) -> Value {
        if !tracker.ptr_eq(&self.tracker) {
            tracker.track(&self.dep);
        }
        self.get()
    }

    /// Stores `value` and notifies subscribers. Writing a value strictly
    /// equal to the current one does nothing.
    pub fn set(&self, value: Value) -> Result<()> {
        if self.value.borrow().strict_eq(&value) {
            return Ok(());
        }
        log::debug!("`{}` changed to {:?}", self.key, value);
        *self.value.borrow_mut() = value.clone();
        if self.options.observe_on_set {
            observe_with(&value, &self.tracker, self.options);
        }
        self.dep.notify()
    }
}

impl std::fmt::Debug for ReactiveProp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveProp")
            .field("key", &self.key)
            .field("value", &self.value.borrow())
            .field("dep", &self.dep)
            .finish()
    }
}

/// Makes every own property of `value` (recursively) reactive under
/// `tracker`. Non-objects are left as they are.
pub fn observe(value: &Value, tracker: &Tracker) {
    observe_with(value, tracker, ObserveOptions::default());
}

pub fn observe_with(value: &Value, tracker: &Tracker, options: ObserveOptions) {
    let Value::Object(object) = value else {
        return;
    };
    for key in object.keys() {
        define_reactive(object, &key, tracker, options);
    }
}

fn define_reactive(object: &Object, key: &str, tracker: &Tracker, options: ObserveOptions) {
    // Already-reactive slots are skipped, which also stops cycles.
    let original = object.make_reactive(key, |key, value| {
        Rc::new(ReactiveProp::new(key, value, tracker.clone(), options))
    });
    if let Some(original) = original {
        observe_with(&original, tracker, options);
    }
}

/// An observable root object together with the tracker its properties
/// report reads to.
#[derive(Clone, Debug)]
pub struct Scope {
    root: Object,
    tracker: Tracker,
}

impl Scope {
    pub fn new(root: Object) -> Self {
        Self::with_options(root, ObserveOptions::default())
    }

    pub fn with_options(root: Object, options: ObserveOptions) -> Self {
        let tracker = Tracker::new();
        observe_with(&Value::Object(root.clone()), &tracker, options);
        Self { root, tracker }
    }

    pub fn object(&self) -> &Object {
        &self.root
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.root.get_in(key, &self.tracker)
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        self.root.set(key, value)
    }

    /// Resolves a bare identifier. Unknown names are errors.
    pub fn lookup(&self, name: &str) -> Result<Value> {
        self.root.get_in(name, &self.tracker).ok_or_else(|| Error::UnresolvedIdentifier {
            name: name.to_string(),
        })
    }

    /// Writes through a dotted path such as `user.name`. Every segment but
    /// the last must resolve to an object.
    pub fn set_path(&self, path: &str, value: impl Into<Value>) -> Result<()> {
        let mut segments = path.split('.').map(str::trim);
        let mut target = self.root.clone();
        let Some(mut last) = segments.next() else {
            return self.root.set(path, value);
        };
        for segment in segments {
            target = match target.get_in(last, &self.tracker) {
                Some(Value::Object(next)) => next,
                _ => {
                    return Err(Error::NotAnObject {
                        path: path.to_string(),
                        segment: last.to_string(),
                    });
                }
            };
            last = segment;
        }
        target.set(last, value)
    }
}

impl From<serde_json::Value> for Scope {
    fn from(json: serde_json::Value) -> Self {
        match Value::from(json) {
            Value::Object(root) => Scope::new(root),
            other => {
                log::warn!("scope built from a non-object {}; starting empty", other.type_name());
                Scope::new(Object::new())
            }
        }
    }
}
