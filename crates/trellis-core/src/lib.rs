//! # Scopes, Dependencies, and Watchers
//!
//! Trellis keeps rendered output in sync with plain data without explicit
//! update calls. There are three main pieces:
//!
//! - [`Scope`]: a data object whose properties have been made reactive.
//! - [`Dep`]: the subscriber registry behind every reactive property.
//! - [`Watcher`]: an expression bound to a scope plus a callback.
//!
//! ## Scopes
//!
//! A scope is built from an [`Object`]. Installation walks it (and every
//! nested object) once, replacing each property with a [`ReactiveProp`]:
//!
//! ```rust
//! use trellis_core::*;
//!
//! let scope = Scope::new(
//!     Object::new()
//!         .with("name", "Ada")
//!         .with("stats", Object::new().with("visits", 1)),
//! );
//! assert!(scope.object().is_reactive("name"));
//! scope.set("name", "Grace").unwrap();
//! assert_eq!(scope.get("name").unwrap().to_string(), "Grace");
//! ```
//!
//! ## Watchers
//!
//! A watcher evaluates its expression right away, and again every time a
//! property it read changes. Reads subscribe automatically: the scope's
//! [`Tracker`] knows which watcher is evaluating.
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use trellis_core::*;
//!
//! let scope = Scope::new(Object::new().with("first", "Jane").with("last", "Doe"));
//! let seen = Rc::new(RefCell::new(Vec::new()));
//!
//! let _full = Watcher::new("first + ' ' + last", &scope, {
//!     let seen = seen.clone();
//!     move |v| seen.borrow_mut().push(v.to_string())
//! })
//! .unwrap();
//!
//! scope.set("last", "Roe").unwrap();
//! assert_eq!(*seen.borrow(), ["Jane Doe", "Jane Roe"]);
//! ```
//!
//! Everything is synchronous: a write notifies, and each subscribed watcher
//! re-evaluates and runs its callback before the write returns. Writing a
//! value strictly equal to the current one notifies nobody.

pub mod dep;
pub mod error;
pub mod expr;
pub mod observer;
pub mod prelude;
pub mod reactive;
pub mod tests;
pub mod value;
pub mod watcher;

pub use dep::*;
pub use error::{Error, Result};
pub use observer::*;
pub use reactive::*;
pub use value::*;
pub use watcher::*;
