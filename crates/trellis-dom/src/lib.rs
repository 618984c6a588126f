//! Render tree, directive grammar and template compiler.
//!
//! ```rust
//! use trellis_core::{Object, Scope};
//! use trellis_dom::{Compiler, Node};
//!
//! let scope = Scope::new(Object::new().with("name", "Ada"));
//! let input = Node::element("input").attr("s-model", "name");
//! let greeting = Node::element("p").with_children(vec![Node::text("Hi {{ name }}!")]);
//! let app = Node::element("div").with_children(vec![input.clone(), greeting.clone()]);
//!
//! let _compiler = Compiler::new(&app, &scope).unwrap();
//! assert_eq!(greeting.text_content(), "Hi Ada!");
//!
//! input.input("Grace").unwrap();
//! assert_eq!(greeting.text_content(), "Hi Grace!");
//! ```

pub mod compiler;
pub mod directive;
pub mod error;
pub mod interp;
pub mod node;

pub use compiler::{BindingStats, Compiler};
pub use directive::{CompilerOptions, Directive};
pub use error::CompileError;
pub use interp::parse_exp;
pub use node::{Attr, Event, Listener, Node, NodeKind};
