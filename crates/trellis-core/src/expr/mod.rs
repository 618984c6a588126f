//! Binding expression language.
//!
//! Expressions are parsed once into an [`Expr`] tree and evaluated by
//! explicit lookup against a [`Scope`](crate::Scope). Only a small,
//! side-effect free subset of script syntax is accepted: literals, bare
//! identifiers, member/index access, calls to scope methods, unary,
//! arithmetic, comparison, logical and conditional operators.

mod eval;
mod lexer;
mod parser;

pub use eval::evaluate;
pub use lexer::{Lexer, Spanned, Token};
pub use parser::{BinaryOp, Expr, Literal, LogicalOp, UnaryOp, parse};
