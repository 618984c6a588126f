use crate::dep::SubscriberId;

/// Failures raised while evaluating bindings or writing to a scope.
///
/// Nothing in the core recovers from these: they bubble out of the
/// evaluation, notification or write that triggered them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("`{name}` is not defined")]
    UnresolvedIdentifier { name: String },

    #[error("cannot read property `{property}` of null or undefined")]
    NullMember { property: String },

    #[error("`{callee}` is not a function")]
    NotCallable { callee: String },

    #[error("cannot assign `{path}`: `{segment}` is not an object")]
    NotAnObject { path: String, segment: String },

    #[error("syntax error in `{expr}` at offset {offset}: {message}")]
    Parse {
        expr: String,
        offset: usize,
        message: String,
    },

    #[error("watcher {requested} cannot evaluate while watcher {active} is evaluating")]
    Reentrant {
        active: SubscriberId,
        requested: SubscriberId,
    },

    #[error("{0}")]
    Handler(String),
}

impl Error {
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
