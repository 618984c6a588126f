/// Why compiling a template stopped.
///
/// Compilation and first evaluation are interleaved per binding, so on
/// failure everything compiled before the offending node stays bound.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Eval(#[from] trellis_core::Error),

    #[error("no method `{handler}` on scope for `{event}` listener")]
    MissingHandler { event: String, handler: String },
}
