use crate::node::Attr;

/// Attribute grammar the compiler recognizes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Marks directive attributes: `s-text`, `s-model`.
    pub directive_prefix: String,
    /// Marks event bindings: `@click="handler"`.
    pub event_prefix: String,
    /// Host event that feeds two-way bindings back into the scope.
    pub model_event: String,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            directive_prefix: "s-".into(),
            event_prefix: "@".into(),
            model_event: "input".into(),
        }
    }
}

/// What a single attribute asks the compiler to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive<'a> {
    /// One-way binding of the expression into the node's text content.
    Text(&'a str),
    /// Expression into the form value, plus host input back into the scope.
    Model(&'a str),
    /// Listener for `event` calling the scope method `handler`.
    On { event: &'a str, handler: &'a str },
    /// Prefixed with the directive marker but not a known directive.
    Unknown(&'a str),
}

impl<'a> Directive<'a> {
    /// `None` for ordinary attributes.
    pub fn parse(attr: &'a Attr, options: &CompilerOptions) -> Option<Self> {
        if let Some(name) = attr.name.strip_prefix(options.directive_prefix.as_str()) {
            return Some(match name {
                "text" => Directive::Text(&attr.value),
                "model" => Directive::Model(&attr.value),
                other => Directive::Unknown(other),
            });
        }
        attr.name
            .strip_prefix(options.event_prefix.as_str())
            .map(|event| Directive::On {
                event,
                handler: attr.value.trim(),
            })
    }
}
