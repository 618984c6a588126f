use trellis_core::{Scope, Value, Watcher};

use crate::directive::{CompilerOptions, Directive};
use crate::error::CompileError;
use crate::interp;
use crate::node::{COMMENT_NODE, ELEMENT_NODE, Node, TEXT_NODE};

/// Counts of what a compilation bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BindingStats {
    /// `s-text` directives.
    pub text: usize,
    /// `s-model` directives.
    pub model: usize,
    /// Event listeners.
    pub events: usize,
    /// Text nodes bound through `{{ }}` parsing.
    pub interpolations: usize,
}

/// Walks a render tree, turning directives and interpolated text into live
/// bindings against a scope.
///
/// The compiler owns every watcher it creates; dropping it unbinds the
/// tree. Event listeners stay attached to their nodes.
pub struct Compiler {
    el: Node,
    scope: Scope,
    options: CompilerOptions,
    watchers: Vec<Watcher>,
    stats: BindingStats,
}

impl Compiler {
    /// Compiles `el`'s children against `scope` with the default grammar.
    pub fn new(el: &Node, scope: &Scope) -> Result<Self, CompileError> {
        Self::with_options(el, scope, CompilerOptions::default())
    }

    pub fn with_options(
        el: &Node,
        scope: &Scope,
        options: CompilerOptions,
    ) -> Result<Self, CompileError> {
        let mut compiler = Self::prepare(el, scope, options);
        compiler.mount()?;
        Ok(compiler)
    }

    /// A compiler that has not touched `el` yet. See [`Compiler::mount`].
    pub fn prepare(el: &Node, scope: &Scope, options: CompilerOptions) -> Self {
        Self {
            el: el.clone(),
            scope: scope.clone(),
            options,
            watchers: Vec::new(),
            stats: BindingStats::default(),
        }
    }

    /// Moves the mount point's children into a fragment, compiles it, and
    /// appends it back.
    ///
    /// The fragment is re-attached even when compilation fails, so the
    /// bindings made before the failing node stay visible and live.
    pub fn mount(&mut self) -> Result<(), CompileError> {
        let el = self.el.clone();
        let fragment = self.node_to_fragment(&el);
        let result = self.compile(&fragment);
        el.append_child(&fragment);
        match &result {
            Ok(()) => log::debug!(
                "mounted {} watcher(s), {:?}",
                self.watchers.len(),
                self.stats
            ),
            Err(err) => log::debug!("compilation stopped: {err}"),
        }
        result
    }

    /// Fragment holding `node`'s children, minus the ignored ones, which
    /// stay where they are.
    pub fn node_to_fragment(&self, node: &Node) -> Node {
        let fragment = Node::fragment();
        for child in node.child_nodes() {
            if Self::is_ignored(&child) {
                log::trace!("left out of fragment: {child:?}");
            } else {
                fragment.append_child(&child);
            }
        }
        fragment
    }

    /// Comments, and whitespace-only text that contains a line break or
    /// tab.
    pub fn is_ignored(node: &Node) -> bool {
        match node.node_type() {
            COMMENT_NODE => true,
            TEXT_NODE => {
                let text = node.text_content();
                text.chars().all(char::is_whitespace)
                    && text.contains(['\t', '\n', '\r'])
            }
            _ => false,
        }
    }

    /// Binds every element and text child of `node`, depth first.
    pub fn compile(&mut self, node: &Node) -> Result<(), CompileError> {
        self.compile_children(node, node.child_nodes())
    }

    /// Binds `children` that are still attached to `node`. Nodes written by
    /// a directive after the snapshot was taken are never compiled, so
    /// bound values are rendered as text, not as templates.
    fn compile_children(&mut self, node: &Node, children: Vec<Node>) -> Result<(), CompileError> {
        for child in children {
            let attached = child.parent().is_some_and(|parent| parent.ptr_eq(node));
            if !attached || Self::is_ignored(&child) {
                continue;
            }
            match child.node_type() {
                ELEMENT_NODE => self.compile_element_node(&child)?,
                TEXT_NODE => self.compile_text_node(&child)?,
                _ => {}
            }
        }
        Ok(())
    }

    pub fn compile_element_node(&mut self, node: &Node) -> Result<(), CompileError> {
        let children = node.child_nodes();
        for attr in node.attributes() {
            let Some(directive) = Directive::parse(&attr, &self.options) else {
                continue;
            };
            match directive {
                Directive::Text(exp) => {
                    let target = node.clone();
                    let watcher = Watcher::new(exp, &self.scope, move |value| {
                        target.set_text_content(value.to_string())
                    })?;
                    log::debug!("s-text `{exp}` bound as watcher {}", watcher.id());
                    self.watchers.push(watcher);
                    self.stats.text += 1;
                }
                Directive::Model(exp) => {
                    let target = node.clone();
                    let watcher = Watcher::new(exp, &self.scope, move |value| {
                        target.set_value(value.to_string())
                    })?;
                    log::debug!("s-model `{exp}` bound as watcher {}", watcher.id());
                    self.watchers.push(watcher);

                    let scope = self.scope.clone();
                    let path = exp.trim().to_string();
                    node.add_event_listener(self.options.model_event.as_str(), move |event| {
                        scope.set_path(&path, event.value.as_str())
                    });
                    self.stats.model += 1;
                }
                Directive::On { event, handler } => {
                    self.compile_methods(node, event, handler)?;
                }
                Directive::Unknown(name) => {
                    log::trace!("ignoring unknown directive `{name}`");
                }
            }
        }
        self.compile_children(node, children)
    }

    /// Attaches scope method `handler` as the `event` listener. The method
    /// runs with the scope root as `this` and the event as its argument.
    pub fn compile_methods(
        &mut self,
        node: &Node,
        event: &str,
        handler: &str,
    ) -> Result<(), CompileError> {
        let Some(Value::Method(method)) = self.scope.get(handler) else {
            return Err(CompileError::MissingHandler {
                event: event.to_string(),
                handler: handler.to_string(),
            });
        };
        let this = self.scope.object().clone();
        node.add_event_listener(event, move |e| {
            method.call(&this, &[e.to_value()]).map(|_| ())
        });
        log::debug!("`{event}` listener bound to `{handler}`");
        self.stats.events += 1;
        Ok(())
    }

    /// Binds trimmed, non-empty text as one concatenation watcher.
    pub fn compile_text_node(&mut self, node: &Node) -> Result<(), CompileError> {
        let content = node.text_content();
        let text = content.trim();
        if text.is_empty() {
            return Ok(());
        }
        let exp = interp::parse_exp(text);
        let target = node.clone();
        let watcher = Watcher::new(&exp, &self.scope, move |value| {
            target.set_text_content(value.to_string())
        })?;
        log::debug!(
            "text bound as watcher {} ({} interpolation(s))",
            watcher.id(),
            interp::count_interpolations(text)
        );
        self.watchers.push(watcher);
        self.stats.interpolations += 1;
        Ok(())
    }

    pub fn watchers(&self) -> &[Watcher] {
        &self.watchers
    }

    pub fn stats(&self) -> BindingStats {
        self.stats
    }

    pub fn el(&self) -> &Node {
        &self.el
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }
}

impl std::fmt::Debug for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compiler")
            .field("options", &self.options)
            .field("watchers", &self.watchers)
            .field("stats", &self.stats)
            .finish()
    }
}
