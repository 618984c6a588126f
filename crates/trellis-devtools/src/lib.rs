use serde::Serialize;
use web_time::Instant;

use trellis_core::Scope;
use trellis_dom::{CompileError, Compiler, Node};

mod html;

pub use html::render_html;

/// Numbers from the most recent compilation.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub watchers: usize,
    pub text_bindings: usize,
    pub model_bindings: usize,
    pub event_bindings: usize,
    pub interpolations: usize,
    pub compile_ms: f32,
}

impl Metrics {
    pub fn from_compiler(compiler: &Compiler, compile_ms: f32) -> Self {
        let stats = compiler.stats();
        Self {
            watchers: compiler.watchers().len(),
            text_bindings: stats.text,
            model_bindings: stats.model,
            event_bindings: stats.events,
            interpolations: stats.interpolations,
            compile_ms,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// One-line status readout for a bound tree.
#[derive(Default)]
pub struct Hud {
    pub verbose: bool,
    compiles: u64,
    pub metrics: Option<Metrics>,
}

impl Hud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_verbose(&mut self) {
        self.verbose = !self.verbose;
    }

    pub fn record(&mut self, metrics: Metrics) {
        self.compiles += 1;
        self.metrics = Some(metrics);
    }

    pub fn compiles(&self) -> u64 {
        self.compiles
    }

    pub fn overlay(&self) -> String {
        let mut lines = vec![format!("compiles: {}", self.compiles)];
        if let Some(m) = &self.metrics {
            lines.push(format!("compile: {:.2} ms", m.compile_ms));
            lines.push(format!("watchers: {}", m.watchers));
            if self.verbose {
                lines.push(format!(
                    "text: {}, model: {}, events: {}",
                    m.text_bindings, m.model_bindings, m.event_bindings
                ));
                lines.push(format!("interpolations: {}", m.interpolations));
            }
        }
        lines.join("  |  ")
    }
}

/// Compiles trees while keeping the compiler alive and timing it.
#[derive(Default)]
pub struct Inspector {
    pub hud: Hud,
    compiler: Option<Compiler>,
}

impl Inspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles `el` against `scope`, replacing (and so unbinding) any tree
    /// compiled earlier.
    pub fn compile(&mut self, el: &Node, scope: &Scope) -> Result<&Compiler, CompileError> {
        self.compiler = None;
        let start = Instant::now();
        let compiler = Compiler::new(el, scope)?;
        let compile_ms = start.elapsed().as_secs_f32() * 1000.0;

        let metrics = Metrics::from_compiler(&compiler, compile_ms);
        log::debug!("compiled in {compile_ms:.2} ms: {metrics:?}");
        self.hud.record(metrics);
        Ok(self.compiler.insert(compiler))
    }

    pub fn compiler(&self) -> Option<&Compiler> {
        self.compiler.as_ref()
    }

    pub fn overlay(&self) -> String {
        self.hud.overlay()
    }

    /// Markup of the inspected tree, if one was compiled.
    pub fn snapshot(&self) -> Option<String> {
        self.compiler.as_ref().map(|c| render_html(c.el()))
    }
}

/// One line per watcher of `compiler`, in creation order.
pub fn describe_watchers(compiler: &Compiler) -> String {
    compiler
        .watchers()
        .iter()
        .enumerate()
        .map(|(i, w)| {
            format!(
                "[{i}] `{}` deps={} runs={}",
                w.expression(),
                w.dependency_count(),
                w.runs()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
