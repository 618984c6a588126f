use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::dep::{Dep, Subscriber, SubscriberId};
use crate::error::Result;
use crate::expr::{self, Expr};
use crate::observer::Scope;
use crate::value::Value;

static NEXT_WATCHER_ID: AtomicU64 = AtomicU64::new(0);

pub type Callback = Box<dyn Fn(&Value)>;

/// A live binding: re-evaluates its expression whenever a scope property it
/// read last time changes, and hands the result to its callback.
///
/// The handle owns the binding. Registries only hold it weakly, so dropping
/// every clone of the handle unbinds it.
#[derive(Clone)]
pub struct Watcher(Rc<WatcherInner>);

struct WatcherInner {
    id: SubscriberId,
    exp: String,
    ast: Expr,
    scope: Scope,
    cb: Option<Callback>,
    deps: RefCell<Vec<Weak<Dep>>>,
    runs: Cell<u64>,
    this: Weak<WatcherInner>,
}

impl Watcher {
    /// Parses `exp`, then evaluates it once and calls `cb` with the result.
    pub fn new(exp: &str, scope: &Scope, cb: impl Fn(&Value) + 'static) -> Result<Self> {
        Self::build(exp, scope, Some(Box::new(cb)))
    }

    /// A watcher that only tracks; useful when the value is pulled with
    /// [`Watcher::get`].
    pub fn detached(exp: &str, scope: &Scope) -> Result<Self> {
        Self::build(exp, scope, None)
    }

    fn build(exp: &str, scope: &Scope, cb: Option<Callback>) -> Result<Self> {
        let ast = expr::parse(exp)?;
        let inner = Rc::new_cyclic(|this| WatcherInner {
            id: NEXT_WATCHER_ID.fetch_add(1, Ordering::Relaxed),
            exp: exp.to_string(),
            ast,
            scope: scope.clone(),
            cb,
            deps: RefCell::new(Vec::new()),
            runs: Cell::new(0),
            this: this.clone(),
        });
        log::debug!("watcher {} created for `{}`", inner.id, inner.exp);
        let watcher = Watcher(inner);
        watcher.update()?;
        Ok(watcher)
    }

    pub fn id(&self) -> SubscriberId {
        self.0.id
    }

    pub fn expression(&self) -> &str {
        &self.0.exp
    }

    /// Evaluates the expression, re-subscribing to whatever it reads.
    pub fn get(&self) -> Result<Value> {
        self.0.get()
    }

    /// Evaluates and passes the value to the callback, if there is one.
    pub fn update(&self) -> Result<()> {
        self.0.update()
    }

    /// Number of registries the last evaluation subscribed to.
    pub fn dependency_count(&self) -> usize {
        self.0
            .deps
            .borrow()
            .iter()
            .filter(|d| d.strong_count() > 0)
            .count()
    }

    /// Completed evaluate-and-callback cycles, construction included.
    pub fn runs(&self) -> u64 {
        self.0.runs.get()
    }
}

impl WatcherInner {
    fn get(&self) -> Result<Value> {
        let this: Weak<dyn Subscriber> = self.this.clone();
        let _guard = self.scope.tracker().enter(self.id, this)?;
        let previous = std::mem::take(&mut *self.deps.borrow_mut());
        let result = expr::evaluate(&self.ast, &self.scope);

        // Drop registries the latest evaluation no longer read. Ones it did
        // read keep this watcher at its original position.
        let current = self.deps.borrow();
        for stale in previous
            .iter()
            .filter(|old| !current.iter().any(|d| d.ptr_eq(old)))
        {
            if let Some(dep) = stale.upgrade() {
                dep.remove_sub(self.id);
            }
        }
        result
    }

    fn unsubscribe_all(&self) {
        for dep in self.deps.borrow_mut().drain(..) {
            if let Some(dep) = dep.upgrade() {
                dep.remove_sub(self.id);
            }
        }
    }
}

impl Subscriber for WatcherInner {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn update(&self) -> Result<()> {
        let value = self.get()?;
        self.runs.set(self.runs.get() + 1);
        if let Some(cb) = &self.cb {
            cb(&value);
        }
        Ok(())
    }

    fn subscribed(&self, dep: &Rc<Dep>) {
        let mut deps = self.deps.borrow_mut();
        if !deps.iter().any(|d| std::ptr::eq(d.as_ptr(), Rc::as_ptr(dep))) {
            deps.push(Rc::downgrade(dep));
        }
    }
}

impl Drop for WatcherInner {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}

impl std::fmt::Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("id", &self.0.id)
            .field("expression", &self.0.exp)
            .field("runs", &self.0.runs.get())
            .finish()
    }
}
