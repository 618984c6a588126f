use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::dep::{Dep, Subscriber, SubscriberId};
use crate::error::{Error, Result};

/// The "currently evaluating" slot for one observable scope graph.
///
/// Every reactive property installed through a tracker captures a clone of
/// it, so reads made while a watcher is active subscribe that watcher.
/// Independent scopes get independent trackers and never see each other's
/// evaluations.
#[derive(Clone, Default)]
pub struct Tracker {
    current: Rc<RefCell<Option<Active>>>,
}

#[derive(Clone)]
struct Active {
    id: SubscriberId,
    sub: Weak<dyn Subscriber>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the subscriber currently evaluating, if any.
    pub fn active(&self) -> Option<SubscriberId> {
        self.current.borrow().as_ref().map(|a| a.id)
    }

    /// Marks `sub` as the evaluating subscriber until the guard drops.
    ///
    /// Evaluation is not reentrant: if the slot is already taken the call
    /// fails instead of clobbering the outer subscriber's attribution.
    pub fn enter(&self, id: SubscriberId, sub: Weak<dyn Subscriber>) -> Result<TrackGuard> {
        let mut current = self.current.borrow_mut();
        if let Some(active) = current.as_ref() {
            return Err(Error::Reentrant {
                active: active.id,
                requested: id,
            });
        }
        *current = Some(Active { id, sub });
        Ok(TrackGuard {
            tracker: self.clone(),
        })
    }

    /// Subscribes the evaluating subscriber (if any) to `dep` and tells it
    /// which registry it read.
    pub fn track(&self, dep: &Rc<Dep>) {
        let active = self.current.borrow().clone();
        let Some(active) = active else {
            return;
        };
        dep.add_sub(active.sub.clone());
        if let Some(sub) = active.sub.upgrade() {
            sub.subscribed(dep);
        }
    }

    pub fn ptr_eq(&self, other: &Tracker) -> bool {
        Rc::ptr_eq(&self.current, &other.current)
    }
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("active", &self.active())
            .finish()
    }
}

/// Clears the tracker slot on drop, including on early returns.
pub struct TrackGuard {
    tracker: Tracker,
}

impl Drop for TrackGuard {
    fn drop(&mut self) {
        *self.tracker.current.borrow_mut() = None;
    }
}
