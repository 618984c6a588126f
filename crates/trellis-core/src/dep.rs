use std::cell::RefCell;
use std::rc::{Rc, Weak};

use smallvec::SmallVec;

use crate::error::Result;

pub type SubscriberId = u64;

/// Something a [`Dep`] can wake up when its property changes.
pub trait Subscriber {
    fn id(&self) -> SubscriberId;

    /// Re-run and push the fresh value to wherever it goes.
    fn update(&self) -> Result<()>;

    /// Called for every registry read while this subscriber evaluates.
    fn subscribed(&self, _dep: &Rc<Dep>) {}
}

/// Per-property subscriber registry.
///
/// Subscribers are kept in registration order and held weakly: whoever
/// owns the subscriber decides how long the binding lives.
#[derive(Default)]
pub struct Dep {
    subs: RefCell<SmallVec<[(SubscriberId, Weak<dyn Subscriber>); 4]>>,
}

impl Dep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `sub` unless a subscriber with the same id is already
    /// registered. Returns whether the registry grew.
    pub fn add_sub(&self, sub: Weak<dyn Subscriber>) -> bool {
        let Some(strong) = sub.upgrade() else {
            return false;
        };
        let id = strong.id();
        let mut subs = self.subs.borrow_mut();
        if subs.iter().any(|(existing, _)| *existing == id) {
            return false;
        }
        subs.push((id, sub));
        true
    }

    pub fn remove_sub(&self, id: SubscriberId) {
        self.subs.borrow_mut().retain(|(existing, _)| *existing != id);
    }

    /// Updates every current subscriber in registration order.
    ///
    /// Works on a snapshot, so subscribers may re-register (or drop out)
    /// while being updated. The first failing subscriber aborts the rest.
    pub fn notify(&self) -> Result<()> {
        let snapshot: SmallVec<[(SubscriberId, Weak<dyn Subscriber>); 4]> =
            self.subs.borrow().clone();
        if snapshot.is_empty() {
            return Ok(());
        }
        log::trace!("notifying {} subscriber(s)", snapshot.len());

        let mut dead = false;
        for (_, weak) in &snapshot {
            match weak.upgrade() {
                Some(sub) => sub.update()?,
                None => dead = true,
            }
        }
        if dead {
            self.subs
                .borrow_mut()
                .retain(|(_, weak)| weak.strong_count() > 0);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.subs.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.borrow().is_empty()
    }

    pub fn subscriber_ids(&self) -> Vec<SubscriberId> {
        self.subs.borrow().iter().map(|(id, _)| *id).collect()
    }
}

impl std::fmt::Debug for Dep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dep")
            .field("subscribers", &self.subscriber_ids())
            .finish()
    }
}
