//! Observable property cells and the coalescing update queue.
//!
//! A [`Reactive`] wraps one element's property. Every mutation made through
//! [`Reactive::mutate`] marks the owning element dirty and schedules its guid
//! on the shared [`UpdateQueue`] once; further mutations before the queue is
//! drained are coalesced into that single entry. The queue is drained by
//! [`Canvas::flush`](crate::Canvas::flush), which runs `update()` once per
//! dirty element.

use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

use crate::element::ElementGuid;

/// Guids of elements waiting for an update, in scheduling order.
#[derive(Debug, Clone, Default)]
pub struct UpdateQueue {
    pending: Rc<RefCell<Vec<ElementGuid>>>,
}

impl UpdateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&self, guid: ElementGuid) {
        self.pending.borrow_mut().push(guid);
    }

    /// Take every scheduled guid, leaving the queue empty.
    pub fn drain(&self) -> Vec<ElementGuid> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

#[derive(Debug)]
struct Watch {
    guid: ElementGuid,
    dirty: Rc<Cell<bool>>,
    queue: UpdateQueue,
}

type WatchSlot = Rc<RefCell<Option<Watch>>>;

#[derive(Debug)]
struct Shared<P> {
    value: RefCell<P>,
    slot: WatchSlot,
}

/// Shared, observable handle to a property value.
///
/// Clones refer to the same value; a mutation through any clone is seen by
/// the watching element.
#[derive(Debug)]
pub struct Reactive<P> {
    shared: Rc<Shared<P>>,
}

impl<P> Clone for Reactive<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<P> Reactive<P> {
    pub fn new(value: P) -> Self {
        Self {
            shared: Rc::new(Shared {
                value: RefCell::new(value),
                slot: Rc::new(RefCell::new(None)),
            }),
        }
    }

    /// Borrow the current value.
    ///
    /// # Panics
    ///
    /// Panics if called from inside a [`mutate`](Self::mutate) closure on the
    /// same handle.
    pub fn get(&self) -> Ref<'_, P> {
        self.shared.value.borrow()
    }

    pub fn snapshot(&self) -> P
    where
        P: Clone,
    {
        self.shared.value.borrow().clone()
    }

    /// Change the value and notify the watcher, if any.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        let result = f(&mut *self.shared.value.borrow_mut());
        self.notify();
        result
    }

    /// Replace the value wholesale.
    pub fn replace(&self, value: P) -> P {
        self.mutate(|current| std::mem::replace(current, value))
    }

    /// True while an element is observing this value.
    pub fn is_watched(&self) -> bool {
        self.shared.slot.borrow().is_some()
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }

    fn notify(&self) {
        let slot = self.shared.slot.borrow();
        if let Some(watch) = slot.as_ref() {
            if !watch.dirty.replace(true) {
                watch.queue.schedule(watch.guid);
            }
        }
    }

    /// Start observing on behalf of `guid`. Dropping the returned
    /// [`Subscription`] stops observation.
    pub(crate) fn watch(&self, guid: ElementGuid, queue: UpdateQueue) -> Subscription {
        let dirty = Rc::new(Cell::new(false));
        let previous = self.shared.slot.borrow_mut().replace(Watch {
            guid,
            dirty: Rc::clone(&dirty),
            queue,
        });
        if let Some(previous) = previous {
            log::warn!("Property watched by {} is now watched by {}", previous.guid, guid);
        }
        Subscription {
            slot: Rc::clone(&self.shared.slot),
            dirty,
        }
    }
}

/// Live observation of one [`Reactive`] by one element.
#[derive(Debug)]
pub struct Subscription {
    slot: WatchSlot,
    dirty: Rc<Cell<bool>>,
}

impl Subscription {
    /// Clear the dirty flag, returning whether an update was pending.
    pub fn take_pending(&self) -> bool {
        self.dirty.replace(false)
    }

    pub fn is_active(&self) -> bool {
        self.slot
            .borrow()
            .as_ref()
            .is_some_and(|watch| Rc::ptr_eq(&watch.dirty, &self.dirty))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.dirty.set(false);
        let mut slot = self.slot.borrow_mut();
        if slot.as_ref().is_some_and(|watch| Rc::ptr_eq(&watch.dirty, &self.dirty)) {
            *slot = None;
        }
    }
}
