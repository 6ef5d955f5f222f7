//! Runtime resolution of mod symbolic ids.
//!
//! [`ResMap`] is a cheaply cloneable handle shared between the manager and
//! any number of consumers. Lookups are plain map reads; readiness is a
//! one-shot latch: there is exactly one event per process, fired at most
//! once, and callbacks registered after the fact run immediately. Everything
//! is synchronous on the caller's stack; there is no event loop behind this.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::id::SlotId;
use crate::merge::ItemsMapping;

type ReadyCallback = Box<dyn FnOnce()>;

#[derive(Default)]
struct Inner {
    items: ItemsMapping,
    validated: bool,
    pending: Vec<ReadyCallback>,
}

/// Shared lookup façade over the merged items mapping.
#[derive(Clone, Default)]
pub struct ResMap {
    inner: Rc<RefCell<Inner>>,
}

impl ResMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the merged mapping. Called once by the manager before the
    /// validation decision; lookups work from this point on.
    pub(crate) fn publish_items(&self, items: ItemsMapping) {
        self.inner.borrow_mut().items = items;
    }

    /// Whether validation completed in this process.
    pub fn is_validated(&self) -> bool {
        self.inner.borrow().validated
    }

    /// Number of mod ids in the mapping.
    pub fn item_count(&self) -> usize {
        self.inner.borrow().items.len()
    }

    /// Resolve a symbolic id to its slot. [`SlotId::INVALID`] when unknown;
    /// absence is not an error.
    pub fn slot_for(&self, id: &str) -> SlotId {
        self.inner
            .borrow()
            .items
            .get(id)
            .copied()
            .unwrap_or(SlotId::INVALID)
    }

    /// All ids containing `mask` as a substring, in assignment order.
    pub fn slots_matching(&self, mask: &str) -> Vec<(String, SlotId)> {
        self.inner
            .borrow()
            .items
            .iter()
            .filter(|(id, _)| id.contains(mask))
            .map(|(id, slot)| (id.clone(), *slot))
            .collect()
    }

    /// Run `callback` once the table is validated: immediately and
    /// synchronously if validation already happened, otherwise at the moment
    /// it does. Callbacks run in registration order and never run at all if
    /// validation never completes in this process.
    pub fn on_ready<F: FnOnce() + 'static>(&self, callback: F) {
        let already = self.inner.borrow().validated;
        if already {
            callback();
        } else {
            self.inner.borrow_mut().pending.push(Box::new(callback));
        }
    }

    /// Latch the validated state and drain pending callbacks. Idempotent.
    pub(crate) fn mark_validated(&self) {
        let pending = {
            let mut inner = self.inner.borrow_mut();
            if inner.validated {
                return;
            }
            inner.validated = true;
            std::mem::take(&mut inner.pending)
        };
        // Invoked outside the borrow so callbacks can call back into the map.
        for callback in pending {
            callback();
        }
    }
}

/// A slot requested before the table is ready.
///
/// Constructed with a symbolic id, registers itself on the ready latch and
/// resolves exactly once at validation. [`ModSlot::get`] returns the cached
/// result: the real slot after validation, [`SlotId::INVALID`] before it and
/// forever if the table never validates.
pub struct ModSlot {
    slot: Rc<Cell<SlotId>>,
}

impl ModSlot {
    pub fn new(map: &ResMap, mod_id: impl Into<String>) -> Self {
        let mod_id = mod_id.into();
        let slot = Rc::new(Cell::new(SlotId::INVALID));
        let cell = Rc::clone(&slot);
        let lookup = map.clone();
        map.on_ready(move || cell.set(lookup.slot_for(&mod_id)));
        Self { slot }
    }

    pub fn get(&self) -> SlotId {
        self.slot.get()
    }
}
