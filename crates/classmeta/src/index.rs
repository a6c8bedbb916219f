//! Outer-index snapshots
//!
//! A [`ContextIndex`] is one immutable snapshot of every registered
//! namespace context and its class table. The cache never mutates a
//! published snapshot: registration builds a fresh copy (dropping slots
//! whose context has died along the way) and atomically swaps it in, so
//! readers always observe a fully formed index.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use crate::table::ClassTable;

// ---------------------------------------------------------------------------
// ContextKey — identity of a namespace context inside a snapshot
// ---------------------------------------------------------------------------

/// Hash key for one namespace context.
///
/// `Scoped` carries the `Arc` data-pointer address of the context; the root
/// namespace has no context object and gets its own variant rather than a
/// sentinel address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum ContextKey {
    Root,
    Scoped(usize),
}

impl ContextKey {
    pub(crate) fn of<C>(context: Option<&Arc<C>>) -> Self {
        context.map_or(Self::Root, |ctx| Self::Scoped(Arc::as_ptr(ctx).addr()))
    }
}

// ---------------------------------------------------------------------------
// ContextSlot — one snapshot entry
// ---------------------------------------------------------------------------

/// A context's liveness handle plus its class table.
///
/// The weak handle pins the context's allocation without keeping the value
/// alive: a `Scoped` address cannot be recycled by a different live context
/// while any snapshot still holds this slot, which is what makes
/// address-based lookup sound without an upgrade check. The root slot has
/// no liveness to track and is never purged.
pub(crate) struct ContextSlot<C, T>
where
    T: Clone + Send + Sync,
{
    context: Option<Weak<C>>,
    classes: Arc<ClassTable<T>>,
}

impl<C, T> ContextSlot<C, T>
where
    T: Clone + Send + Sync,
{
    pub(crate) fn rooted(classes: Arc<ClassTable<T>>) -> Self {
        Self {
            context: None,
            classes,
        }
    }

    pub(crate) fn scoped(context: &Arc<C>, classes: Arc<ClassTable<T>>) -> Self {
        Self {
            context: Some(Arc::downgrade(context)),
            classes,
        }
    }

    #[inline]
    pub(crate) fn classes(&self) -> &Arc<ClassTable<T>> {
        &self.classes
    }

    fn is_live(&self) -> bool {
        self.context
            .as_ref()
            .is_none_or(|context| context.strong_count() > 0)
    }
}

impl<C, T> Clone for ContextSlot<C, T>
where
    T: Clone + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
            classes: Arc::clone(&self.classes),
        }
    }
}

// ---------------------------------------------------------------------------
// ContextIndex — the immutable snapshot
// ---------------------------------------------------------------------------

pub(crate) struct ContextIndex<C, T>
where
    T: Clone + Send + Sync,
{
    slots: HashMap<ContextKey, ContextSlot<C, T>>,
}

impl<C, T> ContextIndex<C, T>
where
    T: Clone + Send + Sync,
{
    pub(crate) fn empty() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// The class table registered for `key`, if any.
    #[inline]
    pub(crate) fn classes_for(&self, key: ContextKey) -> Option<&Arc<ClassTable<T>>> {
        self.slots.get(&key).map(ContextSlot::classes)
    }

    /// Build the successor snapshot: all live slots plus the new one.
    ///
    /// Returns the new index and the number of dead slots left behind.
    pub(crate) fn with_slot(&self, key: ContextKey, slot: ContextSlot<C, T>) -> (Self, u64) {
        debug_assert!(
            !self.slots.contains_key(&key),
            "context registered twice; the double check must prevent this"
        );

        let mut slots = HashMap::with_capacity(self.slots.len() + 1);
        let mut purged = 0u64;
        for (existing, existing_slot) in &self.slots {
            if existing_slot.is_live() {
                slots.insert(*existing, existing_slot.clone());
            } else {
                purged += 1;
            }
        }
        slots.insert(key, slot);

        (Self { slots }, purged)
    }

    /// Number of live registered contexts.
    pub(crate) fn live_len(&self) -> usize {
        self.slots.values().filter(|slot| slot.is_live()).count()
    }

    /// Total cached classes across live contexts.
    pub(crate) fn entry_count(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.is_live())
            .map(|slot| slot.classes.len())
            .sum()
    }
}
