use loom::sync::Mutex;
use loom::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};

/// Context identity in the model. `Root` stands for the absent context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Root,
    Scoped(usize),
}

/// One published index snapshot: context key to table id.
#[derive(Debug)]
struct Snapshot {
    slots: Vec<(Key, usize)>,
}

impl Snapshot {
    fn lookup(&self, key: Key) -> Option<usize> {
        self.slots.iter().find(|(k, _)| *k == key).map(|(_, id)| *id)
    }
}

/// The registration protocol, re-expressed with loom primitives.
///
/// `current` stands in for the atomically swapped index; tables are
/// reduced to their creation ids, which is all the single-create
/// argument needs. Retired snapshots are parked under the registration
/// mutex and freed when the probe drops, after every model thread has
/// joined, so a reader can never dereference a freed snapshot.
pub struct Probe {
    current: AtomicPtr<Snapshot>,
    registration: Mutex<Vec<*mut Snapshot>>,
    created: AtomicUsize,
}

unsafe impl Send for Probe {}
unsafe impl Sync for Probe {}

impl Probe {
    pub fn new() -> Self {
        let empty = Box::into_raw(Box::new(Snapshot { slots: Vec::new() }));
        Self {
            current: AtomicPtr::new(empty),
            registration: Mutex::new(Vec::new()),
            created: AtomicUsize::new(0),
        }
    }

    /// Table id for `key`, creating one when `create` is set.
    pub fn resolve(&self, key: Key, create: bool) -> Option<usize> {
        if let Some(id) = self.lookup(key) {
            return Some(id);
        }
        if !create {
            return None;
        }

        let mut retired = self.registration.lock().unwrap();

        if let Some(id) = self.lookup(key) {
            return Some(id);
        }

        let id = self.created.fetch_add(1, Ordering::Relaxed);
        let snapshot = unsafe { &*self.current.load(Ordering::Acquire) };
        let mut slots = snapshot.slots.clone();
        slots.push((key, id));
        let next = Box::into_raw(Box::new(Snapshot { slots }));
        let previous = self.current.swap(next, Ordering::AcqRel);
        retired.push(previous);

        Some(id)
    }

    /// Lock-free lookup against the currently published snapshot.
    pub fn lookup(&self, key: Key) -> Option<usize> {
        let snapshot = unsafe { &*self.current.load(Ordering::Acquire) };
        snapshot.lookup(key)
    }

    /// Number of tables ever created.
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }
}

impl Default for Probe {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Probe {
    fn drop(&mut self) {
        // All model threads have joined; nothing can still hold a pointer.
        let mut retired = self.registration.lock().unwrap();
        for pointer in retired.drain(..) {
            drop(unsafe { Box::from_raw(pointer) });
        }
        drop(unsafe { Box::from_raw(self.current.load(Ordering::Acquire)) });
    }
}
