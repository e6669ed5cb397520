use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared in-flight marker for one controller action.
///
/// Clones observe the same flag, so a renderer holding a clone sees the
/// action as busy while it runs.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Marks the action as running, or returns `None` if it already is.
    pub fn try_acquire(&self) -> Option<BusyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(Arc::clone(&self.0)))
    }
}

/// Clears the flag when dropped, including when the action's future is dropped.
#[derive(Debug)]
pub struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, Default)]
pub struct BusyFlags {
    pub loading: BusyFlag,
    pub creating: BusyFlag,
    pub updating: BusyFlag,
    pub deleting: BusyFlag,
    pub processing: BusyFlag,
}
