use parking_lot::{Mutex, MutexGuard};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// A value that is mutable until sealed and immutable afterwards.
///
/// The lock guards only mutations and the sealing transition. Once sealed, reads go through
/// the [`OnceLock`] without touching the lock.
#[derive(Debug)]
pub(crate) struct Sealable<M> {
    sealed: AtomicBool,
    pending: Mutex<Option<M>>,
    frozen: OnceLock<M>,
}

impl<M> Sealable<M> {
    pub(crate) const fn new(value: M) -> Self {
        Self { sealed: AtomicBool::new(false), pending: Mutex::new(Some(value)), frozen: OnceLock::new() }
    }

    pub(crate) fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Applies `f` to the unsealed value. Returns `None` when already sealed.
    pub(crate) fn mutate<R>(&self, f: impl FnOnce(&mut M) -> R) -> Option<R> {
        if self.is_sealed() {
            return None;
        }
        self.pending.lock().as_mut().map(f)
    }

    /// Locks the unsealed value for a mutation spanning several cells.
    ///
    /// The guard holds `None` once the value is sealed.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Option<M>> {
        self.pending.lock()
    }

    /// Freezes the value. Returns `true` only for the call that performed the transition.
    pub(crate) fn seal(&self) -> bool {
        if self.is_sealed() {
            return false;
        }
        let mut pending = self.pending.lock();
        let Some(value) = pending.take() else {
            return false;
        };
        let _ = self.frozen.set(value);
        self.sealed.store(true, Ordering::Release);
        true
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        if let Some(value) = self.frozen.get() {
            return f(value);
        }
        let pending = self.pending.lock();
        match (pending.as_ref(), self.frozen.get()) {
            (Some(value), _) | (None, Some(value)) => f(value),
            (None, None) => unreachable!("a sealed value is always frozen"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutations_fail_after_seal() {
        let cell = Sealable::new(vec![1]);
        assert_eq!(cell.mutate(|v| v.push(2)), Some(()));
        assert!(cell.seal());
        assert!(!cell.seal());
        assert!(cell.is_sealed());
        assert_eq!(cell.mutate(|v| v.push(3)), None);
        assert!(cell.lock().is_none());
        assert_eq!(cell.read(Vec::len), 2);
    }

    #[test]
    fn concurrent_seal_happens_once() {
        let cell = Sealable::new(0u8);
        let sealed = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| cell.seal())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).filter(|won| *won).count()
        });
        assert_eq!(sealed, 1);
    }
}
