//! Spin-guarded shared value.
//!
//! A [`SpinValue`] owns a single value of type `T`. Readers take scoped
//! access through [`lock_for_read`](SpinValue::lock_for_read); a writer
//! replaces the value through [`write`](SpinValue::write), busy-waiting
//! until every outstanding read guard has been released. Neither side ever
//! touches a kernel synchronization primitive: contention is resolved
//! purely by spinning (optionally yielding, see [`WaitStrategy`]), trading
//! CPU cycles for low latency and avoiding context-switch and
//! priority-inversion hazards.
//!
//! Dropping a guard is the sole event that lets a spinning writer proceed,
//! so the intended usage pattern is short-lived read sections.
//!
//! # Example
//!
//! ```
//! use tandem_spin::SpinValue;
//!
//! let shared = SpinValue::new(String::from("[OLD DATA]"));
//!
//! {
//!     let data = shared.lock_for_read();
//!     assert_eq!(&*data, "[OLD DATA]");
//!     // A writer on another thread would spin here until `data` drops.
//! }
//!
//! shared.write(String::from("[NEW DATA]"));
//! assert_eq!(&*shared.lock_for_read(), "[NEW DATA]");
//! ```
//!
//! # What is promised
//!
//! A `write` never completes while any read guard is outstanding, and a
//! `lock_for_read` after a completed `write` observes the new value. The
//! internal mechanism admits concurrent readers, but callers should not
//! build on any reader-reader admission order beyond that contract.
//!
//! # Memory Ordering
//!
//! The whole primitive is one state word: bit 0 flags an in-progress
//! install, the remaining bits count outstanding read guards. A reader's
//! acquire increment pairs with the writer's release clear so the guard
//! sees the fully installed value; a guard's release decrement pairs with
//! the writer's acquire claim so every read finishes before the old value
//! is dropped.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use std::cell::UnsafeCell;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::Backoff;

/// Bit 0 of the state word: an install is in progress.
const WRITER: usize = 1;
/// Each outstanding read guard adds this to the state word.
const READER: usize = 2;

/// How a spinning side burns time while it waits.
///
/// Exposed so callers can bound worst-case spin behavior instead of
/// inheriting one hardcoded policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WaitStrategy {
    /// Pure busy-wait with `core::hint::spin_loop`. Lowest latency; burns
    /// a core for the full wait.
    #[default]
    Spin,
    /// `crossbeam_utils::Backoff::snooze`: spin briefly, then yield to the
    /// scheduler under sustained contention.
    SpinThenYield,
}

/// A single shared value guarded by busy-waiting.
///
/// See the [crate docs](crate) for the contract and an example.
pub struct SpinValue<T> {
    /// Writer bit plus outstanding-reader count.
    state: AtomicUsize,
    strategy: WaitStrategy,
    value: UnsafeCell<T>,
}

// Safety: same bounds as std's RwLock. Readers on other threads get &T
// (T: Sync); a write moves a T in and drops the old one on whichever
// thread calls it (T: Send).
unsafe impl<T: Send> Send for SpinValue<T> {}
unsafe impl<T: Send + Sync> Sync for SpinValue<T> {}

impl<T> SpinValue<T> {
    /// Creates a new guarded value using the default [`WaitStrategy::Spin`].
    pub const fn new(value: T) -> Self {
        Self::with_strategy(value, WaitStrategy::Spin)
    }

    /// Creates a new guarded value with an explicit wait strategy.
    ///
    /// # Example
    ///
    /// ```
    /// use tandem_spin::{SpinValue, WaitStrategy};
    ///
    /// let shared = SpinValue::with_strategy(0u64, WaitStrategy::SpinThenYield);
    /// shared.write(7);
    /// assert_eq!(*shared.lock_for_read(), 7);
    /// ```
    pub const fn with_strategy(value: T, strategy: WaitStrategy) -> Self {
        Self {
            state: AtomicUsize::new(0),
            strategy,
            value: UnsafeCell::new(value),
        }
    }

    /// Acquires scoped read access to the current value.
    ///
    /// The returned guard derefs to `&T`. While any guard is outstanding a
    /// concurrent [`write`](Self::write) spins; dropping the last guard is
    /// what lets it proceed. Taking a guard never blocks on the scheduler
    /// beyond the configured [`WaitStrategy`]: it only has to wait out an
    /// in-progress install, which lasts for one value move.
    #[inline]
    #[must_use = "the guard's lifetime is what holds off a writer"]
    pub fn lock_for_read(&self) -> ReadGuard<'_, T> {
        let backoff = Backoff::new();
        loop {
            // Optimistically announce the read, then back out if a write's
            // install window was open.
            let state = self.state.fetch_add(READER, Ordering::Acquire);
            if state & WRITER == 0 {
                return ReadGuard { lock: self };
            }
            self.state.fetch_sub(READER, Ordering::Relaxed);
            self.relax(&backoff);
        }
    }

    /// Replaces the value, busy-waiting until no read guard is outstanding.
    ///
    /// The old value is dropped. Rival writers are serialized: the install
    /// window is claimed atomically together with the no-readers check, so
    /// the replacement is never torn. Completion makes the new value
    /// visible to every subsequent [`lock_for_read`](Self::lock_for_read).
    pub fn write(&self, value: T) {
        let backoff = Backoff::new();

        // The install may begin only when no guard is outstanding; taking
        // the writer bit in the same CAS keeps the window exclusive against
        // rival writers and late-arriving readers.
        while self
            .state
            .compare_exchange_weak(0, WRITER, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            self.relax(&backoff);
        }

        // Safety: the writer bit is held and the reader count was zero, so
        // no reference into the cell exists and none can be created until
        // the bit clears.
        unsafe { *self.value.get() = value };

        self.state.fetch_and(!WRITER, Ordering::Release);
    }

    /// Returns a mutable reference to the value.
    ///
    /// No synchronization is needed: `&mut self` proves no guard exists.
    #[inline]
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    /// Consumes the lock and returns the value.
    #[inline]
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }

    /// Returns the configured wait strategy.
    #[inline]
    #[must_use]
    pub const fn wait_strategy(&self) -> WaitStrategy {
        self.strategy
    }

    #[inline]
    fn relax(&self, backoff: &Backoff) {
        match self.strategy {
            WaitStrategy::Spin => core::hint::spin_loop(),
            WaitStrategy::SpinThenYield => backoff.snooze(),
        }
    }
}

impl<T: Default> Default for SpinValue<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for SpinValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.load(Ordering::Relaxed);
        f.debug_struct("SpinValue")
            .field("readers", &(state / READER))
            .field("writing", &(state & WRITER != 0))
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

/// Scoped read access to a [`SpinValue`].
///
/// Holding the guard keeps any concurrent [`write`](SpinValue::write)
/// spinning; dropping it releases the hold.
pub struct ReadGuard<'a, T> {
    lock: &'a SpinValue<T>,
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        // Safety: the reader count in the state word is nonzero for the
        // guard's whole lifetime, so no install can touch the cell.
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    #[inline]
    fn drop(&mut self) {
        // Release pairs with the writer's acquire claim: every access
        // through this guard completes before the old value is replaced.
        self.lock.state.fetch_sub(READER, Ordering::Release);
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadGuard<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadGuard").field(&&**self).finish()
    }
}
