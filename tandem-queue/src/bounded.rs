//! Bounded single-producer single-consumer queue.
//!
//! The queue is a fixed ring of `capacity` slots synchronized through a
//! single atomic element counter. The write cursor belongs to the producer,
//! the read cursor to the consumer; neither cursor is atomic because neither
//! ever crosses a thread boundary. All cross-thread visibility flows through
//! the counter in two directions: a release increment publishes a freshly
//! written element to the consumer, and a release decrement hands the
//! vacated slot back to the producer.
//!
//! # Example
//!
//! ```
//! use tandem_queue::bounded;
//!
//! let (mut tx, mut rx) = bounded::queue::<u64>(8);
//!
//! tx.push(1).unwrap();
//! tx.push(2).unwrap();
//!
//! assert_eq!(rx.pop(), Some(1));
//! assert_eq!(rx.pop(), Some(2));
//! assert_eq!(rx.pop(), None);
//! ```
//!
//! # Progress Guarantees
//!
//! `push` and `pop` are wait-free: each completes in a bounded number of
//! steps regardless of what the other thread is doing. A full queue fails
//! the push and hands the value back; an empty queue returns `None` from
//! pop. Retry and backoff policy belong entirely to the caller.
//!
//! # Memory Ordering
//!
//! The producer checks fullness with a relaxed load. A stale counter can
//! only overstate occupancy (a decrement not yet visible), so the worst
//! case is a spurious `Full` result, never an overfilled ring. The consumer
//! checks emptiness with an acquire load that pairs with the producer's
//! release increment, guaranteeing the element is fully visible before it
//! is moved out.

mod arena;

use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use arena::SlotArena;

/// Creates a bounded SPSC queue with exactly `capacity` usable slots.
///
/// Returns a `(Producer, Consumer)` pair. Each half can be sent to another
/// thread but not shared between threads, which enforces the
/// single-producer/single-consumer roles at compile time.
///
/// # Panics
///
/// Panics if `capacity` is 0.
///
/// # Example
///
/// ```
/// use tandem_queue::bounded;
///
/// let (tx, _rx) = bounded::queue::<String>(100);
/// // No rounding: the capacity is what was asked for.
/// assert_eq!(tx.capacity(), 100);
/// ```
#[must_use]
pub fn queue<T>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    assert!(capacity > 0, "capacity must be non-zero");

    let shared = Arc::new(Shared {
        count: CachePadded::new(AtomicUsize::new(0)),
        back: CachePadded::new(UnsafeCell::new(0)),
        front: CachePadded::new(UnsafeCell::new(0)),
        arena: SlotArena::new(capacity),
    });

    (
        Producer {
            shared: Arc::clone(&shared),
            _role: PhantomData,
        },
        Consumer {
            shared,
            _role: PhantomData,
        },
    )
}

/// State shared by the two halves.
///
/// Slot `i` of the arena holds a live `T` iff `i` lies in the window of
/// length `count` starting at `front` (wrapping mod capacity). `push` and
/// `pop` each maintain this from their own end of the window.
#[repr(C)]
struct Shared<T> {
    /// Number of live elements. The only cross-thread-visible state.
    count: CachePadded<AtomicUsize>,
    /// Producer's write cursor, in `[0, capacity)`. Producer-only.
    back: CachePadded<UnsafeCell<usize>>,
    /// Consumer's read cursor, in `[0, capacity)`. Consumer-only.
    front: CachePadded<UnsafeCell<usize>>,
    /// The backing slots.
    arena: SlotArena<T>,
}

// Safety: the cursors in UnsafeCells are each touched by exactly one role,
// and the arena slots are handed between roles through the release/acquire
// counter.
unsafe impl<T: Send> Send for Shared<T> {}
unsafe impl<T: Send> Sync for Shared<T> {}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        // Both halves are gone; plain accesses are fine.
        let front = *self.front.get_mut();
        let count = *self.count.get_mut();
        let capacity = self.arena.capacity();

        for i in 0..count {
            // Safety: the occupancy window [front, front + count) holds
            // exactly the live elements, each dropped once here.
            unsafe { self.arena.drop_at((front + i) % capacity) };
        }
    }
}

/// The producing half of a bounded SPSC queue.
///
/// Use [`push`](Producer::push) to add elements. Takes `&mut self` to
/// statically ensure single-producer access.
///
/// This struct can be sent to another thread but cannot be shared
/// (implements `Send` but not `Sync`).
pub struct Producer<T> {
    shared: Arc<Shared<T>>,
    /// Opts out of `Sync`; a half belongs to exactly one thread at a time.
    _role: PhantomData<*mut T>,
}

// Safety: Producer is Send but not Sync - only one thread can use it.
unsafe impl<T: Send> Send for Producer<T> {}

impl<T> Producer<T> {
    /// Attempts to push a value into the queue.
    ///
    /// Returns `Err(Full(value))` if the queue is full, handing the value
    /// back so the caller can retry. Never waits on the consumer.
    ///
    /// # Errors
    ///
    /// Returns [`Full`] when all `capacity` slots hold live elements.
    ///
    /// # Example
    ///
    /// ```
    /// use tandem_queue::bounded;
    ///
    /// let (mut tx, mut rx) = bounded::queue::<u32>(2);
    ///
    /// assert!(tx.push(1).is_ok());
    /// assert!(tx.push(2).is_ok());
    ///
    /// // Queue is now full; the value comes back.
    /// let err = tx.push(3).unwrap_err();
    /// assert_eq!(err.into_inner(), 3);
    ///
    /// assert_eq!(rx.pop(), Some(1));
    /// assert!(tx.push(3).is_ok());
    /// ```
    #[inline]
    #[must_use = "push returns Err containing the value if the queue is full"]
    pub fn push(&mut self, value: T) -> Result<(), Full<T>> {
        let shared = &*self.shared;
        let capacity = shared.arena.capacity();

        // Relaxed is deliberate: staleness can only make the queue look
        // fuller than it is, declining a push that would have fit. Only
        // this thread increments the counter, so it can never observe
        // fewer elements than are actually live.
        if shared.count.load(Ordering::Relaxed) == capacity {
            return Err(Full(value));
        }

        // Safety: only the producer touches `back`, and the fullness check
        // guarantees the slot at `back` is vacant.
        let back = unsafe { &mut *shared.back.get() };
        unsafe { shared.arena.write(*back, value) };
        *back = (*back + 1) % capacity;

        // Release pairs with the consumer's acquire load: observing the
        // increment implies seeing the element fully written.
        shared.count.fetch_add(1, Ordering::Release);
        Ok(())
    }

    /// Returns the capacity of the queue.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared.arena.capacity()
    }

    /// Returns the number of elements currently in the queue.
    ///
    /// Note: This is a snapshot and may be immediately stale in concurrent
    /// contexts.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.count.load(Ordering::Relaxed)
    }

    /// Returns `true` if the queue is empty.
    ///
    /// Advisory only: the consumer may be concurrently mutating the count.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the consumer has been dropped.
    ///
    /// Note: This may return a stale value; the consumer could be dropped
    /// immediately after this returns `false`.
    #[inline]
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        Arc::strong_count(&self.shared) == 1
    }
}

impl<T> fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// The consuming half of a bounded SPSC queue.
///
/// Use [`pop`](Consumer::pop) to remove elements. Takes `&mut self` to
/// statically ensure single-consumer access.
///
/// This struct can be sent to another thread but cannot be shared
/// (implements `Send` but not `Sync`).
pub struct Consumer<T> {
    shared: Arc<Shared<T>>,
    /// Opts out of `Sync`; a half belongs to exactly one thread at a time.
    _role: PhantomData<*mut T>,
}

// Safety: Consumer is Send but not Sync - only one thread can use it.
unsafe impl<T: Send> Send for Consumer<T> {}

impl<T> Consumer<T> {
    /// Attempts to pop the oldest value from the queue.
    ///
    /// Returns `None` if the queue is empty. Emptiness is a normal outcome,
    /// not an error, and the pop leaves no state disturbed. Never waits on
    /// the producer.
    ///
    /// # Example
    ///
    /// ```
    /// use tandem_queue::bounded;
    ///
    /// let (mut tx, mut rx) = bounded::queue::<u32>(8);
    ///
    /// assert_eq!(rx.pop(), None);
    ///
    /// tx.push(42).unwrap();
    /// assert_eq!(rx.pop(), Some(42));
    /// ```
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let shared = &*self.shared;

        // Acquire pairs with the producer's release increment so the
        // element bytes are fully visible before the move below.
        if shared.count.load(Ordering::Acquire) == 0 {
            return None;
        }

        // Safety: only the consumer touches `front`, and the emptiness
        // check guarantees the slot at `front` is live.
        let front = unsafe { &mut *shared.front.get() };
        let value = unsafe { shared.arena.take(*front) };
        *front = (*front + 1) % shared.arena.capacity();

        // Release hands the vacated slot back to the producer.
        shared.count.fetch_sub(1, Ordering::Release);
        Some(value)
    }

    /// Returns the capacity of the queue.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.shared.arena.capacity()
    }

    /// Returns the number of elements currently in the queue.
    ///
    /// Note: This is a snapshot and may be immediately stale in concurrent
    /// contexts.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.count.load(Ordering::Relaxed)
    }

    /// Returns `true` if the queue is empty.
    ///
    /// Advisory only: the producer may be concurrently mutating the count.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the producer has been dropped.
    ///
    /// Note: This may return a stale value; the producer could be dropped
    /// immediately after this returns `false`. Elements already in the
    /// queue remain poppable after disconnection.
    #[inline]
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        Arc::strong_count(&self.shared) == 1
    }
}

impl<T> fmt::Debug for Consumer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// Error returned by [`Producer::push`] when the queue is full.
///
/// Contains the value that could not be pushed, allowing the caller to
/// retry or handle the value differently.
///
/// # Example
///
/// ```
/// use tandem_queue::bounded;
///
/// let (mut tx, _rx) = bounded::queue::<u32>(1);
///
/// tx.push(1).unwrap();
///
/// let err = tx.push(2).unwrap_err();
/// assert_eq!(err.into_inner(), 2);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Full<T>(T);

impl<T> Full<T> {
    /// Returns the value that could not be pushed.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Display for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "queue is full")
    }
}

impl<T> fmt::Debug for Full<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Full").finish_non_exhaustive()
    }
}

impl<T> std::error::Error for Full<T> {}
