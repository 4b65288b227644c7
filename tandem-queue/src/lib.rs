//! # tandem-queue
//!
//! A wait-free bounded single-producer single-consumer (SPSC) queue for
//! latency-sensitive thread-to-thread handoff.
//!
//! ## Features
//!
//! - **Wait-free**: `push` and `pop` are O(1) and loop-free; a full or empty
//!   observation returns immediately instead of waiting on the other thread
//! - **Exact capacity**: every requested slot is usable; no power-of-two
//!   rounding, no reserved sentinel slot
//! - **One shared atomic**: the element counter is the only cross-thread
//!   state; the cursors are plain integers owned by one role each
//!
//! ## Design Goals
//!
//! - No allocations after construction
//! - Cache-line isolation between the roles' hot state
//! - Compile-time enforcement of the single-producer/single-consumer roles
//!   (`&mut self` on halves that are `Send` but not `Sync`)
//!
//! ## Example
//!
//! ```
//! use tandem_queue::bounded;
//!
//! // Capacity is exact: all 5 slots are usable.
//! let (mut tx, mut rx) = bounded::queue::<u64>(5);
//!
//! tx.push(42).unwrap();
//!
//! assert_eq!(rx.pop(), Some(42));
//! assert_eq!(rx.pop(), None);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bounded;

pub use bounded::{queue, Consumer, Full, Producer};
