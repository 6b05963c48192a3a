//! coop-kernel — cooperative single-tasking kernel core
//!
//! Minimal runtime for single-core microcontrollers running exactly one
//! application thread of control:
//! - Round-robin task ring: one registered handler per turn, no
//!   preemption, no blocking
//! - Synchronous publish/subscribe message bus: dispatch now, return
//!   when every subscriber has run — nothing is ever queued
//! - Polling millisecond timers: no callbacks, wrap-safe arithmetic
//! - Global interrupt gate with nesting critical sections
//!
//! No heap, no allocator. Registration tables are fixed-capacity and
//! live for the life of the firmware.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod bus;
pub mod irq;
pub mod kernel;
pub mod scheduler;
pub mod task;
pub mod timer;

pub use bus::{
    CallContext, Message, MessageBus, MessageId, Ownership, SubscriberFn, MAX_SUBSCRIPTIONS,
};
pub use kernel::Kernel;
pub use scheduler::{Scheduler, MAX_TASKS};
pub use task::Task;
pub use timer::Timer;

/// Registration failure, reported to startup code.
///
/// There is no runtime recovery path once the cooperative loop is
/// running; a caller that sees one of these during initialization is
/// expected to halt or retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A registration was handed an absent callback.
    ///
    /// The safe API cannot express an absent handler; this arises only
    /// through foreign registration shims that accept nullable function
    /// pointers.
    InvalidHandler,
    /// A fixed-capacity registration table is full.
    CapacityExceeded,
}
