//! Kernel — composition root.
//!
//! Owns the task ring and the message bus and ties their lifecycles
//! together; no logic of its own beyond that. Built explicitly at
//! startup and passed by reference to whatever owns the main loop —
//! there is no hidden singleton.
//!
//! Usage shape:
//! 1. Drivers and application modules `register_task` / `subscribe`.
//! 2. `start()` once the wiring is done.
//! 3. The firmware main loop calls `poll()` forever.

use log::info;

use crate::bus::{CallContext, MessageBus, MessageId, Ownership, SubscriberFn};
use crate::scheduler::Scheduler;
use crate::task::Task;
use crate::Error;

/// The kernel: task ring + message bus + lifecycle.
pub struct Kernel<'a> {
    pub scheduler: Scheduler<'a>,
    pub bus: MessageBus,
    running: bool,
    turns: u64,
}

impl<'a> Kernel<'a> {
    pub const fn new() -> Self {
        Self {
            scheduler: Scheduler::new(),
            bus: MessageBus::new(),
            running: false,
            turns: 0,
        }
    }

    /// Register a task with the ring. Initialization phase.
    pub fn register_task(&mut self, task: &'a mut dyn Task) -> Result<(), Error> {
        self.scheduler.register(task)
    }

    /// Subscribe a handler to a message identifier. Initialization
    /// phase.
    pub fn subscribe(&mut self, id: MessageId, handler: SubscriberFn) -> Result<(), Error> {
        self.bus.subscribe(id, handler)
    }

    /// Publish a message through the bus. See [`MessageBus::publish`].
    pub fn publish(&self, id: MessageId, payload: u32, ownership: Ownership, context: CallContext) {
        self.bus.publish(id, payload, ownership, context)
    }

    /// Mark startup complete.
    pub fn start(&mut self) {
        self.running = true;
        info!(
            "kernel up: {} tasks, {} subscriptions",
            self.scheduler.task_count(),
            self.bus.subscription_count()
        );
    }

    /// Mark the system as shutting down. In a deployed firmware this is
    /// normally never reached.
    pub fn stop(&mut self) {
        self.running = false;
        info!("kernel stopped after {} turns", self.turns);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Run one scheduler turn against the bus.
    ///
    /// Returns whether a task handler ran. The caller loops on this
    /// forever; each registered task therefore repeats at
    /// (task count × loop rate).
    pub fn poll(&mut self) -> bool {
        self.turns += 1;
        self.scheduler.run_turn(&self.bus)
    }

    /// Turns executed since construction.
    pub fn turn_count(&self) -> u64 {
        self.turns
    }
}

impl<'a> Default for Kernel<'a> {
    fn default() -> Self {
        Self::new()
    }
}
