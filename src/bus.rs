//! Synchronous publish/subscribe message bus.
//!
//! Despite the heritage name "message queue", nothing is queued:
//! `publish` invokes every subscriber of the identifier inline, in
//! subscription order, and returns when the last one has. This buys
//! predictable latency at the cost of backpressure, which is the right
//! trade for a single-tasked target.
//!
//! The subscription table is fixed-capacity and init-time-mostly:
//! `subscribe` needs `&mut self`, so nothing can grow the table while a
//! dispatch is in flight.

use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use heapless::Vec;
use log::{debug, trace};

use crate::Error;

/// Maximum subscriptions across all message identifiers.
pub const MAX_SUBSCRIPTIONS: usize = 32;

/// Dispatch depth at which re-entrant publishing is assumed runaway.
///
/// Subscribers may legally publish for a different identifier; the bus
/// does not cycle-detect, so a publish chain that never terminates
/// would otherwise recurse until the stack dies.
pub const MAX_PUBLISH_DEPTH: u8 = 8;

/// Message identifier — a closed, compile-time-defined small integer
/// space agreed upon by all collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MessageId(pub u8);

/// Who keeps responsibility for whatever the payload refers to.
///
/// Meaningless for plain scalar payloads; load-bearing when the payload
/// is a handle or index into a resource one side must release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// The publisher keeps the referent; subscribers must not hold it
    /// past the dispatch.
    CallerOwned,
    /// The referent is handed to the subscriber.
    CalleeOwned,
}

/// Execution context a message was published from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallContext {
    /// Cooperative main loop.
    Task,
    /// Interrupt handler. Subscribers must finish quickly and must not
    /// publish further.
    Interrupt,
}

/// One dispatched message. Ephemeral: exists only for the duration of
/// the `publish` call that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    /// Word-sized scalar. Larger data travels as a handle, with
    /// `ownership` saying who releases it.
    pub payload: u32,
    pub ownership: Ownership,
    pub context: CallContext,
}

/// Subscriber callback. Receives the bus so it can publish follow-up
/// messages (task context only).
pub type SubscriberFn = fn(&MessageBus, &Message);

struct Subscription {
    id: MessageId,
    handler: SubscriberFn,
}

/// The bus: a registry mapping message identifiers to subscribers.
pub struct MessageBus {
    subs: Vec<Subscription, MAX_SUBSCRIPTIONS>,
    /// In-flight dispatch depth, for the runaway-recursion assert.
    depth: AtomicU8,
    /// True while an interrupt-context dispatch is in flight.
    irq_dispatch: AtomicBool,
}

impl MessageBus {
    pub const fn new() -> Self {
        Self {
            subs: Vec::new(),
            depth: AtomicU8::new(0),
            irq_dispatch: AtomicBool::new(false),
        }
    }

    /// Register `handler` for messages with identifier `id`.
    ///
    /// Multiple subscribers per identifier are fine; they are invoked
    /// in subscription order. Task context only, initialization phase.
    pub fn subscribe(&mut self, id: MessageId, handler: SubscriberFn) -> Result<(), Error> {
        self.subs
            .push(Subscription { id, handler })
            .map_err(|_| Error::CapacityExceeded)?;
        debug!(
            "bus: subscriber added for id {} ({} total)",
            id.0,
            self.subs.len()
        );
        Ok(())
    }

    /// Dispatch a message now.
    ///
    /// Every subscriber of `id` runs before this returns, in
    /// subscription order, on the caller's stack. No subscribers is a
    /// silent no-op. A subscriber may publish for a different
    /// identifier unless this dispatch is interrupt-tagged.
    pub fn publish(&self, id: MessageId, payload: u32, ownership: Ownership, context: CallContext) {
        let prev_depth = self.depth.fetch_add(1, Ordering::Relaxed);
        debug_assert!(prev_depth < MAX_PUBLISH_DEPTH, "runaway publish recursion");
        debug_assert!(
            !self.irq_dispatch.load(Ordering::Relaxed),
            "publish from an interrupt-context subscriber"
        );
        if context == CallContext::Interrupt {
            self.irq_dispatch.store(true, Ordering::Relaxed);
        }

        let msg = Message {
            id,
            payload,
            ownership,
            context,
        };
        trace!("bus: publish id {} payload {:#x}", id.0, payload);
        for sub in self.subs.iter().filter(|s| s.id == id) {
            (sub.handler)(self, &msg);
        }

        if context == CallContext::Interrupt {
            self.irq_dispatch.store(false, Ordering::Relaxed);
        }
        self.depth.fetch_sub(1, Ordering::Relaxed);
    }

    /// Total registered subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subs.len()
    }

    /// Subscriptions registered for one identifier.
    pub fn subscribers_of(&self, id: MessageId) -> usize {
        self.subs.iter().filter(|s| s.id == id).count()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
