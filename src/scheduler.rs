//! Round-robin task ring.
//!
//! Cooperative scheduling at its most minimal: a fixed-capacity ring of
//! long-lived handlers and a cursor. Each turn runs exactly one handler
//! and advances the cursor; off the end, the cursor wraps to the head.
//!
//! Registration is LIFO — the newest task becomes the head and runs
//! first in each cycle. That reversal is a user-visible guarantee, not
//! an accident: later-registered tasks observe earlier-registered
//! tasks' bus side effects from the previous cycle, and pipelines like
//! display-then-input depend on the order staying fixed.

use heapless::Vec;
use log::debug;

use crate::bus::MessageBus;
use crate::task::Task;
use crate::Error;

/// Maximum tasks the ring can hold.
pub const MAX_TASKS: usize = 16;

/// The task ring.
///
/// Tasks are stored in registration order; dispatch walks from the
/// newest entry down to the oldest, which realizes head-insertion
/// without moving entries.
pub struct Scheduler<'a> {
    tasks: Vec<&'a mut dyn Task, MAX_TASKS>,
    /// Index of the next task to run; `None` wraps to the head on the
    /// following turn.
    cursor: Option<usize>,
}

impl<'a> Scheduler<'a> {
    pub const fn new() -> Self {
        Self {
            tasks: Vec::new(),
            cursor: None,
        }
    }

    /// Register a task for the life of the system.
    ///
    /// The ring takes the task by exclusive reference and never
    /// inspects or frees its state. There is no unregister: a task,
    /// once in, runs forever. Task context only; the borrow rules
    /// already forbid calling this while a turn is in progress.
    pub fn register(&mut self, task: &'a mut dyn Task) -> Result<(), Error> {
        self.tasks.push(task).map_err(|_| Error::CapacityExceeded)?;
        debug!("scheduler: task registered ({} in ring)", self.tasks.len());
        Ok(())
    }

    /// Run one turn: exactly one handler, then advance the cursor.
    ///
    /// An unset cursor resets to the head (the newest registration).
    /// Empty ring is a no-op. Returns whether a handler ran.
    ///
    /// The handler must not block; nothing here can detect or recover
    /// from one that does.
    pub fn run_turn(&mut self, bus: &MessageBus) -> bool {
        let cur = match self.cursor {
            Some(i) => i,
            None => match self.tasks.len() {
                0 => return false,
                n => n - 1,
            },
        };
        self.tasks[cur].run(bus);
        self.cursor = if cur == 0 { None } else { Some(cur - 1) };
        true
    }

    /// Number of registered tasks.
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }
}

impl<'a> Default for Scheduler<'a> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::RefCell;

    #[test]
    fn empty_ring_is_a_noop() {
        let bus = MessageBus::new();
        let mut sched = Scheduler::new();
        assert!(!sched.run_turn(&bus));
        assert_eq!(sched.task_count(), 0);
    }

    #[test]
    fn turns_visit_tasks_in_reverse_registration_order() {
        let bus = MessageBus::new();
        let log = RefCell::new(std::vec::Vec::new());

        let mut t1 = |_: &MessageBus| log.borrow_mut().push(1);
        let mut t2 = |_: &MessageBus| log.borrow_mut().push(2);
        let mut t3 = |_: &MessageBus| log.borrow_mut().push(3);

        let mut sched = Scheduler::new();
        sched.register(&mut t1).unwrap();
        sched.register(&mut t2).unwrap();
        sched.register(&mut t3).unwrap();

        // Two full cycles: reverse order, repeated identically.
        for _ in 0..6 {
            assert!(sched.run_turn(&bus));
        }
        assert_eq!(*log.borrow(), [3, 2, 1, 3, 2, 1]);
    }

    #[test]
    fn one_handler_per_turn() {
        let bus = MessageBus::new();
        let count = RefCell::new(0u32);

        let mut a = |_: &MessageBus| *count.borrow_mut() += 1;
        let mut b = |_: &MessageBus| *count.borrow_mut() += 1;

        let mut sched = Scheduler::new();
        sched.register(&mut a).unwrap();
        sched.register(&mut b).unwrap();

        sched.run_turn(&bus);
        assert_eq!(*count.borrow(), 1);
        sched.run_turn(&bus);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn late_registration_joins_on_the_next_wrap() {
        let bus = MessageBus::new();
        let log = RefCell::new(std::vec::Vec::new());

        let mut t1 = |_: &MessageBus| log.borrow_mut().push(1);
        let mut t2 = |_: &MessageBus| log.borrow_mut().push(2);
        let mut late = |_: &MessageBus| log.borrow_mut().push(9);

        let mut sched = Scheduler::new();
        sched.register(&mut t1).unwrap();
        sched.register(&mut t2).unwrap();

        // Mid-cycle: t2 has run, cursor sits on t1.
        sched.run_turn(&bus);
        sched.register(&mut late).unwrap();

        // Current cycle finishes undisturbed, then the new head runs.
        sched.run_turn(&bus);
        sched.run_turn(&bus);
        assert_eq!(*log.borrow(), [2, 1, 9]);
    }

    #[test]
    fn ring_capacity_is_enforced() {
        let mut tasks: [_; MAX_TASKS] = core::array::from_fn(|_| |_: &MessageBus| {});
        let mut extra = |_: &MessageBus| {};
        let mut sched = Scheduler::new();
        for t in tasks.iter_mut() {
            sched.register(t).unwrap();
        }
        assert_eq!(sched.task_count(), MAX_TASKS);

        assert_eq!(sched.register(&mut extra), Err(Error::CapacityExceeded));
    }
}
