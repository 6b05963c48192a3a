//! Task handlers — long-lived cooperative work units.
//!
//! A task is whatever type holds the state a handler needs across
//! turns: a driver's debounce machine, a control loop's timers. The
//! scheduler takes the task by exclusive reference at registration and
//! never inspects or frees it.

use crate::bus::MessageBus;

/// A registered task handler.
///
/// `run` is invoked once per scheduler turn, in task context. It must
/// return promptly: there is no preemption, so a handler that blocks
/// halts the whole system. Handlers communicate with the rest of the
/// firmware by publishing on the bus and by polling their own timers.
pub trait Task {
    fn run(&mut self, bus: &MessageBus);
}

/// Closures over their captured state are tasks.
impl<F> Task for F
where
    F: FnMut(&MessageBus),
{
    fn run(&mut self, bus: &MessageBus) {
        self(bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_is_a_task() {
        let mut calls = 0u32;
        let bus = MessageBus::new();
        {
            let mut t = |_: &MessageBus| calls += 1;
            let task: &mut dyn Task = &mut t;
            task.run(&bus);
            task.run(&bus);
        }
        assert_eq!(calls, 2);
    }
}
