//! Global interrupt gate.
//!
//! Critical sections bracket task-context access to state that an
//! interrupt handler also touches. The gate nests: a depth counter
//! makes sure an inner `enable_all` cannot unmask interrupts for an
//! enclosing section.
//!
//! The registration tables of the scheduler and bus are task-context
//! data and never need this; it exists for collaborators' shared state
//! (a status byte written from an ISR, and the like).

use core::sync::atomic::{AtomicU32, Ordering};

static DEPTH: AtomicU32 = AtomicU32::new(0);

/// Mask the processor's global interrupt line.
///
/// Calls nest; interrupts stay masked until the matching
/// [`enable_all`].
pub fn disable_all() {
    if DEPTH.fetch_add(1, Ordering::SeqCst) == 0 {
        arch_disable();
    }
}

/// Undo one [`disable_all`]. Only the outermost call unmasks.
pub fn enable_all() {
    // Check before decrementing: an unbalanced call must not wrap the
    // counter and leave the gate masked forever.
    let depth = DEPTH.load(Ordering::SeqCst);
    debug_assert!(depth != 0, "enable_all without matching disable_all");
    if depth == 0 {
        return;
    }
    if DEPTH.fetch_sub(1, Ordering::SeqCst) == 1 {
        arch_enable();
    }
}

/// Are interrupts currently masked by this gate?
pub fn masked() -> bool {
    DEPTH.load(Ordering::SeqCst) != 0
}

/// Run `f` inside a critical section.
pub fn free<R>(f: impl FnOnce() -> R) -> R {
    disable_all();
    let r = f();
    enable_all();
    r
}

#[cfg(all(feature = "cortex-m", target_arch = "arm"))]
fn arch_disable() {
    unsafe { core::arch::asm!("cpsid i", options(nomem, nostack, preserves_flags)) };
}

#[cfg(all(feature = "cortex-m", target_arch = "arm"))]
fn arch_enable() {
    unsafe { core::arch::asm!("cpsie i", options(nomem, nostack, preserves_flags)) };
}

#[cfg(all(feature = "riscv", any(target_arch = "riscv32", target_arch = "riscv64")))]
fn arch_disable() {
    unsafe { core::arch::asm!("csrci mstatus, 0x8", options(nomem, nostack)) };
}

#[cfg(all(feature = "riscv", any(target_arch = "riscv32", target_arch = "riscv64")))]
fn arch_enable() {
    unsafe { core::arch::asm!("csrsi mstatus, 0x8", options(nomem, nostack)) };
}

// Host build: the software depth counter is the whole gate.
#[cfg(not(any(
    all(feature = "cortex-m", target_arch = "arm"),
    all(feature = "riscv", any(target_arch = "riscv32", target_arch = "riscv64"))
)))]
fn arch_disable() {}

#[cfg(not(any(
    all(feature = "cortex-m", target_arch = "arm"),
    all(feature = "riscv", any(target_arch = "riscv32", target_arch = "riscv64"))
)))]
fn arch_enable() {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // The mask depth is process-global; serialize the tests that use it.
    static GATE: Mutex<()> = Mutex::new(());

    #[test]
    fn disable_enable_round_trip() {
        let _gate = GATE.lock().unwrap();
        assert!(!masked());
        disable_all();
        assert!(masked());
        enable_all();
        assert!(!masked());
    }

    #[test]
    fn nested_sections_stay_masked() {
        let _gate = GATE.lock().unwrap();
        disable_all();
        disable_all();
        enable_all();
        // Inner enable must not unmask the outer section.
        assert!(masked());
        enable_all();
        assert!(!masked());
    }

    #[test]
    fn free_brackets_the_closure() {
        let _gate = GATE.lock().unwrap();
        let was_masked = free(masked);
        assert!(was_masked);
        assert!(!masked());
    }

    #[test]
    fn unbalanced_enable_asserts_and_leaves_the_counter_alone() {
        let _gate = GATE.lock().unwrap();
        // Caught here so the panic cannot poison the test lock.
        let unbalanced = std::panic::catch_unwind(|| enable_all());
        assert!(unbalanced.is_err());
        // The counter must not have wrapped; the gate still works.
        assert!(!masked());
        disable_all();
        assert!(masked());
        enable_all();
        assert!(!masked());
    }
}
