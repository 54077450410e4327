//! ESP-IDF runtime provider for the `critical-section` crate.
//!
//! The frame inbox and the radio broadcast take critical sections, and the
//! firmware binary has to supply the implementation.  Both users run on
//! FreeRTOS threads (the receive thread and the control loop), never inside
//! an ISR, so the section is a process-wide mutex rather than an interrupt
//! mask: GPIO edge interrupts keep being serviced while a send polls the
//! transceiver.  Nested entry on the same thread is counted.

use core::cell::{Cell, RefCell};
use std::sync::{Mutex, MutexGuard, PoisonError};

static SECTION: Mutex<()> = Mutex::new(());

thread_local! {
    static DEPTH: Cell<u8> = const { Cell::new(0) };
    static GUARD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
}

/// Enter the section, blocking while another thread holds it.
///
/// Returns the nesting depth on the calling thread.
pub fn enter() -> u8 {
    DEPTH.with(|depth| {
        let d = depth.get();
        if d == 0 {
            // The mutex guards no data, so a poisoned lock is still usable.
            let lock = SECTION.lock().unwrap_or_else(PoisonError::into_inner);
            GUARD.with(|guard| *guard.borrow_mut() = Some(lock));
        }
        let d = d.saturating_add(1);
        depth.set(d);
        d
    })
}

/// Leave one level of the section; the lock is released at depth 0.
///
/// Returns the remaining depth.  An unbalanced call is ignored.
pub fn exit() -> u8 {
    DEPTH.with(|depth| {
        let d = depth.get();
        if d == 0 {
            return 0;
        }
        let d = d - 1;
        depth.set(d);
        if d == 0 {
            GUARD.with(|guard| *guard.borrow_mut() = None);
        }
        d
    })
}

#[cfg(target_os = "espidf")]
struct EspCriticalSection;

#[cfg(target_os = "espidf")]
critical_section::set_impl!(EspCriticalSection);

#[cfg(target_os = "espidf")]
// SAFETY: `enter`/`exit` give mutual exclusion between threads and count
// re-entry, which is all the users in this crate rely on.
unsafe impl critical_section::Impl for EspCriticalSection {
    // The restore state is the nesting depth (`restore-state-u8`).
    unsafe fn acquire() -> critical_section::RawRestoreState {
        enter()
    }

    unsafe fn release(_depth: critical_section::RawRestoreState) {
        exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn section_is_reentrant_and_excludes_other_threads() {
        assert_eq!(enter(), 1);
        assert_eq!(enter(), 2);
        assert_eq!(exit(), 1);
        assert!(SECTION.try_lock().is_err(), "still held after inner exit");

        let (tx, rx) = mpsc::channel();
        let other = std::thread::spawn(move || {
            enter();
            tx.send(()).unwrap();
            exit();
        });
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err(), "entered while held");

        assert_eq!(exit(), 0);
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        other.join().unwrap();

        assert!(SECTION.try_lock().is_ok());
        assert_eq!(exit(), 0, "unbalanced exit is ignored");
    }
}
