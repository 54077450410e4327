//! Interrupt-side frame mailbox.
//!
//! ```text
//! ┌──────────────┐  post(frame)   ┌──────────────────────┐  peek(role)  ┌─────────────┐
//! │ radio rx     │──────────────▶ │ FrameInbox           │ ───────────▶ │ SourceTable │
//! │ (producer)   │                │ [Slot; Role::COUNT]  │              │ (main loop) │
//! └──────────────┘                └──────────────────────┘              └─────────────┘
//! ```
//!
//! One slot per role holds the latest raw frame and a tally of frames
//! received from that role.  The pair is written and read inside a critical
//! section, so the control loop never sees a frame paired with the wrong
//! tally.  Only the latest frame is kept; the control loop runs far more
//! often than any single peer transmits something worth keeping.

use core::cell::Cell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;

use crate::protocol::{Frame, Role};

/// Latest frame from one role plus the number of frames received so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub frame: Frame,
    /// Wrapping count of frames posted for this role.
    pub received: u32,
}

impl Slot {
    pub const EMPTY: Self = Self {
        frame: Frame(0),
        received: 0,
    };
}

/// Per-role mailbox shared between the radio receive path and the control loop.
///
/// `const`-constructible so firmware can keep it in a `static`.
pub struct FrameInbox {
    slots: [CriticalSectionMutex<Cell<Slot>>; Role::COUNT],
}

impl FrameInbox {
    pub const fn new() -> Self {
        Self {
            slots: [const { CriticalSectionMutex::new(Cell::new(Slot::EMPTY)) }; Role::COUNT],
        }
    }

    /// Store a received frame.  Safe to call from the receive thread.
    ///
    /// Returns the role the frame was filed under.
    pub fn post(&self, frame: Frame) -> Role {
        let role = frame.role();
        self.slots[role.index()].lock(|cell| {
            let received = cell.get().received.wrapping_add(1);
            cell.set(Slot { frame, received });
        });
        role
    }

    /// Copy a role's slot out atomically.
    pub fn peek(&self, role: Role) -> Slot {
        self.slots[role.index()].lock(Cell::get)
    }
}

impl Default for FrameInbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static INBOX: FrameInbox = FrameInbox::new();

    #[test]
    fn post_files_by_address_and_counts() {
        let inbox = FrameInbox::new();
        assert_eq!(inbox.peek(Role::Window), Slot::EMPTY);

        assert_eq!(inbox.post(Frame(0x4000_1234)), Role::Window);
        assert_eq!(inbox.post(Frame(0x4000_5678)), Role::Window);
        assert_eq!(inbox.post(Frame(0xC000_0001)), Role::Interface);

        let w = inbox.peek(Role::Window);
        assert_eq!(w.frame, Frame(0x4000_5678));
        assert_eq!(w.received, 2);
        assert_eq!(inbox.peek(Role::Interface).received, 1);
        assert_eq!(inbox.peek(Role::Light), Slot::EMPTY);
    }

    #[test]
    fn usable_as_a_static_across_threads() {
        let producer = std::thread::spawn(|| {
            for i in 0..100 {
                INBOX.post(Frame(0x8000_0000 | i));
            }
        });
        producer.join().unwrap();
        let slot = INBOX.peek(Role::Light);
        assert_eq!(slot.received, 100);
        assert_eq!(slot.frame, Frame(0x8000_0000 | 99));
    }
}
