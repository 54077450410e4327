//! Peer source table and its staleness state machine.
//!
//! Each peer role is either **Fresh** (a frame arrived within the last
//! `value_reset` cycles) or **Stale** (silent for `value_reset` cycles; its
//! reading has been replaced by role defaults).
//!
//! ```text
//!              new frame                      new frame
//!            ┌──────────┐                  ┌─────────────┐
//!            ▼          │                  │             ▼
//!        ┌───────┐ ─────┘   value_reset   ┌───────┐  ┌───────┐
//!  boot ▶│ Stale │ ◀───── silent cycles ── │ Fresh │  │ Fresh │
//!        └───────┘ ────── new frame ─────▶ └───────┘  └───────┘
//! ```
//!
//! Freshness is detected by comparing the inbox tally for a role against the
//! tally captured on the previous cycle.  A difference means a frame arrived
//! (decode it, reset the stale count, remember the new tally); equality
//! means silence (count it, and at the bound apply defaults and restart the
//! count so a reconnecting peer is not flagged again straight away).
//!
//! The table is owned by the control loop; only [`FrameInbox`] is shared
//! with the receive thread.

pub mod inbox;

use heapless::Vec;
use log::{info, warn};
use serde::Serialize;

use crate::protocol::codec;
use crate::protocol::{Role, RoleReading};
pub use inbox::{FrameInbox, Slot};

/// Staleness state of one peer role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Freshness {
    Fresh,
    Stale,
}

/// Last-known state of one role.
#[derive(Debug, Clone, Copy)]
pub struct SourceEntry {
    reading: RoleReading,
    /// Inbox tally observed at the previous cycle.
    seen: u32,
    stale_cycles: u16,
    freshness: Freshness,
}

impl SourceEntry {
    pub fn reading(&self) -> &RoleReading {
        &self.reading
    }

    pub fn freshness(&self) -> Freshness {
        self.freshness
    }

    /// Consecutive cycles without a new frame.
    pub fn stale_cycles(&self) -> u16 {
        self.stale_cycles
    }
}

/// A role changed freshness during [`SourceTable::age`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub role: Role,
    pub to: Freshness,
}

/// Fixed table of peer readings, indexed by role.
pub struct SourceTable {
    local: Role,
    value_reset: u16,
    default_setpoint: u8,
    entries: [SourceEntry; Role::COUNT],
}

impl SourceTable {
    /// Build a table for a node transmitting as `local`.  Every entry starts
    /// Stale, holding its role defaults.
    pub fn new(local: Role, value_reset: u16, default_setpoint: u8) -> Self {
        let entries = Role::ALL.map(|role| SourceEntry {
            reading: RoleReading::defaults(role, default_setpoint),
            seen: 0,
            stale_cycles: 0,
            freshness: Freshness::Stale,
        });
        Self {
            local,
            value_reset: value_reset.max(1),
            default_setpoint,
            entries,
        }
    }

    /// Run one control cycle of staleness bookkeeping for every peer.
    ///
    /// Returns the roles whose freshness changed this cycle.
    pub fn age(&mut self, inbox: &FrameInbox) -> Vec<Transition, { Role::COUNT }> {
        let local = self.local;
        // At most one transition per peer, which fits the capacity.
        Role::ALL
            .into_iter()
            .filter(|role| *role != local)
            .filter_map(|role| self.observe(role, inbox.peek(role)).map(|to| Transition { role, to }))
            .collect()
    }

    /// Apply one cycle of bookkeeping to `role` given its current inbox slot.
    fn observe(&mut self, role: Role, slot: Slot) -> Option<Freshness> {
        let value_reset = self.value_reset;
        let default_setpoint = self.default_setpoint;
        let entry = &mut self.entries[role.index()];

        if slot.received != entry.seen {
            entry.seen = slot.received;
            entry.reading = codec::decode(slot.frame);
            entry.stale_cycles = 0;
            if entry.freshness == Freshness::Stale {
                entry.freshness = Freshness::Fresh;
                info!("SOURCE | {role} fresh ({})", slot.frame);
                return Some(Freshness::Fresh);
            }
            return None;
        }

        entry.stale_cycles = entry.stale_cycles.saturating_add(1);
        if entry.stale_cycles < value_reset {
            return None;
        }

        entry.reading = RoleReading::defaults(role, default_setpoint);
        entry.stale_cycles = 0;
        if entry.freshness == Freshness::Fresh {
            entry.freshness = Freshness::Stale;
            warn!("SOURCE | {role} stale after {value_reset} silent cycles, defaults applied");
            return Some(Freshness::Stale);
        }
        None
    }

    pub fn entry(&self, role: Role) -> &SourceEntry {
        &self.entries[role.index()]
    }

    pub fn reading(&self, role: Role) -> &RoleReading {
        &self.entries[role.index()].reading
    }

    pub fn freshness(&self, role: Role) -> Freshness {
        self.entries[role.index()].freshness
    }

    /// Entries for every role except the local one.
    pub fn peers(&self) -> impl Iterator<Item = (Role, &SourceEntry)> {
        Role::ALL
            .into_iter()
            .filter(move |r| *r != self.local)
            .map(move |r| (r, &self.entries[r.index()]))
    }
}
