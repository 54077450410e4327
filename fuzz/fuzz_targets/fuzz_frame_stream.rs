//! Fuzz target: raw radio payloads through the inbox and source table.
//!
//! Splits the input into 4-byte wire frames, posts each one as the receive
//! path would and ages the table after every frame.  Decoding must never
//! panic, re-encoding must reproduce the meaningful bits, and no peer may
//! sit at or beyond the staleness bound.
//!
//! cargo fuzz run fuzz_frame_stream

#![no_main]

use homemesh::protocol::Frame;
use homemesh::protocol::codec::{decode, encode, used_bits};
use homemesh::protocol::Role;
use homemesh::sources::{FrameInbox, SourceTable};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&bound, rest)) = data.split_first() else {
        return;
    };
    let value_reset = u16::from(bound % 16) + 1;

    let inbox = FrameInbox::new();
    let mut table = SourceTable::new(Role::Window, value_reset, 200);

    for chunk in rest.chunks(4) {
        // A short tail is an empty cycle: nothing received.
        if let Ok(bytes) = <[u8; 4]>::try_from(chunk) {
            let frame = Frame::from_wire(bytes);
            let reading = decode(frame);
            assert_eq!(encode(&reading).0, frame.0 & used_bits(frame.role()));
            inbox.post(frame);
        }
        table.age(&inbox);
        for (_, entry) in table.peers() {
            assert!(entry.stale_cycles() < value_reset);
        }
    }
});
