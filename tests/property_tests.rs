//! Property tests for the frame codec, fusion and peer staleness.
//!
//! Runs on host (x86_64) only; proptest is not available for ESP32 targets.

#![cfg(not(target_os = "espidf"))]

use homemesh::control::fusion::{WeightedSample, fuse};
use homemesh::protocol::codec::{decode, encode, used_bits};
use homemesh::protocol::{ClimateFields, Frame, InterfaceFields, OccupancyFields, Role, RoleReading};
use homemesh::sources::{FrameInbox, SourceTable};
use proptest::prelude::*;

// ── Codec ─────────────────────────────────────────────────────

proptest! {
    /// Decoding then re-encoding any word reproduces every meaningful bit.
    #[test]
    fn decode_encode_preserves_used_bits(w in any::<u32>()) {
        let frame = Frame(w);
        let again = encode(&decode(frame));
        prop_assert_eq!(again.0, w & used_bits(frame.role()));
    }

    #[test]
    fn climate_fields_survive_the_wire(
        temperature in any::<u8>(),
        co2 in 0u8..128,
        humidity in 0u8..128,
        weight in any::<u8>(),
    ) {
        let reading = RoleReading::Electronic(ClimateFields { temperature, co2, humidity, weight });
        prop_assert_eq!(decode(encode(&reading)), reading);
    }

    #[test]
    fn interface_fields_survive_the_wire(
        temperature in any::<u8>(),
        setpoint in 0u8..64,
        co2 in 0u8..128,
        humidity in 0u8..128,
        weight in 0u8..4,
    ) {
        let reading = RoleReading::Interface(InterfaceFields { temperature, setpoint, co2, humidity, weight });
        prop_assert_eq!(decode(encode(&reading)), reading);
    }

    #[test]
    fn light_frames_leave_reserved_bits_clear(movement_secs in any::<u16>(), smoke in any::<u8>()) {
        let frame = encode(&RoleReading::Light(OccupancyFields { movement_secs, smoke }));
        prop_assert_eq!(frame.role(), Role::Light);
        prop_assert_eq!(frame.0 & 0x3F00_0000, 0);
    }

    #[test]
    fn wire_bytes_are_little_endian(w in any::<u32>()) {
        let frame = Frame(w);
        prop_assert_eq!(frame.to_wire()[0], w as u8);
        prop_assert_eq!(Frame::from_wire(frame.to_wire()), frame);
    }
}

// ── Fusion ────────────────────────────────────────────────────

fn sample() -> impl Strategy<Value = WeightedSample> {
    (0.0f32..60.0, 0.0f32..100.0, 0.0f32..2000.0, 0.0f32..25.5).prop_map(
        |(temperature_c, humidity_pct, co2_ppm, weight)| WeightedSample {
            temperature_c,
            humidity_pct,
            co2_ppm,
            weight,
        },
    )
}

proptest! {
    #[test]
    fn fusion_ignores_source_order(
        (samples, shuffled) in proptest::collection::vec(sample(), 1..8)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle())),
    ) {
        let original = fuse(samples.iter().copied());
        let permuted = fuse(shuffled.iter().copied());
        match (original, permuted) {
            (Some(a), Some(b)) => {
                prop_assert!((a.temperature_c - b.temperature_c).abs() < 1e-3);
                prop_assert!((a.humidity_pct - b.humidity_pct).abs() < 1e-3);
                prop_assert!((a.co2_ppm - b.co2_ppm).abs() < 1e-2);
            }
            (None, None) => {}
            _ => prop_assert!(false, "availability depends on order"),
        }
    }

    #[test]
    fn aggregate_stays_within_contributing_values(samples in proptest::collection::vec(sample(), 1..8)) {
        let weighted: Vec<_> = samples.iter().filter(|s| s.weight > 0.0).collect();
        match fuse(samples.iter().copied()) {
            None => prop_assert!(weighted.is_empty()),
            Some(agg) => {
                let lo = weighted.iter().map(|s| s.temperature_c).fold(f32::INFINITY, f32::min);
                let hi = weighted.iter().map(|s| s.temperature_c).fold(f32::NEG_INFINITY, f32::max);
                prop_assert!(agg.temperature_c >= lo - 1e-3 && agg.temperature_c <= hi + 1e-3);
            }
        }
    }
}

// ── Staleness ─────────────────────────────────────────────────

proptest! {
    /// Whatever the arrival pattern, no peer's silent-cycle count ever
    /// reaches the reset bound.
    #[test]
    fn stale_cycles_stay_below_the_bound(
        value_reset in 1u16..20,
        arrivals in proptest::collection::vec(proptest::option::of(any::<u32>()), 1..100),
    ) {
        let inbox = FrameInbox::new();
        let mut table = SourceTable::new(Role::Electronic, value_reset, 200);
        for arrival in arrivals {
            if let Some(w) = arrival {
                inbox.post(Frame(w));
            }
            table.age(&inbox);
            for (_, entry) in table.peers() {
                prop_assert!(entry.stale_cycles() < value_reset);
            }
        }
    }
}
