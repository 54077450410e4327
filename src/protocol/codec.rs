//! Bit-packed frame codec.
//!
//! Wire layout (bit 31 = MSB):
//! ```text
//!  31 30 29                                                        0
//! ┌─────┬──────────────────────────────────────────────────────────┐
//! │ addr│ role payload                                             │
//! └─────┴──────────────────────────────────────────────────────────┘
//!
//!  Electronic / Window   temp 29–22 │ CO2 21–15 │ hum 14–8 │ weight 7–0
//!  Window only           open 0  (shares bit 0 with weight)
//!  Light                 reserved 29–24 │ movement 23–8 │ smoke 7–0
//!  Interface             temp 29–22 │ setpoint 21–16 │ CO2 15–9 │ hum 8–2 │ weight 1–0
//! ```
//!
//! Encoding silently drops the top bits of a value wider than its field.
//! Decoding never fails: a corrupt word decodes to garbage fields that the
//! staleness machinery later overwrites.

use super::{ClimateFields, Frame, InterfaceFields, OccupancyFields, Role, RoleReading, WindowFields};

/// A contiguous bit range inside the 32-bit frame.
#[derive(Debug, Clone, Copy)]
struct Field {
    lsb: u32,
    width: u32,
}

impl Field {
    const fn bits(msb: u32, lsb: u32) -> Self {
        Self {
            lsb,
            width: msb - lsb + 1,
        }
    }

    const fn mask(self) -> u32 {
        (((1u64 << self.width) - 1) as u32) << self.lsb
    }

    const fn get(self, word: u32) -> u32 {
        (word & self.mask()) >> self.lsb
    }

    /// Place `value` in the field; bits above the field width are dropped.
    const fn put(self, value: u32) -> u32 {
        (value << self.lsb) & self.mask()
    }
}

const ADDRESS: Field = Field::bits(31, 30);

const CLIMATE_TEMPERATURE: Field = Field::bits(29, 22);
const CLIMATE_CO2: Field = Field::bits(21, 15);
const CLIMATE_HUMIDITY: Field = Field::bits(14, 8);
const CLIMATE_WEIGHT: Field = Field::bits(7, 0);
const WINDOW_OPEN: Field = Field::bits(0, 0);

const LIGHT_MOVEMENT: Field = Field::bits(23, 8);
const LIGHT_SMOKE: Field = Field::bits(7, 0);

const IFACE_TEMPERATURE: Field = Field::bits(29, 22);
const IFACE_SETPOINT: Field = Field::bits(21, 16);
const IFACE_CO2: Field = Field::bits(15, 9);
const IFACE_HUMIDITY: Field = Field::bits(8, 2);
const IFACE_WEIGHT: Field = Field::bits(1, 0);

/// Pack a reading into a frame addressed from its role.
pub fn encode(reading: &RoleReading) -> Frame {
    let address = ADDRESS.put(u32::from(reading.role().address()));
    let payload = match reading {
        RoleReading::Electronic(c) => encode_climate(c),
        // The open flag is OR-ed into the low weight bit.
        RoleReading::Window(w) => encode_climate(&w.climate) | WINDOW_OPEN.put(u32::from(w.open)),
        RoleReading::Light(o) => {
            LIGHT_MOVEMENT.put(u32::from(o.movement_secs)) | LIGHT_SMOKE.put(u32::from(o.smoke))
        }
        RoleReading::Interface(i) => {
            IFACE_TEMPERATURE.put(u32::from(i.temperature))
                | IFACE_SETPOINT.put(u32::from(i.setpoint))
                | IFACE_CO2.put(u32::from(i.co2))
                | IFACE_HUMIDITY.put(u32::from(i.humidity))
                | IFACE_WEIGHT.put(u32::from(i.weight))
        }
    };
    Frame(address | payload)
}

/// Unpack any 32-bit word.  Never fails.
pub fn decode(frame: Frame) -> RoleReading {
    let w = frame.0;
    match frame.role() {
        Role::Electronic => RoleReading::Electronic(decode_climate(w)),
        Role::Window => RoleReading::Window(WindowFields {
            climate: decode_climate(w),
            open: WINDOW_OPEN.get(w) == 1,
        }),
        Role::Light => RoleReading::Light(OccupancyFields {
            movement_secs: LIGHT_MOVEMENT.get(w) as u16,
            smoke: LIGHT_SMOKE.get(w) as u8,
        }),
        Role::Interface => RoleReading::Interface(InterfaceFields {
            temperature: IFACE_TEMPERATURE.get(w) as u8,
            setpoint: IFACE_SETPOINT.get(w) as u8,
            co2: IFACE_CO2.get(w) as u8,
            humidity: IFACE_HUMIDITY.get(w) as u8,
            weight: IFACE_WEIGHT.get(w) as u8,
        }),
    }
}

/// Bits of a frame that carry information for `role` (address included).
/// Reserved bits are zero in the mask.
pub const fn used_bits(role: Role) -> u32 {
    match role {
        Role::Light => ADDRESS.mask() | LIGHT_MOVEMENT.mask() | LIGHT_SMOKE.mask(),
        Role::Electronic | Role::Window | Role::Interface => u32::MAX,
    }
}

fn encode_climate(c: &ClimateFields) -> u32 {
    CLIMATE_TEMPERATURE.put(u32::from(c.temperature))
        | CLIMATE_CO2.put(u32::from(c.co2))
        | CLIMATE_HUMIDITY.put(u32::from(c.humidity))
        | CLIMATE_WEIGHT.put(u32::from(c.weight))
}

fn decode_climate(w: u32) -> ClimateFields {
    ClimateFields {
        temperature: CLIMATE_TEMPERATURE.get(w) as u8,
        co2: CLIMATE_CO2.get(w) as u8,
        humidity: CLIMATE_HUMIDITY.get(w) as u8,
        weight: CLIMATE_WEIGHT.get(w) as u8,
    }
}
