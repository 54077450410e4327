//! Radio frame protocol shared by every node in the mesh.
//!
//! A frame is one 32-bit word.  The top two bits address the sending
//! [`Role`]; the remaining 30 bits carry that role's fields in a fixed,
//! bit-packed layout (see [`codec`]).
//!
//! Payload structs hold values in **wire units** (e.g. temperature as
//! °C × 5) so that a decoded frame can be re-encoded bit-exactly.  The
//! `*_c()` / `*_pct()` / `*_ppm()` accessors convert to engineering units.

pub mod codec;

use core::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The four fixed node roles, identified on the wire by a 2-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Role {
    /// Controller node: climate sensors, heater and ventilation outputs.
    Electronic = 0,
    /// Window node: climate sensors plus a window-open contact.
    Window = 1,
    /// Light / occupancy node: motion timeout and smoke level.
    Light = 2,
    /// Interface node: display, setpoint entry, climate sensors.
    Interface = 3,
}

impl Role {
    /// Number of roles; sizes every per-role table.
    pub const COUNT: usize = 4;

    /// All roles in address order.
    pub const ALL: [Role; Role::COUNT] = [Role::Electronic, Role::Window, Role::Light, Role::Interface];

    /// Map a 2-bit address to its role.  Only the low two bits are used.
    pub const fn from_address(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Electronic,
            1 => Self::Window,
            2 => Self::Light,
            _ => Self::Interface,
        }
    }

    /// The 2-bit wire address.
    pub const fn address(self) -> u8 {
        self as u8
    }

    /// Index into per-role arrays.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Electronic => "electronic",
            Self::Window => "window",
            Self::Light => "light",
            Self::Interface => "interface",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One radio message: an opaque native-order 32-bit word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Frame(pub u32);

impl Frame {
    /// Sending role, from bits 31–30.
    pub const fn role(self) -> Role {
        Role::from_address((self.0 >> 30) as u8)
    }

    /// Byte order used on the air (fixed by the transceiver driver).
    pub const fn to_wire(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    pub const fn from_wire(bytes: [u8; 4]) -> Self {
        Self(u32::from_le_bytes(bytes))
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Per-role payloads (wire units)
// ---------------------------------------------------------------------------

/// Temperature, CO2, humidity and trust weight as carried by the
/// Electronic and Window roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClimateFields {
    /// °C × 5 (8 bits).
    pub temperature: u8,
    /// ppm / 10 (7 bits).
    pub co2: u8,
    /// % RH (7 bits).
    pub humidity: u8,
    /// Trust weight × 10 (8 bits).
    pub weight: u8,
}

impl ClimateFields {
    pub fn temperature_c(&self) -> f32 {
        f32::from(self.temperature) / 5.0
    }

    pub fn co2_ppm(&self) -> f32 {
        f32::from(self.co2) * 10.0
    }

    pub fn humidity_pct(&self) -> f32 {
        f32::from(self.humidity)
    }

    pub fn weight(&self) -> f32 {
        f32::from(self.weight) / 10.0
    }
}

/// Window node payload.
///
/// `open` shares bit 0 with the weight field on the wire; see
/// [`codec`] for how the overlap is reproduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowFields {
    pub climate: ClimateFields,
    pub open: bool,
}

/// Light / occupancy node payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OccupancyFields {
    /// Seconds since motion was last seen (16 bits).
    pub movement_secs: u16,
    /// Smoke level, ppm / 10 (8 bits).
    pub smoke: u8,
}

/// Interface node payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InterfaceFields {
    /// °C × 5 (8 bits).
    pub temperature: u8,
    /// Requested temperature, °C × 10 (6 bits on the wire).
    pub setpoint: u8,
    /// ppm / 10 (7 bits).
    pub co2: u8,
    /// % RH (7 bits).
    pub humidity: u8,
    /// Unscaled trust weight, 0–3 (2 bits).
    pub weight: u8,
}

impl InterfaceFields {
    pub fn temperature_c(&self) -> f32 {
        f32::from(self.temperature) / 5.0
    }

    pub fn setpoint_c(&self) -> f32 {
        f32::from(self.setpoint) / 10.0
    }

    pub fn co2_ppm(&self) -> f32 {
        f32::from(self.co2) * 10.0
    }

    pub fn humidity_pct(&self) -> f32 {
        f32::from(self.humidity)
    }

    pub fn weight(&self) -> f32 {
        f32::from(self.weight)
    }
}

// ---------------------------------------------------------------------------
// Tagged union
// ---------------------------------------------------------------------------

/// A decoded frame: role discriminant plus that role's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleReading {
    Electronic(ClimateFields),
    Window(WindowFields),
    Light(OccupancyFields),
    Interface(InterfaceFields),
}

impl RoleReading {
    pub const fn role(&self) -> Role {
        match self {
            Self::Electronic(_) => Role::Electronic,
            Self::Window(_) => Role::Window,
            Self::Light(_) => Role::Light,
            Self::Interface(_) => Role::Interface,
        }
    }

    /// The reading a role holds before its first frame and after it goes
    /// stale.
    ///
    /// Everything is zero (weight 0 excludes the role from fusion) except
    /// the Interface setpoint, which falls back to `default_setpoint`
    /// (°C × 10). A zero setpoint would read as "switch everything off".
    pub fn defaults(role: Role, default_setpoint: u8) -> Self {
        match role {
            Role::Electronic => Self::Electronic(ClimateFields::default()),
            Role::Window => Self::Window(WindowFields::default()),
            Role::Light => Self::Light(OccupancyFields::default()),
            Role::Interface => Self::Interface(InterfaceFields {
                setpoint: default_setpoint,
                ..InterfaceFields::default()
            }),
        }
    }
}
