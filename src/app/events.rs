//! Outbound application events.
//!
//! The services emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them.

use heapless::Vec;
use serde::Serialize;

use crate::control::fusion::Aggregate;
use crate::control::hysteresis::Actuator;
use crate::protocol::Role;
use crate::sources::Freshness;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A service has started (carries the role it transmits as).
    Started(Role),

    /// A peer role delivered its first frame after being stale.
    SourceFresh(Role),

    /// A peer role went silent and was reset to defaults.
    SourceStale(Role),

    /// An output was switched.
    ActuatorChanged { actuator: Actuator, on: bool },

    /// No source carries weight; outputs are held.  Emitted once per run
    /// of such cycles.
    AggregateUnavailable,

    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),
}

/// Freshness of one peer at telemetry time.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SourceStatus {
    pub role: Role,
    pub freshness: Freshness,
    pub stale_cycles: u16,
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryData {
    pub cycle: u64,
    pub role: Role,
    pub aggregate: Option<Aggregate>,
    pub heating: bool,
    pub ventilation: bool,
    pub frames_sent: u32,
    pub send_failures: u32,
    pub sources: Vec<SourceStatus, { Role::COUNT }>,
}
