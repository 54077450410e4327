//! Controller node service, the hexagonal core.
//!
//! [`NodeService`] owns the peer source table, the climate controller and
//! the broadcaster.  All I/O flows through port traits injected at call
//! sites, so the whole cycle runs against mock adapters on the host.
//!
//! ```text
//!  FrameInbox ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!  SensorPort ──▶ │       NodeService        │
//! ActuatorPort ◀──│ sources · fusion · hyst. │ ──▶ RadioLink
//!                 └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::NodeConfig;
use crate::control::fusion::{self, Aggregate};
use crate::control::hysteresis::{Actuator, ActuatorState, ClimateController, Thresholds};
use crate::error::Result;
use crate::protocol::Frame;
use crate::sources::{FrameInbox, Freshness, SourceTable};

use super::broadcaster::{Broadcaster, controller_reading};
use super::events::{AppEvent, SourceStatus, TelemetryData};
use super::ports::{ActuatorPort, EventSink, RadioLink, SensorPort};

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

/// Orchestrates one controller node (Electronic or Window role).
pub struct NodeService<'a> {
    config: NodeConfig,
    inbox: &'a FrameInbox,
    sources: SourceTable,
    controller: ClimateController,
    broadcaster: Broadcaster,
    aggregate: Option<Aggregate>,
    last_frame: Option<Frame>,
    cycle: u64,
    /// Set while consecutive cycles have no aggregate.
    aggregate_missing: bool,
}

impl<'a> NodeService<'a> {
    /// Construct the service.  `inbox` is the table the receive interrupt
    /// posts peer frames into.
    pub fn new(config: NodeConfig, inbox: &'a FrameInbox) -> Result<Self> {
        config.validate()?;
        let sources = SourceTable::new(config.role, config.value_reset, config.default_setpoint());
        let controller = ClimateController::new(Thresholds::from_config(&config));
        let broadcaster = Broadcaster::new(config.role);
        Ok(Self {
            config,
            inbox,
            sources,
            controller,
            broadcaster,
            aggregate: None,
            last_frame: None,
            cycle: 0,
            aggregate_missing: false,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive every output to its power-on state (off) and announce the node.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.set_actuator(Actuator::Heater, false);
        hw.set_actuator(Actuator::Ventilation, false);
        sink.emit(&AppEvent::Started(self.config.role));
        info!(
            "NodeService started as {} (cycle {} ms, stale after {} cycles)",
            self.config.role, self.config.cycle_period_ms, self.config.value_reset
        );
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run one full control cycle:
    /// read local → age peers → fuse → hysteresis → actuators → broadcast.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`], which avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        hw: &mut (impl SensorPort + ActuatorPort),
        radio: &mut impl RadioLink,
        sink: &mut impl EventSink,
    ) {
        self.cycle += 1;

        // 1. Local sensors, trusted at the configured weight
        let mut local = hw.read_current();
        local.weight = self.config.sensor_weight;

        // 2. Peer staleness
        for t in self.sources.age(self.inbox) {
            sink.emit(&match t.to {
                Freshness::Fresh => AppEvent::SourceFresh(t.role),
                Freshness::Stale => AppEvent::SourceStale(t.role),
            });
        }

        // 3. Fusion
        self.aggregate = fusion::compute(local.sample(), &self.sources);
        match (self.aggregate.is_some(), self.aggregate_missing) {
            (false, false) => {
                warn!("CONTROL | no source carries weight, holding outputs");
                sink.emit(&AppEvent::AggregateUnavailable);
                self.aggregate_missing = true;
            }
            (true, true) => {
                info!("CONTROL | aggregate available again");
                self.aggregate_missing = false;
            }
            _ => {}
        }

        // 4. Hysteresis → ActuatorPort
        for (actuator, on) in self.controller.evaluate(self.aggregate.as_ref()) {
            hw.set_actuator(actuator, on);
            sink.emit(&AppEvent::ActuatorChanged { actuator, on });
        }

        // 5. Broadcast own reading
        let reading = controller_reading(self.config.role, &local);
        self.last_frame = Some(self.broadcaster.emit(&reading, radio));

        // 6. Periodic telemetry
        let every = u64::from(self.config.telemetry_every);
        if every > 0 && self.cycle % every == 0 {
            sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot of the most recent cycle.
    pub fn build_telemetry(&self) -> TelemetryData {
        let state = self.controller.state();
        // Role::COUNT - 1 peers into a Role::COUNT table.
        let sources = self
            .sources
            .peers()
            .map(|(role, entry)| SourceStatus {
                role,
                freshness: entry.freshness(),
                stale_cycles: entry.stale_cycles(),
            })
            .collect();
        TelemetryData {
            cycle: self.cycle,
            role: self.config.role,
            aggregate: self.aggregate,
            heating: state.heating,
            ventilation: state.ventilation,
            frames_sent: self.broadcaster.sent(),
            send_failures: self.broadcaster.failed(),
            sources,
        }
    }

    /// Current heater / ventilation outputs.
    pub fn state(&self) -> ActuatorState {
        self.controller.state()
    }

    /// Aggregate computed by the last cycle (`None` before the first cycle or
    /// when nothing carried weight).
    pub fn aggregate(&self) -> Option<Aggregate> {
        self.aggregate
    }

    /// Frame broadcast by the last cycle.
    pub fn last_frame(&self) -> Option<Frame> {
        self.last_frame
    }

    pub fn sources(&self) -> &SourceTable {
        &self.sources
    }

    /// Control cycles executed since startup.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}
