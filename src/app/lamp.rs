//! Lamp node service (Light role).
//!
//! The lamp node takes no part in climate control.  Each cycle it turns the
//! light on or off from the motion detector and broadcasts a Light frame
//! with the seconds since the last motion and the smoke level.

use log::info;

use crate::config::LampConfig;
use crate::control::hysteresis::Actuator;
use crate::error::{Error, Result};
use crate::protocol::{Frame, OccupancyFields, Role, RoleReading};
use crate::sensors::occupancy::OccupancyTracker;

use super::broadcaster::Broadcaster;
use super::events::AppEvent;
use super::ports::{ActuatorPort, EventSink, OccupancyPort, RadioLink};

pub struct LampService {
    config: LampConfig,
    tracker: OccupancyTracker,
    broadcaster: Broadcaster,
    last_frame: Option<Frame>,
    cycle: u64,
}

impl LampService {
    pub fn new(config: LampConfig) -> Result<Self> {
        if config.cycle_period_ms == 0 {
            return Err(Error::Config("lamp cycle period must be non-zero"));
        }
        Ok(Self {
            tracker: OccupancyTracker::new(&config),
            config,
            broadcaster: Broadcaster::new(Role::Light),
            last_frame: None,
            cycle: 0,
        })
    }

    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        hw.set_actuator(Actuator::Light, false);
        sink.emit(&AppEvent::Started(Role::Light));
        info!(
            "LampService started (cycle {} ms, light on for {} ms)",
            self.config.cycle_period_ms, self.config.light_on_time_ms
        );
    }

    /// One lamp cycle: motion → light → broadcast.
    pub fn tick(
        &mut self,
        hw: &mut (impl OccupancyPort + ActuatorPort),
        radio: &mut impl RadioLink,
        sink: &mut impl EventSink,
    ) {
        self.cycle += 1;

        let seen = hw.take_motion();
        let present = hw.motion_present();
        if let Some(on) = self.tracker.update(seen, present) {
            hw.set_actuator(Actuator::Light, on);
            sink.emit(&AppEvent::ActuatorChanged {
                actuator: Actuator::Light,
                on,
            });
        }

        let reading = RoleReading::Light(OccupancyFields {
            movement_secs: self.tracker.movement_secs(),
            smoke: (hw.read_smoke_ppm() / 10.0) as u8,
        });
        self.last_frame = Some(self.broadcaster.emit(&reading, radio));
    }

    pub fn light_on(&self) -> bool {
        self.tracker.light_on()
    }

    pub fn last_frame(&self) -> Option<Frame> {
        self.last_frame
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn frames_sent(&self) -> u32 {
        self.broadcaster.sent()
    }
}
