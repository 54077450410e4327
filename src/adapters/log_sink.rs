//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC in production).  Telemetry snapshots are
//! rendered as single-line JSON so they can be scraped off the console.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => match serde_json::to_string(t) {
                Ok(json) => info!("TELEM | {json}"),
                Err(e) => warn!("TELEM | encode failed: {e}"),
            },
            AppEvent::Started(role) => {
                info!("START | role={role}");
            }
            AppEvent::SourceFresh(role) => {
                info!("PEER  | {role} fresh");
            }
            AppEvent::SourceStale(role) => {
                info!("PEER  | {role} stale");
            }
            AppEvent::ActuatorChanged { actuator, on } => {
                info!("OUT   | {actuator:?} -> {}", if *on { "ON" } else { "OFF" });
            }
            AppEvent::AggregateUnavailable => {
                info!("OUT   | no weighted sources, outputs held");
            }
        }
    }
}
