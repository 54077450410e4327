//! Integration tests for the NodeService cycle:
//! inbox → source table → fusion → hysteresis → actuators → broadcast.

use super::mock_hw::{LogSink, MockHardware, MockRadio};

use homemesh::app::events::AppEvent;
use homemesh::app::service::NodeService;
use homemesh::config::NodeConfig;
use homemesh::control::hysteresis::Actuator;
use homemesh::protocol::codec;
use homemesh::protocol::{ClimateFields, Frame, OccupancyFields, Role, RoleReading, WindowFields};
use homemesh::sources::{FrameInbox, Freshness};

fn window_frame(temperature: u8, weight: u8) -> Frame {
    codec::encode(&RoleReading::Window(WindowFields {
        climate: ClimateFields {
            temperature,
            co2: 40,
            humidity: 50,
            weight,
        },
        open: false,
    }))
}

fn started(config: NodeConfig, inbox: &FrameInbox) -> (NodeService<'_>, MockHardware, LogSink) {
    let mut app = NodeService::new(config, inbox).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

#[test]
fn start_drives_outputs_off_and_announces_role() {
    let inbox = FrameInbox::new();
    let (app, hw, sink) = started(NodeConfig::default(), &inbox);

    assert_eq!(hw.calls, [(Actuator::Heater, false), (Actuator::Ventilation, false)]);
    assert!(matches!(sink.events[..], [AppEvent::Started(Role::Electronic)]));
    assert_eq!(app.cycle(), 0);
}

#[test]
fn cold_local_reading_switches_heater_on() {
    let inbox = FrameInbox::new();
    let (mut app, mut hw, mut sink) = started(NodeConfig::default(), &inbox);
    let mut radio = MockRadio::new();

    hw.reading.temperature_c = 17.0;
    app.tick(&mut hw, &mut radio, &mut sink);

    assert!(hw.is_on(Actuator::Heater));
    assert!(app.state().heating);
    assert_eq!(
        sink.count(|e| matches!(
            e,
            AppEvent::ActuatorChanged {
                actuator: Actuator::Heater,
                on: true
            }
        )),
        1
    );
}

#[test]
fn fresh_peer_pulls_the_aggregate() {
    let inbox = FrameInbox::new();
    let (mut app, mut hw, mut sink) = started(NodeConfig::default(), &inbox);
    let mut radio = MockRadio::new();

    // Local 19 °C is inside the band; a heavy 15 °C peer drags it below.
    inbox.post(window_frame(75, 100));
    app.tick(&mut hw, &mut radio, &mut sink);

    let agg = app.aggregate().unwrap();
    assert!((agg.temperature_c - 15.52).abs() < 0.01, "{}", agg.temperature_c);
    assert!(hw.is_on(Actuator::Heater));
    assert_eq!(app.sources().freshness(Role::Window), Freshness::Fresh);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SourceFresh(Role::Window))), 1);
}

#[test]
fn silent_peer_goes_stale_and_stops_counting() {
    let inbox = FrameInbox::new();
    let config = NodeConfig {
        value_reset: 3,
        ..NodeConfig::default()
    };
    let (mut app, mut hw, mut sink) = started(config, &inbox);
    let mut radio = MockRadio::new();

    inbox.post(window_frame(75, 100));
    for _ in 0..3 {
        app.tick(&mut hw, &mut radio, &mut sink);
        assert_eq!(app.sources().freshness(Role::Window), Freshness::Fresh);
    }
    app.tick(&mut hw, &mut radio, &mut sink);

    assert_eq!(app.sources().freshness(Role::Window), Freshness::Stale);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::SourceStale(Role::Window))), 1);
    let agg = app.aggregate().unwrap();
    assert!((agg.temperature_c - 19.0).abs() < 1e-4, "only the local sensor is left");
    // 19 °C is inside the band: the heater switched on by the peer is held.
    assert!(app.state().heating);
}

#[test]
fn zero_weight_everywhere_holds_outputs() {
    let inbox = FrameInbox::new();
    let config = NodeConfig {
        sensor_weight: 0.0,
        ..NodeConfig::default()
    };
    let (mut app, mut hw, mut sink) = started(config, &inbox);
    let mut radio = MockRadio::new();

    hw.reading.temperature_c = 5.0;
    for _ in 0..5 {
        app.tick(&mut hw, &mut radio, &mut sink);
    }

    assert!(app.aggregate().is_none());
    assert_eq!(hw.calls.len(), 2, "only the power-on commands");
    assert!(!app.state().heating);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::AggregateUnavailable)), 1);
    assert_eq!(radio.sent.len(), 5, "broadcast continues");
}

#[test]
fn light_peer_is_tracked_but_not_fused() {
    let inbox = FrameInbox::new();
    let (mut app, mut hw, mut sink) = started(NodeConfig::default(), &inbox);
    let mut radio = MockRadio::new();

    inbox.post(codec::encode(&RoleReading::Light(OccupancyFields {
        movement_secs: 30,
        smoke: 4,
    })));
    app.tick(&mut hw, &mut radio, &mut sink);

    assert_eq!(app.sources().freshness(Role::Light), Freshness::Fresh);
    assert!((app.aggregate().unwrap().temperature_c - 19.0).abs() < 1e-4);
}

#[test]
fn broadcasts_own_reading_every_cycle() {
    let inbox = FrameInbox::new();
    let (mut app, mut hw, mut sink) = started(NodeConfig::default(), &inbox);
    let mut radio = MockRadio::new();

    hw.reading.temperature_c = 21.0;
    hw.reading.humidity_pct = 48.0;
    hw.reading.co2_ppm = 620.0;
    app.tick(&mut hw, &mut radio, &mut sink);

    assert_eq!(radio.sent, [Frame(0x1A5F_300F)]);
    assert_eq!(app.last_frame(), Some(Frame(0x1A5F_300F)));
    assert!(radio.listening, "listening resumes after the send");
}

#[test]
fn window_node_sets_the_open_bit() {
    let inbox = FrameInbox::new();
    let config = NodeConfig {
        role: Role::Window,
        sensor_weight: 2.0,
        ..NodeConfig::default()
    };
    let (mut app, mut hw, mut sink) = started(config, &inbox);
    let mut radio = MockRadio::new();

    hw.reading.window_open = true;
    app.tick(&mut hw, &mut radio, &mut sink);

    let frame = radio.sent[0];
    assert_eq!(frame.role(), Role::Window);
    assert_eq!(frame.0 & 0xFF, 21, "weight 20 with the open flag OR-ed into bit 0");
}

#[test]
fn failed_sends_do_not_disturb_control() {
    let inbox = FrameInbox::new();
    let (mut app, mut hw, mut sink) = started(NodeConfig::default(), &inbox);
    let mut radio = MockRadio::new();
    radio.fail = true;

    hw.reading.temperature_c = 16.0;
    app.tick(&mut hw, &mut radio, &mut sink);

    assert!(hw.is_on(Actuator::Heater));
    let t = app.build_telemetry();
    assert_eq!(t.send_failures, 1);
    assert_eq!(t.frames_sent, 0);
}

#[test]
fn telemetry_is_emitted_periodically() {
    let inbox = FrameInbox::new();
    let config = NodeConfig {
        telemetry_every: 2,
        ..NodeConfig::default()
    };
    let (mut app, mut hw, mut sink) = started(config, &inbox);
    let mut radio = MockRadio::new();

    for _ in 0..4 {
        app.tick(&mut hw, &mut radio, &mut sink);
    }

    let snapshots: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::Telemetry(t) => Some(t.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(snapshots.len(), 2);

    let json = serde_json::to_value(&snapshots[1]).unwrap();
    assert_eq!(json["cycle"], 4);
    assert_eq!(json["role"], "Electronic");
    assert_eq!(json["frames_sent"], 4);
    assert_eq!(json["sources"].as_array().unwrap().len(), 3);
}

#[test]
fn two_nodes_converge_on_a_shared_aggregate() {
    let inbox_a = FrameInbox::new();
    let inbox_b = FrameInbox::new();

    let mut a = NodeService::new(NodeConfig::default(), &inbox_a).unwrap();
    let mut b = NodeService::new(
        NodeConfig {
            role: Role::Window,
            ..NodeConfig::default()
        },
        &inbox_b,
    )
    .unwrap();
    let mut radio_a = MockRadio::linked(vec![&inbox_b]);
    let mut radio_b = MockRadio::linked(vec![&inbox_a]);
    let mut hw_a = MockHardware::with_climate(17.0, 50.0, 400.0);
    let mut hw_b = MockHardware::with_climate(23.0, 50.0, 400.0);
    let mut sink = LogSink::new();

    a.tick(&mut hw_a, &mut radio_a, &mut sink);
    assert!(a.state().heating, "alone at 17 °C");

    b.tick(&mut hw_b, &mut radio_b, &mut sink);
    assert!((b.aggregate().unwrap().temperature_c - 20.0).abs() < 1e-3);
    assert!(!b.state().heating);

    a.tick(&mut hw_a, &mut radio_a, &mut sink);
    assert!((a.aggregate().unwrap().temperature_c - 20.0).abs() < 1e-3);
    assert!(a.state().heating, "20 °C is not above the target, heater held");
}
