//! Integration tests for the lamp node: motion → light → Light frame.

use super::mock_hw::{LogSink, MockHardware, MockRadio};

use homemesh::app::events::AppEvent;
use homemesh::app::lamp::LampService;
use homemesh::app::service::NodeService;
use homemesh::config::{LampConfig, NodeConfig};
use homemesh::control::hysteresis::Actuator;
use homemesh::protocol::codec;
use homemesh::protocol::{OccupancyFields, Role, RoleReading};
use homemesh::sources::{FrameInbox, Freshness};

fn started() -> (LampService, MockHardware, LogSink) {
    let mut app = LampService::new(LampConfig::default()).unwrap();
    let mut hw = MockHardware::new();
    let mut sink = LogSink::new();
    app.start(&mut hw, &mut sink);
    (app, hw, sink)
}

#[test]
fn zero_cycle_period_is_rejected() {
    let config = LampConfig {
        cycle_period_ms: 0,
        ..LampConfig::default()
    };
    assert!(LampService::new(config).is_err());
}

#[test]
fn start_turns_the_light_off() {
    let (_app, hw, sink) = started();
    assert_eq!(hw.calls, [(Actuator::Light, false)]);
    assert!(matches!(sink.events[..], [AppEvent::Started(Role::Light)]));
}

#[test]
fn motion_turns_the_light_on_until_the_room_is_idle() {
    let (mut app, mut hw, mut sink) = started();
    let mut radio = MockRadio::new();

    hw.motion_edges.push_back(true);
    hw.motion_present = true;
    app.tick(&mut hw, &mut radio, &mut sink);
    assert!(app.light_on());
    assert!(hw.is_on(Actuator::Light));

    // 200 ms cycles, 2000 ms on-time: the tenth idle cycle switches off.
    hw.motion_present = false;
    for _ in 0..9 {
        app.tick(&mut hw, &mut radio, &mut sink);
        assert!(app.light_on());
    }
    app.tick(&mut hw, &mut radio, &mut sink);
    assert!(!app.light_on());
    assert!(!hw.is_on(Actuator::Light));

    let switches = sink.count(|e| {
        matches!(
            e,
            AppEvent::ActuatorChanged {
                actuator: Actuator::Light,
                ..
            }
        )
    });
    assert_eq!(switches, 2);

    match codec::decode(radio.sent[10]) {
        RoleReading::Light(f) => assert_eq!(f.movement_secs, 2),
        other => panic!("unexpected reading {other:?}"),
    }
    assert_eq!(app.frames_sent(), 11);
    assert_eq!(app.cycle(), 11);
}

#[test]
fn smoke_level_is_broadcast_in_tens_of_ppm() {
    let (mut app, mut hw, mut sink) = started();
    let mut radio = MockRadio::new();

    hw.smoke_ppm = 1234.0;
    app.tick(&mut hw, &mut radio, &mut sink);

    let frame = app.last_frame().unwrap();
    assert_eq!(frame.role(), Role::Light);
    assert_eq!(
        codec::decode(frame),
        RoleReading::Light(OccupancyFields {
            movement_secs: 0,
            smoke: 123,
        })
    );
}

#[test]
fn controller_sees_the_lamp_as_a_fresh_peer() {
    let inbox = FrameInbox::new();
    let mut controller = NodeService::new(NodeConfig::default(), &inbox).unwrap();
    let (mut lamp, mut lamp_hw, mut sink) = started();
    let mut lamp_radio = MockRadio::linked(vec![&inbox]);
    let mut hw = MockHardware::new();
    let mut radio = MockRadio::new();

    lamp.tick(&mut lamp_hw, &mut lamp_radio, &mut sink);
    controller.tick(&mut hw, &mut radio, &mut sink);

    assert_eq!(controller.sources().freshness(Role::Light), Freshness::Fresh);
    assert!(matches!(
        controller.sources().reading(Role::Light),
        RoleReading::Light(_)
    ));
}
