//! HomeMesh node firmware: main entry point.
//!
//! One binary serves every node; the role is chosen at build time through
//! the `HOMEMESH_ROLE` environment variable (`electronic`, `window` or
//! `light`, default `electronic`).
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        Nrf24            LogEventSink          │
//! │  (Sensor/Occupancy +    (RadioLink)      (EventSink)           │
//! │   Actuator)                                                    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │        NodeService / LampService (pure logic)          │    │
//! │  │  sources · fusion · hysteresis · broadcast             │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  radio IRQ ──▶ rx thread ──▶ FrameInbox ──▶ control loop       │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result, anyhow};
use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyOutputPin, InterruptType, Output, OutputPin as _, PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use esp_idf_hal::spi::{SpiDeviceDriver, SpiDriver, SpiDriverConfig};
use log::{error, info, warn};

use homemesh::adapters::actuators::OutputBank;
use homemesh::adapters::hardware::HardwareAdapter;
use homemesh::adapters::log_sink::LogEventSink;
use homemesh::adapters::nrf24::Nrf24;
use homemesh::app::lamp::LampService;
use homemesh::app::ports::SensorPort;
use homemesh::app::service::NodeService;
use homemesh::config::{LampConfig, NodeConfig};
use homemesh::error::SensorError;
use homemesh::protocol::Role;
use homemesh::sensors::climate::{self, Bme280};
use homemesh::sensors::co2::Mq135;
use homemesh::sensors::occupancy::MotionLatch;
use homemesh::sensors::{AnalogInput, ClimateStation, LampInputs};
use homemesh::sources::FrameInbox;

type Radio = Nrf24<SpiDeviceDriver<'static, SpiDriver<'static>>, PinDriver<'static, AnyOutputPin, Output>, Ets>;
type Relay = PinDriver<'static, AnyOutputPin, Output>;

// ── Interrupt-shared state ────────────────────────────────────

/// Peer frames, posted by the receive thread, aged by the control loop.
static INBOX: FrameInbox = FrameInbox::new();
/// Set by the nRF24 IRQ line (active low).
static RADIO_IRQ: AtomicBool = AtomicBool::new(false);
/// Set by the PIR rising edge (lamp node).
static MOTION: MotionLatch = MotionLatch::new();

/// One-shot ADC channel behind a closure.
struct FnAdc<F>(F);

impl<F: FnMut() -> Result<u16, SensorError>> AnalogInput for FnAdc<F> {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        (self.0)()
    }
}

fn role_from_env() -> Role {
    match option_env!("HOMEMESH_ROLE") {
        Some("window") => Role::Window,
        Some("light") => Role::Light,
        _ => Role::Electronic,
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let role = role_from_env();
    info!("╔══════════════════════════════════════╗");
    info!("║  HomeMesh v{} ({role})", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    // ── 2. Radio ──────────────────────────────────────────────
    let spi_config = esp_idf_hal::spi::config::Config::new()
        .baudrate(Hertz(4_000_000))
        .data_mode(embedded_hal::spi::MODE_0);
    let spi = SpiDeviceDriver::new_single(
        peripherals.spi2,
        pins.gpio4,
        pins.gpio6,
        Some(pins.gpio5),
        Some(pins.gpio7),
        &SpiDriverConfig::default(),
        &spi_config,
    )
    .context("SPI init")?;
    let ce = PinDriver::output(pins.gpio10.downgrade_output())?;

    let mut radio: Radio = Nrf24::new(spi, ce, Ets, role);
    if let Err(e) = radio.configure() {
        // Without the radio the node still controls from its own sensors.
        error!("nRF24 init failed: {e}, running standalone");
    }
    let radio = Arc::new(Mutex::new(radio));

    let mut irq = PinDriver::input(pins.gpio3)?;
    irq.set_pull(Pull::Up)?;
    irq.set_interrupt_type(InterruptType::NegEdge)?;
    // SAFETY: the callback only stores to an atomic.
    unsafe {
        irq.subscribe(|| RADIO_IRQ.store(true, Ordering::Release))?;
    }
    irq.enable_interrupt()?;

    // ── 3. Receive thread: radio FIFO → INBOX ─────────────────
    let rx_radio = Arc::clone(&radio);
    std::thread::Builder::new()
        .stack_size(4096)
        .spawn(move || {
            loop {
                if RADIO_IRQ.swap(false, Ordering::AcqRel) {
                    match rx_radio.lock() {
                        Ok(mut r) => {
                            if let Err(e) = r.drain_into(&INBOX) {
                                warn!("RADIO | drain failed: {e}");
                            }
                        }
                        Err(_) => error!("RADIO | mutex poisoned"),
                    }
                    if let Err(e) = irq.enable_interrupt() {
                        warn!("RADIO | IRQ re-arm failed: {e}");
                    }
                }
                FreeRtos::delay_ms(2);
            }
        })
        .context("rx thread")?;

    let mut log_sink = LogEventSink::new();

    // ── 4. MQ-135 on ADC1 ─────────────────────────────────────
    let adc = AdcDriver::new(peripherals.adc1)?;
    let adc_config = AdcChannelConfig {
        attenuation: DB_11,
        ..Default::default()
    };
    let mut gas_channel = AdcChannelDriver::new(&adc, pins.gpio1, &adc_config)?;
    let gas = Mq135::new(FnAdc(|| adc.read(&mut gas_channel).map_err(|_| SensorError::AdcReadFailed)));

    if role == Role::Light {
        // ── 5a. Lamp node ─────────────────────────────────────
        let config = LampConfig::default();
        let mut pir = PinDriver::input(pins.gpio20)?;
        pir.set_pull(Pull::Down)?;
        pir.set_interrupt_type(InterruptType::PosEdge)?;
        // SAFETY: the callback only stores to an atomic.
        unsafe {
            pir.subscribe(|| MOTION.signal())?;
        }
        pir.enable_interrupt()?;

        let light: Relay = PinDriver::output(pins.gpio18.downgrade_output())?;
        let mut hw = HardwareAdapter::new(LampInputs::new(&MOTION, pir, gas), OutputBank::lamp(light));
        let mut app = LampService::new(config.clone())?;
        app.start(&mut hw, &mut log_sink);

        info!("System ready. Entering lamp loop.");
        loop {
            {
                let mut r = radio.lock().map_err(|_| anyhow!("radio mutex poisoned"))?;
                app.tick(&mut hw, &mut *r, &mut log_sink);
            }
            if let Err(e) = hw.inputs_mut().pir_mut().enable_interrupt() {
                warn!("PIR re-arm failed: {e}");
            }
            FreeRtos::delay_ms(config.cycle_period_ms);
        }
    }

    // ── 5b. Controller node (Electronic / Window) ─────────────
    let config = NodeConfig {
        role,
        ..NodeConfig::default()
    };

    let i2c = I2cDriver::new(
        peripherals.i2c0,
        pins.gpio8,
        pins.gpio9,
        &I2cConfig::new().baudrate(Hertz(400_000)),
    )?;
    let mut bme = Bme280::new(i2c, climate::ADDRESS);
    if let Err(e) = bme.init() {
        error!("BME280 init failed: {e}, climate readings hold defaults");
    }

    let window = PinDriver::input(pins.gpio2)?;
    let heater: Relay = PinDriver::output(pins.gpio18.downgrade_output())?;
    let vent: Relay = PinDriver::output(pins.gpio19.downgrade_output())?;
    let mut hw = HardwareAdapter::new(ClimateStation::new(bme, gas), OutputBank::climate(heater, vent));

    // MQ-135 clean-air resistance: a measured value fixed at build time, or
    // a one-off calibration against outdoor air on this boot.
    if let Some(r0) = option_env!("HOMEMESH_MQ135_R0").and_then(|v| v.parse::<f32>().ok()) {
        hw.inputs_mut().gas_mut().set_r0(r0);
    } else if option_env!("HOMEMESH_MQ135_CALIBRATE").is_some() {
        let now = hw.read_current();
        if let Err(e) = hw.inputs_mut().gas_mut().calibrate(now.temperature_c, now.humidity_pct) {
            warn!("MQ135 calibration failed: {e}");
        }
    }
    info!("MQ135 R0 = {:.1} kOhm", hw.inputs_mut().gas_mut().r0());

    let mut app = NodeService::new(config.clone(), &INBOX)?;
    app.start(&mut hw, &mut log_sink);

    info!("System ready. Entering control loop.");
    loop {
        if role == Role::Window {
            // Reed contact closed (low) = window shut.
            hw.inputs_mut().set_window_open(window.is_high());
        }
        {
            let mut r = radio.lock().map_err(|_| anyhow!("radio mutex poisoned"))?;
            app.tick(&mut hw, &mut *r, &mut log_sink);
        }
        FreeRtos::delay_ms(config.cycle_period_ms);
    }
}
