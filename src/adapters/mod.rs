//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements          | Connects to                   |
//! |-------------|---------------------|-------------------------------|
//! | `actuators` | ActuatorPort        | Heater / fan / light GPIO     |
//! | `hardware`  | SensorPort          | BME280 + MQ-135 station       |
//! |             | OccupancyPort       | PIR + MQ-135 lamp inputs      |
//! |             | ActuatorPort        | Output bank                   |
//! | `log_sink`  | EventSink           | Serial log output             |
//! | `nrf24`     | RadioLink           | nRF24L01+ over SPI            |

pub mod actuators;
pub mod hardware;
pub mod log_sink;
pub mod nrf24;
