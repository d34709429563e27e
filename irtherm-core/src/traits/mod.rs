//! Sensor abstraction traits
//!
//! These traits define the interface between application logic and
//! concrete sensor drivers.

pub mod sensor;

pub use sensor::{SensorError, TemperatureSensor};
