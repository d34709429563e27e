//! Temperature sensor trait

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Device did not acknowledge
    NoResponse,
    /// Transport fault on the bus
    Bus,
    /// Frame failed its checksum
    Checksum,
    /// Bus transport did not complete in time
    Timeout,
    /// No bus transport bound to the sensor
    Unconfigured,
    /// Reading carries the device's error flag, or a value is out of range
    OutOfRange,
}

/// Trait for temperature sensors
///
/// Implementations handle the specific sensor type (IR thermometer,
/// thermistor, thermocouple, ...).
pub trait TemperatureSensor {
    /// Read the current temperature in degrees Celsius
    ///
    /// Returns a fixed-point value with 0.1°C resolution.
    /// For example, 36.6°C is returned as 366.
    ///
    /// Takes `&mut self` because reading requires bus access.
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError>;

    /// Read the current temperature in whole degrees Celsius
    fn read_celsius(&mut self) -> Result<i16, SensorError> {
        self.read_celsius_x10().map(|t| t / 10)
    }

    /// Check if the sensor reading is valid
    fn is_valid(&mut self) -> bool {
        self.read_celsius_x10().is_ok()
    }
}
