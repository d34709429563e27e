//! MLX90615 infrared thermometer
//!
//! The MLX90615 talks SMBus: every register access is a word transfer
//! addressed by a one-byte command.
//!
//! # Transactions
//!
//! Read word:
//! - START, address+W, command
//! - REPEATED START, address+R
//! - data low (ACK), data high (ACK), PEC (NACK)
//! - STOP
//!
//! Write word:
//! - START, address+W, command, data low, data high, PEC (optional)
//! - STOP
//!
//! The PEC of a read is returned to the caller but never used to reject the
//! read. EEPROM cells (0x10-0x13) must be erased with a zero write before a
//! new value is written, and need several milliseconds per write; neither
//! the erase nor the delay is applied here.

use irtherm_core::config::{ConfigError, SensorConfig};
use irtherm_core::conversion::{emissivity_to_raw, raw_to_emissivity, Temperature};
use irtherm_core::traits::{SensorError, TemperatureSensor};
use irtherm_hal::i2c::{self, address_rw, Direction, I2cMaster};
use irtherm_protocol::frame::{command_pec, read_pec, RegisterFrame};
use irtherm_protocol::reg;

use crate::error::{Error, Stage};

#[cfg(feature = "defmt")]
use defmt::{debug, warn};

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

/// Which temperature register to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureSource {
    /// Sensor die temperature
    Ambient,
    /// Temperature of the object in the field of view
    Object,
}

impl TemperatureSource {
    /// Command byte for this source
    pub const fn command(self) -> u8 {
        match self {
            TemperatureSource::Ambient => reg::AMBIENT_TEMPERATURE,
            TemperatureSource::Object => reg::OBJECT_TEMPERATURE,
        }
    }
}

/// A register word together with the PEC the device sent after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterReading {
    /// Command that was read
    pub command: u8,
    /// Register value, `(high << 8) | low`
    pub value: u16,
    /// PEC byte as received
    pub pec: u8,
    expected_pec: u8,
}

impl RegisterReading {
    /// Whether the received PEC matches the bytes on the bus
    pub fn pec_ok(&self) -> bool {
        self.pec == self.expected_pec
    }
}

/// MLX90615 driver
///
/// Holds the bus transport (if bound), the sensor settings and one frame
/// buffer reused by every write.
pub struct Mlx90615<M> {
    master: Option<M>,
    config: SensorConfig,
    frame: RegisterFrame,
}

impl<M: I2cMaster> Mlx90615<M> {
    /// Create a driver bound to `master`
    ///
    /// Fails if the configured address is not a usable 7-bit address, so no
    /// transaction can go out to the general call address or an alias.
    pub fn new(master: M, config: SensorConfig) -> Result<Self, ConfigError> {
        let mut sensor = Self::unbound(config)?;
        sensor.master = Some(master);
        Ok(sensor)
    }

    /// Create a driver with no transport yet
    ///
    /// Every bus operation fails with [`Error::TransportUnconfigured`]
    /// until [`attach`](Self::attach) is called.
    pub fn unbound(config: SensorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            master: None,
            config,
            frame: RegisterFrame::default(),
        })
    }

    /// Bind a transport, returning the previous one
    pub fn attach(&mut self, master: M) -> Option<M> {
        self.master.replace(master)
    }

    /// Unbind and return the transport
    pub fn release(&mut self) -> Option<M> {
        self.master.take()
    }

    /// Current settings
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// 7-bit bus address
    pub fn address(&self) -> u8 {
        self.config.address
    }

    /// Read a register word
    pub fn read_register(&mut self, command: u8) -> Result<u16, Error<M::Error>> {
        self.read_register_with_pec(command).map(|r| r.value)
    }

    /// Read a register word along with its PEC
    pub fn read_register_with_pec(
        &mut self,
        command: u8,
    ) -> Result<RegisterReading, Error<M::Error>> {
        let address = self.config.address;
        let reading = transact(&mut self.master, address, command, |master| {
            read_word(master, address, command)
        })?;

        debug!(
            "mlx90615 {=u8:#x}: read {=u8:#x} = {=u16:#x}",
            address, command, reading.value
        );
        if !reading.pec_ok() {
            debug!(
                "mlx90615 {=u8:#x}: read PEC {=u8:#x} does not match",
                address, reading.pec
            );
        }
        Ok(reading)
    }

    /// Read a register word as two's complement
    pub fn read_register_i16(&mut self, command: u8) -> Result<i16, Error<M::Error>> {
        self.read_register(command).map(|value| value as i16)
    }

    /// Write a register word
    ///
    /// The frame is built into the driver's buffer and, with
    /// `verify_frames`, checked against its own PEC before anything is sent.
    /// The PEC byte goes on the bus only when `pec` is enabled.
    pub fn write_register(&mut self, command: u8, value: u16) -> Result<(), Error<M::Error>> {
        let address = self.config.address;
        self.frame.fill(address, command, value);

        if self.config.verify_frames && !self.frame.verify() {
            warn!(
                "mlx90615 {=u8:#x}: frame for {=u8:#x} failed its PEC",
                address, command
            );
            return Err(Error::ChecksumMismatch);
        }

        let frame = &self.frame;
        let pec = self.config.pec;
        transact(&mut self.master, address, command, |master| {
            send_frame(master, address, frame, pec)
        })?;

        debug!(
            "mlx90615 {=u8:#x}: wrote {=u8:#x} = {=u16:#x}",
            address, command, value
        );
        Ok(())
    }

    /// Write zero to a register
    ///
    /// EEPROM cells need this before a new value is written.
    pub fn erase_register(&mut self, command: u8) -> Result<(), Error<M::Error>> {
        self.write_register(command, 0)
    }

    /// Read an EEPROM cell
    pub fn read_eeprom(&mut self, command: u8) -> Result<u16, Error<M::Error>> {
        check_eeprom(command)?;
        self.read_register(command)
    }

    /// Write an EEPROM cell
    ///
    /// The cell must have been erased first.
    pub fn write_eeprom(&mut self, command: u8, value: u16) -> Result<(), Error<M::Error>> {
        check_eeprom(command)?;
        self.write_register(command, value)
    }

    /// Read a temperature register
    pub fn read_temperature(
        &mut self,
        source: TemperatureSource,
    ) -> Result<Temperature, Error<M::Error>> {
        self.read_register(source.command()).map(Temperature::from_raw)
    }

    /// Ambient temperature in degrees Celsius
    pub fn read_ambient_celsius(&mut self) -> Result<f32, Error<M::Error>> {
        self.read_temperature(TemperatureSource::Ambient)
            .map(|t| t.celsius())
    }

    /// Object temperature in degrees Celsius
    pub fn read_object_celsius(&mut self) -> Result<f32, Error<M::Error>> {
        self.read_temperature(TemperatureSource::Object)
            .map(|t| t.celsius())
    }

    /// Raw IR channel data
    pub fn read_raw_ir(&mut self) -> Result<i16, Error<M::Error>> {
        self.read_register_i16(reg::RAW_IR)
    }

    /// Emissivity coefficient (0.0 < e <= 1.0)
    pub fn read_emissivity(&mut self) -> Result<f32, Error<M::Error>> {
        self.read_register(reg::EMISSIVITY).map(raw_to_emissivity)
    }

    /// Write the emissivity coefficient
    ///
    /// Like any EEPROM write, erase the cell first with
    /// `erase_register(reg::EMISSIVITY)`.
    pub fn write_emissivity(&mut self, emissivity: f32) -> Result<(), Error<M::Error>> {
        let raw = emissivity_to_raw(emissivity).ok_or(Error::InvalidValue)?;
        self.write_register(reg::EMISSIVITY, raw)
    }

    /// Put the device into sleep mode
    ///
    /// The device wakes on an SCL low pulse longer than its wake-up time,
    /// which is up to the board to generate.
    pub fn sleep(&mut self) -> Result<(), Error<M::Error>> {
        let address = self.config.address;
        transact(&mut self.master, address, reg::SLEEP, |master| {
            ack(
                master.start(address_rw(address, Direction::Write)),
                Stage::Address,
            )?;
            ack(master.write(reg::SLEEP), Stage::Command)?;
            ack(master.write(command_pec(address, reg::SLEEP)), Stage::Pec)
        })?;

        debug!("mlx90615 {=u8:#x}: sleeping", address);
        Ok(())
    }
}

impl<M: I2cMaster> TemperatureSensor for Mlx90615<M> {
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError> {
        let temperature = self.read_temperature(TemperatureSource::Object)?;
        if temperature.has_error_flag() {
            return Err(SensorError::OutOfRange);
        }
        Ok(temperature.celsius_x10())
    }
}

fn check_eeprom<E>(command: u8) -> Result<(), Error<E>> {
    if reg::is_eeprom(command) {
        Ok(())
    } else {
        Err(Error::InvalidEeprom(command))
    }
}

/// Map an acknowledging bus call onto the driver error
fn ack<E: i2c::Error>(result: Result<bool, E>, stage: Stage) -> Result<(), Error<E>> {
    match result {
        Ok(true) => Ok(()),
        Ok(false) => Err(Error::Nack(stage)),
        Err(e) => Err(Error::from_transport(e)),
    }
}

/// Run one bus transaction and always close it with a stop
///
/// On failure the stop is still issued and the first error is returned.
#[cfg_attr(not(feature = "defmt"), allow(unused_variables))]
fn transact<M, T>(
    master: &mut Option<M>,
    address: u8,
    command: u8,
    op: impl FnOnce(&mut M) -> Result<T, Error<M::Error>>,
) -> Result<T, Error<M::Error>>
where
    M: I2cMaster,
{
    let master = master.as_mut().ok_or(Error::TransportUnconfigured)?;

    match op(master) {
        Ok(value) => {
            master.stop().map_err(Error::from_transport)?;
            Ok(value)
        }
        Err(e) => {
            warn!(
                "mlx90615 {=u8:#x}: command {=u8:#x} failed ({=i8})",
                address,
                command,
                e.status_code()
            );
            // Error from the failed step wins over a failing stop
            let _ = master.stop();
            Err(e)
        }
    }
}

fn read_word<M: I2cMaster>(
    master: &mut M,
    address: u8,
    command: u8,
) -> Result<RegisterReading, Error<M::Error>> {
    ack(
        master.start(address_rw(address, Direction::Write)),
        Stage::Address,
    )?;
    ack(master.write(command), Stage::Command)?;
    ack(
        master.restart(address_rw(address, Direction::Read)),
        Stage::ReadAddress,
    )?;

    let low = master.read(false).map_err(Error::from_transport)?;
    let high = master.read(false).map_err(Error::from_transport)?;
    let pec = master.read(true).map_err(Error::from_transport)?;

    Ok(RegisterReading {
        command,
        value: (u16::from(high) << 8) | u16::from(low),
        pec,
        expected_pec: read_pec(address, command, low, high),
    })
}

fn send_frame<M: I2cMaster>(
    master: &mut M,
    address: u8,
    frame: &RegisterFrame,
    pec: bool,
) -> Result<(), Error<M::Error>> {
    ack(
        master.start(address_rw(address, Direction::Write)),
        Stage::Address,
    )?;
    ack(master.write(frame.command()), Stage::Command)?;
    ack(master.write(frame.low()), Stage::DataLow)?;
    ack(master.write(frame.high()), Stage::DataHigh)?;
    if pec {
        ack(master.write(frame.pec()), Stage::Pec)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{Event, MockMaster};
    use irtherm_hal::ErrorKind;
    use irtherm_protocol::crc::pec;
    use proptest::prelude::*;

    const W: u8 = 0xB6;
    const R: u8 = 0xB7;

    fn sensor(master: MockMaster) -> Mlx90615<MockMaster> {
        Mlx90615::new(master, SensorConfig::default()).unwrap()
    }

    fn events(sensor: &mut Mlx90615<MockMaster>) -> std::vec::Vec<Event> {
        sensor.release().map(|m| m.events).unwrap_or_default()
    }

    #[test]
    fn test_read_register_sequence() {
        let mut mlx = sensor(MockMaster::new().with_reads(&[0x0B, 0x3A, 0x00]));

        assert_eq!(mlx.read_register(reg::OBJECT_TEMPERATURE), Ok(0x3A0B));
        assert_eq!(
            events(&mut mlx),
            vec![
                Event::Start(W),
                Event::Write(0x27),
                Event::Restart(R),
                Event::Read(false),
                Event::Read(false),
                Event::Read(true),
                Event::Stop,
            ]
        );
    }

    #[test]
    fn test_read_composes_with_or() {
        let mut mlx = sensor(MockMaster::new().with_reads(&[0xFF, 0x01, 0x00]));
        assert_eq!(mlx.read_register(reg::RAW_IR), Ok(0x01FF));
    }

    #[test]
    fn test_read_pec_is_reported_not_enforced() {
        let good = read_pec(0x5B, 0x27, 0xFF, 0x01);
        let mut mlx = sensor(MockMaster::new().with_reads(&[0xFF, 0x01, good]));
        let reading = mlx.read_register_with_pec(0x27).unwrap();
        assert!(reading.pec_ok());
        assert_eq!(reading.pec, 0x0A);

        let mut mlx = sensor(MockMaster::new().with_reads(&[0xFF, 0x01, good ^ 0x80]));
        let reading = mlx.read_register_with_pec(0x27).unwrap();
        assert!(!reading.pec_ok());
        assert_eq!(reading.value, 0x01FF);
    }

    #[test]
    fn test_read_address_nack_stops() {
        let mut mlx = sensor(MockMaster::new().nack_at(0));

        assert_eq!(
            mlx.read_register(reg::AMBIENT_TEMPERATURE),
            Err(Error::Nack(Stage::Address))
        );
        assert_eq!(events(&mut mlx), vec![Event::Start(W), Event::Stop]);
    }

    #[test]
    fn test_read_restart_nack_stops_before_reading() {
        let mut mlx = sensor(MockMaster::new().nack_at(2));

        assert_eq!(
            mlx.read_register(reg::AMBIENT_TEMPERATURE),
            Err(Error::Nack(Stage::ReadAddress))
        );
        assert_eq!(
            events(&mut mlx),
            vec![
                Event::Start(W),
                Event::Write(0x26),
                Event::Restart(R),
                Event::Stop,
            ]
        );
    }

    #[test]
    fn test_write_register_sends_frame() {
        let mut mlx = sensor(MockMaster::new());

        assert_eq!(mlx.write_register(reg::EMISSIVITY, 0x4000), Ok(()));
        assert_eq!(
            events(&mut mlx),
            vec![
                Event::Start(W),
                Event::Write(0x13),
                Event::Write(0x00),
                Event::Write(0x40),
                Event::Write(0x34),
                Event::Stop,
            ]
        );
    }

    #[test]
    fn test_write_without_pec() {
        let config = SensorConfig::default().with_pec(false);
        let mut mlx = Mlx90615::new(MockMaster::new(), config).unwrap();

        mlx.write_register(reg::EMISSIVITY, 0x4000).unwrap();
        let master = mlx.release().unwrap();
        assert_eq!(master.written(), vec![0x13, 0x00, 0x40]);
        assert_eq!(master.events.last(), Some(&Event::Stop));
    }

    #[test]
    fn test_write_fails_fast_on_nack() {
        // ack 0 = address, ack 1 = command, ack 2 = data low
        let mut mlx = sensor(MockMaster::new().nack_at(2));

        assert_eq!(
            mlx.write_register(reg::EMISSIVITY, 0x4000),
            Err(Error::Nack(Stage::DataLow))
        );
        assert_eq!(
            events(&mut mlx),
            vec![
                Event::Start(W),
                Event::Write(0x13),
                Event::Write(0x00),
                Event::Stop,
            ]
        );
    }

    #[test]
    fn test_write_nack_stage_per_byte() {
        let stages = [
            Stage::Address,
            Stage::Command,
            Stage::DataLow,
            Stage::DataHigh,
            Stage::Pec,
        ];
        for (index, stage) in stages.into_iter().enumerate() {
            let mut mlx = sensor(MockMaster::new().nack_at(index));
            assert_eq!(mlx.write_register(0x10, 0x1234), Err(Error::Nack(stage)));
            let master = mlx.release().unwrap();
            // Nothing follows the refused byte except the stop
            assert_eq!(master.events.len(), index + 2);
            assert_eq!(master.events.last(), Some(&Event::Stop));
        }
    }

    #[test]
    fn test_erase_writes_zero() {
        let mut mlx = sensor(MockMaster::new());
        mlx.erase_register(reg::EMISSIVITY).unwrap();
        let master = mlx.release().unwrap();
        assert_eq!(master.written(), vec![0x13, 0x00, 0x00, 0xF3]);
    }

    #[test]
    fn test_unbound_reports_unconfigured() {
        let mut mlx: Mlx90615<MockMaster> = Mlx90615::unbound(SensorConfig::default()).unwrap();

        assert_eq!(mlx.read_register(0x27), Err(Error::TransportUnconfigured));
        assert_eq!(
            mlx.write_register(0x13, 0x4000),
            Err(Error::TransportUnconfigured)
        );
        assert_eq!(mlx.sleep(), Err(Error::TransportUnconfigured));
        assert_eq!(mlx.read_celsius_x10(), Err(SensorError::Unconfigured));

        let master = MockMaster::new().with_reads(&[0x0B, 0x3A, 0x00]);
        assert!(mlx.attach(master).is_none());
        assert_eq!(mlx.read_register(0x27), Ok(0x3A0B));
    }

    #[test]
    fn test_timeout_is_surfaced() {
        // event 3 is the first read
        let mut mlx = sensor(MockMaster::new().fail_at(3, ErrorKind::Timeout));

        assert_eq!(mlx.read_register(0x26), Err(Error::Timeout));
        assert_eq!(events(&mut mlx).last(), Some(&Event::Stop));
    }

    #[test]
    fn test_transport_fault_is_wrapped() {
        let mut mlx = sensor(MockMaster::new().fail_at(0, ErrorKind::Pin));
        assert!(matches!(
            mlx.read_register(0x26),
            Err(Error::Transport(fault)) if fault.0 == ErrorKind::Pin
        ));
    }

    #[test]
    fn test_failing_stop_after_success_is_reported() {
        // start, command, low, high, pec are events 0..=4; stop is event 5
        let mut mlx = sensor(MockMaster::new().fail_at(5, ErrorKind::Timeout));
        assert_eq!(mlx.write_register(0x10, 1), Err(Error::Timeout));
    }

    #[test]
    fn test_eeprom_range_checked() {
        let mut mlx = sensor(MockMaster::new());

        assert_eq!(mlx.read_eeprom(0x26), Err(Error::InvalidEeprom(0x26)));
        assert_eq!(mlx.write_eeprom(0x14, 1), Err(Error::InvalidEeprom(0x14)));
        assert!(events(&mut mlx).is_empty());
    }

    #[test]
    fn test_write_eeprom() {
        let mut mlx = sensor(MockMaster::new());
        mlx.write_eeprom(0x10, 0xBEEF).unwrap();
        let master = mlx.release().unwrap();
        let written = master.written();
        assert_eq!(&written[..3], &[0x10, 0xEF, 0xBE]);
        assert_eq!(written[3], pec(&[W, 0x10, 0xEF, 0xBE]));
    }

    #[test]
    fn test_temperatures() {
        let mut mlx = sensor(
            MockMaster::new().with_reads(&[0x0B, 0x3A, 0x00, 0x50, 0x00, 0x00]),
        );

        let object = mlx.read_object_celsius().unwrap();
        assert!((object - 24.02).abs() < 0.005);
        let ambient = mlx.read_ambient_celsius().unwrap();
        assert!((ambient + 271.56).abs() < 0.005);

        let written = mlx.release().unwrap().written();
        assert_eq!(written, vec![0x27, 0x26]);
    }

    #[test]
    fn test_error_flag_rejected_by_sensor_trait() {
        let mut mlx = sensor(MockMaster::new().with_reads(&[0x0B, 0xBA, 0x00]));
        assert_eq!(mlx.read_celsius_x10(), Err(SensorError::OutOfRange));

        let mut mlx = sensor(MockMaster::new().with_reads(&[0x0B, 0x3A, 0x00]));
        assert_eq!(mlx.read_celsius_x10(), Ok(240));
    }

    #[test]
    fn test_raw_ir_is_signed() {
        let mut mlx = sensor(MockMaster::new().with_reads(&[0xFE, 0xFF, 0x00]));
        assert_eq!(mlx.read_raw_ir(), Ok(-2));
    }

    #[test]
    fn test_emissivity() {
        let mut mlx = sensor(MockMaster::new().with_reads(&[0x00, 0x20, 0x00]));
        assert_eq!(mlx.read_emissivity(), Ok(0.5));

        assert_eq!(mlx.write_emissivity(1.5), Err(Error::InvalidValue));
        assert_eq!(mlx.write_emissivity(1.0e-5), Err(Error::InvalidValue));
        mlx.write_emissivity(1.0).unwrap();
        let master = mlx.release().unwrap();
        assert_eq!(&master.written()[1..], &[0x13, 0x00, 0x40, 0x34]);
    }

    #[test]
    fn test_sleep_sequence() {
        let mut mlx = sensor(MockMaster::new());
        mlx.sleep().unwrap();
        assert_eq!(
            events(&mut mlx),
            vec![
                Event::Start(W),
                Event::Write(0xC6),
                Event::Write(0x6D),
                Event::Stop,
            ]
        );
    }

    #[test]
    fn test_custom_address() {
        let config = SensorConfig::default().with_address(0x5A);
        let mut mlx = Mlx90615::new(MockMaster::new(), config).unwrap();
        mlx.read_register(0x27).unwrap();
        let master = mlx.release().unwrap();
        assert_eq!(master.events[0], Event::Start(0xB4));
        assert_eq!(master.events[2], Event::Restart(0xB5));
    }

    #[test]
    fn test_invalid_address_rejected_before_bus_use() {
        // 0x80 would shift to the general call address, 0xDB would alias 0x5B
        for address in [0x00, 0x80, 0xDB] {
            let config = SensorConfig::default().with_address(address);
            let mut master = MockMaster::new();

            assert!(matches!(
                Mlx90615::new(&mut master, config),
                Err(ConfigError::InvalidAddress(a)) if a == address
            ));
            assert!(matches!(
                Mlx90615::<MockMaster>::unbound(config),
                Err(ConfigError::InvalidAddress(a)) if a == address
            ));
            assert!(master.events.is_empty());
        }
    }

    #[test]
    fn test_borrowed_master() {
        let mut master = MockMaster::new().with_reads(&[0x34, 0x12, 0x00]);
        {
            let mut mlx = Mlx90615::new(&mut master, SensorConfig::default()).unwrap();
            assert_eq!(mlx.read_register(0x10), Ok(0x1234));
        }
        assert_eq!(master.events.len(), 7);
    }

    proptest! {
        #[test]
        fn read_composition_is_bitwise(low: u8, high: u8) {
            let mut mlx = sensor(MockMaster::new().with_reads(&[low, high, 0x00]));
            let value = mlx.read_register(0x27).unwrap();
            prop_assert_eq!(value, ((high as u16) << 8) | low as u16);
            prop_assert_eq!(value.to_le_bytes(), [low, high]);
        }

        #[test]
        fn written_frames_verify(command: u8, value: u16) {
            let mut mlx = sensor(MockMaster::new());
            mlx.write_register(command, value).unwrap();
            let mut bytes = vec![W];
            bytes.extend(mlx.release().unwrap().written());
            prop_assert_eq!(bytes.len(), 5);
            prop_assert_eq!(pec(&bytes), 0);
        }
    }
}
