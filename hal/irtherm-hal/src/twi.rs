//! TWI peripheral register access
//!
//! A register-driven I2C controller is modelled as an owned handle to its
//! control, status, data and bit-rate registers. Transports take the handle
//! by value, so one handle means one bus and there is no hidden global
//! register state.

/// Register interface of an ATmega-style TWI controller
///
/// Implementations perform the raw volatile accesses for a specific chip.
/// Host tests implement it with a scripted fake.
pub trait TwiRegisters {
    /// Write the control register (TWCR)
    fn write_control(&mut self, value: u8);

    /// Read the control register (TWCR)
    fn read_control(&mut self) -> u8;

    /// Read the raw status register (TWSR), prescaler bits included
    fn read_status(&mut self) -> u8;

    /// Write the data register (TWDR)
    fn write_data(&mut self, value: u8);

    /// Read the data register (TWDR)
    fn read_data(&mut self) -> u8;

    /// Program the prescaler bits (TWPS) and bit-rate register (TWBR)
    fn configure_clock(&mut self, prescaler: u8, bit_rate: u8);

    /// Enable the internal pull-ups on the SDA and SCL pins
    fn enable_pullups(&mut self);
}

impl<T: TwiRegisters + ?Sized> TwiRegisters for &mut T {
    fn write_control(&mut self, value: u8) {
        T::write_control(self, value)
    }

    fn read_control(&mut self) -> u8 {
        T::read_control(self)
    }

    fn read_status(&mut self) -> u8 {
        T::read_status(self)
    }

    fn write_data(&mut self, value: u8) {
        T::write_data(self, value)
    }

    fn read_data(&mut self) -> u8 {
        T::read_data(self)
    }

    fn configure_clock(&mut self, prescaler: u8, bit_rate: u8) {
        T::configure_clock(self, prescaler, bit_rate)
    }

    fn enable_pullups(&mut self) {
        T::enable_pullups(self)
    }
}
