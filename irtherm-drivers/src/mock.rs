//! Scripted I2C master for driver tests

use std::collections::VecDeque;
use std::vec::Vec;

use irtherm_hal::i2c::{self, ErrorKind, I2cMaster};

/// Bus call recorded by [`MockMaster`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start(u8),
    Restart(u8),
    Write(u8),
    Read(bool),
    Stop,
}

/// Transport fault injected by [`MockMaster`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockFault(pub ErrorKind);

impl i2c::Error for MockFault {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// Records every call and answers from a script
///
/// Acknowledging calls (`start`, `restart`, `write`) are counted from zero;
/// `nack_at(n)` makes the n-th one report NACK. `fail_at(n, kind)` makes the
/// n-th call of any kind return a transport fault.
#[derive(Debug, Default)]
pub struct MockMaster {
    pub events: Vec<Event>,
    reads: VecDeque<u8>,
    acks: usize,
    nack_at: Option<usize>,
    fail_at: Option<(usize, ErrorKind)>,
}

impl MockMaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes returned by successive reads; exhausted reads return 0xFF
    pub fn with_reads(mut self, bytes: &[u8]) -> Self {
        self.reads.extend(bytes.iter().copied());
        self
    }

    pub fn nack_at(mut self, index: usize) -> Self {
        self.nack_at = Some(index);
        self
    }

    pub fn fail_at(mut self, index: usize, kind: ErrorKind) -> Self {
        self.fail_at = Some((index, kind));
        self
    }

    /// Bytes clocked out with `write`, in order
    pub fn written(&self) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Write(b) => Some(*b),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, event: Event) -> Result<(), MockFault> {
        let index = self.events.len();
        self.events.push(event);
        match self.fail_at {
            Some((at, kind)) if at == index => Err(MockFault(kind)),
            _ => Ok(()),
        }
    }

    fn ack(&mut self) -> bool {
        let index = self.acks;
        self.acks += 1;
        self.nack_at != Some(index)
    }
}

impl I2cMaster for MockMaster {
    type Error = MockFault;

    fn start(&mut self, address_rw: u8) -> Result<bool, MockFault> {
        self.record(Event::Start(address_rw))?;
        Ok(self.ack())
    }

    fn restart(&mut self, address_rw: u8) -> Result<bool, MockFault> {
        self.record(Event::Restart(address_rw))?;
        Ok(self.ack())
    }

    fn write(&mut self, byte: u8) -> Result<bool, MockFault> {
        self.record(Event::Write(byte))?;
        Ok(self.ack())
    }

    fn read(&mut self, last: bool) -> Result<u8, MockFault> {
        self.record(Event::Read(last))?;
        Ok(self.reads.pop_front().unwrap_or(0xFF))
    }

    fn stop(&mut self) -> Result<(), MockFault> {
        self.record(Event::Stop)
    }
}
