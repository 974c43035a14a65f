//! Simulated SHT1x on a shared two-wire bus, for driver tests.
//!
//! The sensor follows the clock edges it sees: it decodes the start
//! condition and the command byte, acknowledges, stays busy for a few polls
//! of DATA, then shifts its result word out MSB first and waits for the
//! host's acknowledgment after each byte. It records what the host sent.

use core::convert::Infallible;
use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

use crate::line::DataLine;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Idle,
    /// DATA fell while CLOCK was high.
    StartFell,
    Command { code: u8, count: u8 },
    CommandAck,
    Measuring { busy_polls: u32 },
    Transmit { byte: u8, bit: u8 },
    HostAck { byte: u8, acked: bool },
}

struct Bus {
    clock: bool,
    host_latch: bool,
    host_output: bool,
    sensor_level: bool,
    phase: Phase,
    word: u16,

    responsive: bool,
    busy_polls: u32,
    temperature: u16,
    humidity: u16,

    starts: usize,
    command_bits: Vec<bool>,
    host_acks: Vec<bool>,
}

impl Bus {
    fn level(&self) -> bool {
        let host = !self.host_output || self.host_latch;
        host && self.sensor_level
    }

    fn set_host(&mut self, latch: bool, output: bool) {
        let before = self.level();
        self.host_latch = latch;
        self.host_output = output;
        let after = self.level();

        if self.clock && before != after {
            self.data_edge_while_clock_high(after);
        }
    }

    fn data_edge_while_clock_high(&mut self, level: bool) {
        // The host only moves DATA under a high clock to signal a start, which
        // aborts whatever the sensor was doing.
        match (self.phase, level) {
            (_, false) => self.phase = Phase::StartFell,
            (Phase::StartFell, true) => {
                self.starts += 1;
                self.phase = Phase::Command { code: 0, count: 0 };
            }
            _ => {}
        }
    }

    fn clock_rising(&mut self) {
        match self.phase {
            Phase::Command { code, count } => {
                let bit = self.level();
                self.command_bits.push(bit);
                self.phase = Phase::Command {
                    code: (code << 1) | bit as u8,
                    count: count + 1,
                };
            }
            Phase::Transmit { byte, bit } => {
                let value = if byte == 0 {
                    (self.word >> 8) as u8
                } else {
                    self.word as u8
                };
                self.sensor_level = (value >> (7 - bit)) & 1 == 1;
            }
            Phase::HostAck { byte, .. } => {
                let acked = !self.level();
                self.host_acks.push(acked);
                self.phase = Phase::HostAck { byte, acked };
            }
            _ => {}
        }
    }

    fn clock_falling(&mut self) {
        match self.phase {
            Phase::Command { code, count: 8 } => {
                let word = match code {
                    0b0000_0011 => Some(self.temperature),
                    0b0000_0101 => Some(self.humidity),
                    _ => None,
                };
                match word {
                    Some(word) if self.responsive => {
                        self.word = word;
                        self.sensor_level = false;
                        self.phase = Phase::CommandAck;
                    }
                    _ => self.phase = Phase::Idle,
                }
            }
            Phase::CommandAck => {
                self.sensor_level = true;
                self.phase = Phase::Measuring {
                    busy_polls: self.busy_polls,
                };
            }
            Phase::Transmit { byte, bit } => {
                if bit == 7 {
                    self.sensor_level = true;
                    self.phase = Phase::HostAck {
                        byte,
                        acked: false,
                    };
                } else {
                    self.phase = Phase::Transmit { byte, bit: bit + 1 };
                }
            }
            Phase::HostAck { byte: 0, acked: true } => {
                self.phase = Phase::Transmit { byte: 1, bit: 0 };
            }
            Phase::HostAck { .. } => {
                self.sensor_level = true;
                self.phase = Phase::Idle;
            }
            _ => {}
        }
    }

    fn sample(&mut self) -> bool {
        assert!(!self.host_output, "DATA sampled while the host was driving it");

        if let Phase::Measuring { busy_polls } = self.phase {
            if busy_polls > 0 {
                self.phase = Phase::Measuring {
                    busy_polls: busy_polls - 1,
                };
            } else {
                self.sensor_level = false;
                self.phase = Phase::Transmit { byte: 0, bit: 0 };
            }
        }

        self.level()
    }
}

/// Handle for configuring and inspecting the simulated sensor.
pub struct Sensor {
    bus: Rc<RefCell<Bus>>,
}

impl Sensor {
    /// A sensor that answers with the given raw words.
    pub fn new(temperature: u16, humidity: u16) -> Self {
        Sensor {
            bus: Rc::new(RefCell::new(Bus {
                clock: false,
                host_latch: true,
                host_output: false,
                sensor_level: true,
                phase: Phase::Idle,
                word: 0,
                responsive: true,
                busy_polls: 3,
                temperature,
                humidity,
                starts: 0,
                command_bits: Vec::new(),
                host_acks: Vec::new(),
            })),
        }
    }

    /// A sensor that never acknowledges a command.
    pub fn unresponsive() -> Self {
        let sensor = Self::new(0, 0);
        sensor.bus.borrow_mut().responsive = false;
        sensor
    }

    /// Polls of DATA the sensor stays busy for after releasing the bus.
    /// Must be at least one so the host sees the release.
    pub fn with_busy_polls(self, busy_polls: u32) -> Self {
        assert!(busy_polls > 0);
        self.bus.borrow_mut().busy_polls = busy_polls;
        self
    }

    /// Never finish measuring.
    pub fn stuck_busy(self) -> Self {
        self.with_busy_polls(u32::MAX)
    }

    pub fn lines(&self) -> (Clock, Data) {
        (
            Clock {
                bus: self.bus.clone(),
            },
            Data {
                bus: self.bus.clone(),
            },
        )
    }

    pub fn starts(&self) -> usize {
        self.bus.borrow().starts
    }

    /// Every bit the sensor latched while receiving commands.
    pub fn command_bits(&self) -> Vec<bool> {
        self.bus.borrow().command_bits.clone()
    }

    /// Host acknowledgment seen after each transmitted byte.
    pub fn host_acks(&self) -> Vec<bool> {
        self.bus.borrow().host_acks.clone()
    }

    pub fn is_idle(&self) -> bool {
        self.bus.borrow().phase == Phase::Idle
    }
}

pub struct Clock {
    bus: Rc<RefCell<Bus>>,
}

impl ErrorType for Clock {
    type Error = Infallible;
}

impl OutputPin for Clock {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut bus = self.bus.borrow_mut();
        if bus.clock {
            bus.clock = false;
            bus.clock_falling();
        }
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut bus = self.bus.borrow_mut();
        if !bus.clock {
            bus.clock = true;
            bus.clock_rising();
        }
        Ok(())
    }
}

pub struct Data {
    bus: Rc<RefCell<Bus>>,
}

impl ErrorType for Data {
    type Error = Infallible;
}

impl InputPin for Data {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.bus.borrow_mut().sample())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.bus.borrow_mut().sample())
    }
}

impl OutputPin for Data {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mut bus = self.bus.borrow_mut();
        let output = bus.host_output;
        bus.set_host(false, output);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mut bus = self.bus.borrow_mut();
        let output = bus.host_output;
        bus.set_host(true, output);
        Ok(())
    }
}

impl DataLine for Data {
    fn set_as_input(&mut self) -> Result<(), Self::Error> {
        let mut bus = self.bus.borrow_mut();
        let latch = bus.host_latch;
        bus.set_host(latch, false);
        Ok(())
    }

    fn set_as_output(&mut self) -> Result<(), Self::Error> {
        let mut bus = self.bus.borrow_mut();
        let latch = bus.host_latch;
        bus.set_host(latch, true);
        Ok(())
    }
}
