//! SHT1x Sensor Driver for Embedded Rust
//!
//! This crate provides a platform-agnostic, bit-banged driver for the SHT1x
//! (SHT10, SHT11, SHT15) temperature and humidity sensor, built on top of the
//! [`embedded-hal`] traits.
//!
//! The sensor speaks a two-wire protocol that looks like I2C but is not
//! compatible with it, so the driver toggles SCK and DATA itself: it sends
//! the transmission start sequence, shifts a command out, waits for the
//! acknowledgment and the end of the measurement, and clocks the result in.
//!
//! # Features
//! - Blocking synchronous API using `embedded-hal` traits
//! - Every wait on the sensor is bounded, so a missing sensor is an error, not a hang
//! - Designed for `no_std` environments
//! - Optional logging support via `defmt`
//!
//! # Dependencies
//! This driver depends on the following `embedded-hal` traits:
//! - [`OutputPin`] for SCK
//! - [`InputPin`] and [`OutputPin`] for DATA, plus direction control through [`DataLine`]
//! - [`DelayNs`] for pulse widths and timeouts
//!
//! # Example
//!
//! ```ignore
//! use sht1x_sensor::{OpenDrain, Sht1x};
//!
//! let mut sht = Sht1x::new(sck, OpenDrain::new(data), delay);
//! let reading = sht.read()?;
//! // reading.temperature.fahrenheit, reading.humidity.compensated
//! ```
//!
//! # Optional Features
//! - `defmt`: Implements `defmt::Format` for logging support and traces bus activity
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//! [`InputPin`]: embedded_hal::digital::InputPin
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs

#![cfg_attr(not(test), no_std)]

pub mod command;
pub mod conversion;
pub mod error;
pub mod line;
pub mod sht1x;

#[cfg(test)]
mod sim;

pub use command::{Command, InvalidCommand};
pub use error::{Sht1xError, Wait};
pub use line::{DataLine, OpenDrain};
pub use sht1x::{Config, Humidity, Reading, Sht1x, Temperature};
