use embedded_hal::{delay::DelayNs, digital::OutputPin};

use crate::command::{Command, InvalidCommand};
use crate::conversion;
use crate::error::{Sht1xError, Wait};
use crate::line::DataLine;

/// Timing and timeout settings for the driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Time (in microseconds) to hold the bus after every line write.
    ///
    /// Guarantees the sensor's minimum clock pulse width no matter how fast
    /// the host toggles its pins.
    pub clock_delay_us: u32,
    /// Polls of DATA, one microsecond apart, to wait for the command
    /// acknowledgment and for the sensor to release the bus.
    ///
    /// DATA is always sampled at least once, even with a budget of 0.
    pub ack_timeout_us: u32,
    /// Polls of DATA, one millisecond apart, to wait for a measurement.
    ///
    /// A 14-bit measurement takes up to 320 ms.
    pub measurement_timeout_ms: u32,
    /// Pause between the humidity and the temperature measurement in [`Sht1x::read`].
    pub inter_read_delay_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            clock_delay_us: 1,
            ack_timeout_us: 1_000,
            measurement_timeout_ms: 400,
            inter_read_delay_ms: 15,
        }
    }
}

/// Driver for the SHT1x temperature and humidity sensor.
pub struct Sht1x<CLK, DATA, D> {
    clock: CLK,
    data: DATA,
    delay: D,
    config: Config,
}

/// Temperature measurement.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Temperature {
    /// 14-bit code as read from the sensor.
    pub raw: u16,
    /// Temperature in degrees Fahrenheit.
    pub fahrenheit: f32,
}

impl Temperature {
    /// Converts a 14-bit raw code to a temperature.
    pub fn from_raw(raw: u16) -> Self {
        Temperature {
            raw,
            fahrenheit: conversion::temperature_f(raw),
        }
    }

    /// Temperature in degrees Celsius.
    pub fn celsius(&self) -> f32 {
        conversion::fahrenheit_to_celsius(self.fahrenheit)
    }
}

/// Relative humidity measurement.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Humidity {
    /// 12-bit code as read from the sensor.
    pub raw: u16,
    /// Relative humidity in percent, valid at 25 °C.
    pub linear: f32,
    /// Relative humidity in percent, compensated for the reference temperature.
    pub compensated: f32,
}

impl Humidity {
    /// Linearizes `raw` and compensates it for `reference_c` degrees Celsius.
    pub fn from_raw(raw: u16, reference_c: f32) -> Self {
        Humidity {
            raw,
            linear: conversion::humidity_linear(raw),
            compensated: conversion::humidity_compensated(raw, reference_c),
        }
    }
}

/// Reading returned by a full measurement cycle.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature measured after the humidity.
    pub temperature: Temperature,
    /// Humidity compensated with `temperature`.
    pub humidity: Humidity,
}

impl<CLK, DATA, D, E> Sht1x<CLK, DATA, D>
where
    CLK: OutputPin<Error = E>,
    DATA: DataLine<Error = E>,
    D: DelayNs,
{
    /// Creates a new instance of the SHT1x driver with the default [`Config`].
    ///
    /// # Arguments
    ///
    /// * `clock` - The GPIO pin connected to SCK.
    /// * `data` - The GPIO line connected to DATA. See [`crate::OpenDrain`].
    /// * `delay` - A delay provider implementing the `DelayNs` trait.
    pub fn new(clock: CLK, data: DATA, delay: D) -> Self {
        Self::with_config(clock, data, delay, Config::default())
    }

    /// Creates a new instance of the SHT1x driver with custom timing.
    pub fn with_config(clock: CLK, data: DATA, delay: D, config: Config) -> Self {
        Sht1x {
            clock,
            data,
            delay,
            config,
        }
    }

    /// Returns the timing settings in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Destroys the driver and returns the pins and the delay provider.
    pub fn release(self) -> (CLK, DATA, D) {
        (self.clock, self.data, self.delay)
    }

    /// Runs a full measurement cycle.
    ///
    /// Humidity is measured first, then temperature, and the humidity is
    /// compensated with the temperature from the same cycle.
    pub fn read(&mut self) -> Result<Reading, Sht1xError<E>> {
        let humidity_raw = self.read_humidity_raw()?;
        self.delay.delay_ms(self.config.inter_read_delay_ms);
        let temperature = self.read_temperature()?;

        Ok(Reading {
            temperature,
            humidity: Humidity::from_raw(humidity_raw, temperature.celsius()),
        })
    }

    /// Measures the temperature.
    pub fn read_temperature(&mut self) -> Result<Temperature, Sht1xError<E>> {
        Ok(Temperature::from_raw(self.read_temperature_raw()?))
    }

    /// Measures the temperature in degrees Fahrenheit.
    pub fn read_temperature_f(&mut self) -> Result<f32, Sht1xError<E>> {
        Ok(self.read_temperature()?.fahrenheit)
    }

    /// Measures the relative humidity.
    ///
    /// # Arguments
    ///
    /// * `reference_c` - Current temperature in degrees Celsius, used for compensation.
    pub fn read_humidity(&mut self, reference_c: f32) -> Result<Humidity, Sht1xError<E>> {
        Ok(Humidity::from_raw(self.read_humidity_raw()?, reference_c))
    }

    /// Measures the relative humidity in percent, compensated for `reference_c`.
    pub fn read_humidity_compensated(&mut self, reference_c: f32) -> Result<f32, Sht1xError<E>> {
        Ok(self.read_humidity(reference_c)?.compensated)
    }

    /// Measures the raw 14-bit temperature code.
    pub fn read_temperature_raw(&mut self) -> Result<u16, Sht1xError<E>> {
        self.read_raw(Command::Temperature)
    }

    /// Measures the raw 12-bit humidity code.
    pub fn read_humidity_raw(&mut self) -> Result<u16, Sht1xError<E>> {
        self.read_raw(Command::Humidity)
    }

    /// Performs one complete transaction for `command`.
    ///
    /// The first byte starts with the command's idle bits. The host
    /// acknowledges it, reads the second byte and then declines the CRC.
    fn read_raw(&mut self, command: Command) -> Result<u16, Sht1xError<E>> {
        self.start()?;
        self.send_command(command)?;

        let raw = self.capture_bits(0, command.idle_bits(), command.leading_bits())?;
        self.acknowledge_byte()?;
        let raw = self.capture_bits(raw, 0, 8)?;
        self.end_transmission()?;

        #[cfg(feature = "defmt")]
        defmt::debug!("SHT1x {} raw = {}", command, raw);

        Ok(raw)
    }

    /// Sends the transmission start sequence.
    ///
    /// DATA falls while SCK is high, then rises again during the next high
    /// SCK pulse.
    pub fn start(&mut self) -> Result<(), Sht1xError<E>> {
        self.write_data(true)?;
        self.write_clock(false)?;
        self.data.set_as_output()?;

        self.write_clock(true)?;
        self.write_data(false)?;
        self.write_clock(false)?;
        self.write_clock(true)?;
        self.write_data(true)?;
        self.write_clock(false)?;
        self.write_data(false)?;
        Ok(())
    }

    /// Shifts `command` out MSB first and waits until the measurement is ready.
    ///
    /// The sensor latches each bit on the rising edge of SCK and pulls DATA
    /// low to acknowledge the byte. After the ninth clock it releases DATA
    /// and pulls it low again once the result is ready.
    ///
    /// # Errors
    ///
    /// Returns `Sht1xError::BusTimeout` if any of the three waits runs out.
    pub fn send_command(&mut self, command: Command) -> Result<(), Sht1xError<E>> {
        #[cfg(feature = "defmt")]
        defmt::trace!("SHT1x sending {}", command);

        self.data.set_as_output()?;
        for bit in command.bits() {
            self.write_clock(false)?;
            self.write_data(bit)?;
            self.write_clock(true)?;
        }
        self.write_clock(false)?;

        self.data.set_as_input()?;
        self.wait_for_data(false, Wait::CommandAck)?;
        self.write_clock(true)?;
        self.write_clock(false)?;

        self.wait_for_data(true, Wait::BusRelease)?;
        self.wait_for_data(false, Wait::MeasurementReady)?;
        Ok(())
    }

    /// Sends a command given as a sequence of 0/1 values, MSB first.
    ///
    /// # Errors
    ///
    /// Returns `Sht1xError::InvalidCommand` without touching the bus if
    /// `bits` is not a supported measurement command, otherwise the errors
    /// of [`Sht1x::send_command`].
    pub fn send_command_bits(&mut self, bits: &[u8]) -> Result<Command, Sht1xError<E>> {
        let command =
            Command::from_bits(bits).map_err(|InvalidCommand| Sht1xError::InvalidCommand)?;
        self.send_command(command)?;
        Ok(command)
    }

    /// Clocks in bits from the sensor, MSB first.
    ///
    /// DATA must already be an input.
    ///
    /// # Arguments
    ///
    /// * `raw` - Accumulator to extend; pass 0 for the first group.
    /// * `idle_cycles` - Clock pulses to discard before sampling.
    /// * `data_bits` - Bits to shift into `raw`.
    pub fn capture_bits(
        &mut self,
        mut raw: u16,
        idle_cycles: u8,
        data_bits: u8,
    ) -> Result<u16, Sht1xError<E>> {
        for _ in 0..idle_cycles {
            self.write_clock(true)?;
            self.write_clock(false)?;
        }

        for _ in 0..data_bits {
            raw <<= 1;
            self.write_clock(true)?;
            if self.data.is_high()? {
                raw |= 1;
            }
            self.write_clock(false)?;
        }

        Ok(raw)
    }

    /// Acknowledges a received byte so the sensor sends the next one.
    pub fn acknowledge_byte(&mut self) -> Result<(), Sht1xError<E>> {
        self.data.set_as_output()?;
        self.write_data(false)?;
        self.write_clock(true)?;
        self.write_clock(false)?;
        self.data.set_as_input()?;
        Ok(())
    }

    /// Skips the acknowledgment of the last byte, ending the transmission.
    pub fn end_transmission(&mut self) -> Result<(), Sht1xError<E>> {
        self.data.set_as_output()?;
        self.write_data(true)?;
        self.write_clock(true)?;
        self.write_clock(false)?;
        Ok(())
    }

    fn write_clock(&mut self, high: bool) -> Result<(), E> {
        if high {
            self.clock.set_high()?;
        } else {
            self.clock.set_low()?;
        }
        self.delay.delay_us(self.config.clock_delay_us);
        Ok(())
    }

    fn write_data(&mut self, high: bool) -> Result<(), E> {
        if high {
            self.data.set_high()?;
        } else {
            self.data.set_low()?;
        }
        self.delay.delay_us(self.config.clock_delay_us);
        Ok(())
    }

    /// Waits until the data line reaches `high` or the budget for `stage` runs out.
    fn wait_for_data(&mut self, high: bool, stage: Wait) -> Result<(), Sht1xError<E>> {
        let polls = match stage {
            Wait::CommandAck | Wait::BusRelease => self.config.ack_timeout_us,
            Wait::MeasurementReady => self.config.measurement_timeout_ms,
        };
        Self::wait_for_state(&mut self.delay, stage, polls, || {
            self.data.is_high().map(|level| level == high)
        })
    }

    /// Generic wait loop that checks a pin condition until true or timeout.
    ///
    /// # Arguments
    ///
    /// * `delay` - Delay provider
    /// * `stage` - Which wait this is; measurement waits poll every millisecond,
    ///   the others every microsecond
    /// * `polls` - Maximum number of times to check `condition`; it is
    ///   checked at least once
    /// * `condition` - Closure that returns true when the expected condition is met
    ///
    /// # Errors
    ///
    /// Returns `Sht1xError::BusTimeout(stage)` if the timeout is exceeded
    fn wait_for_state<F>(
        delay: &mut D,
        stage: Wait,
        polls: u32,
        mut condition: F,
    ) -> Result<(), Sht1xError<E>>
    where
        F: FnMut() -> Result<bool, E>,
    {
        for _ in 0..polls.max(1) {
            if condition()? {
                return Ok(());
            }
            match stage {
                Wait::MeasurementReady => delay.delay_ms(1),
                Wait::CommandAck | Wait::BusRelease => delay.delay_us(1),
            }
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("SHT1x timed out waiting for {}", stage);

        Err(Sht1xError::BusTimeout(stage))
    }
}
