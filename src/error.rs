/// Bus wait that ran out of time.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wait {
    /// Sensor never pulled DATA low after the command byte.
    CommandAck,
    /// Sensor never released DATA after the ninth clock.
    BusRelease,
    /// Sensor never signalled that the measurement was ready.
    MeasurementReady,
}

/// Possible errors from the SHT1x driver.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, PartialEq, Eq)]
pub enum Sht1xError<E> {
    /// Timed out waiting for the sensor to change the DATA line.
    BusTimeout(Wait),
    /// Command bits were malformed or name an unsupported command.
    InvalidCommand,
    /// Error from one of the GPIO lines.
    PinError(E),
}

impl<E> From<E> for Sht1xError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}
