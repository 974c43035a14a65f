use embedded_hal::digital::{ErrorType, InputPin, OutputPin};

/// A bidirectional data line.
///
/// The driver drives DATA while shifting a command out or acknowledging a
/// byte, and samples it while waiting for the sensor or reading data bits.
/// Implementors switch the pin between those two roles.
pub trait DataLine: InputPin + OutputPin {
    /// Stops driving the line so the sensor can pull it low.
    fn set_as_input(&mut self) -> Result<(), Self::Error>;

    /// Takes the line back so that writes reach the bus.
    fn set_as_output(&mut self) -> Result<(), Self::Error>;
}

/// Adapter for a pin configured as open-drain with a pull-up.
///
/// This is the usual SHT1x wiring. Driving the pin high releases the line,
/// so "input" just means writing high and leaving it there. Reads work in
/// either role because the pin's input buffer stays connected.
pub struct OpenDrain<P>(pub P);

impl<P> OpenDrain<P> {
    /// Wraps a pin already configured as open-drain.
    pub fn new(pin: P) -> Self {
        OpenDrain(pin)
    }

    /// Returns the wrapped pin.
    pub fn into_inner(self) -> P {
        self.0
    }
}

impl<P: ErrorType> ErrorType for OpenDrain<P> {
    type Error = P::Error;
}

impl<P: InputPin> InputPin for OpenDrain<P> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.0.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.0.is_low()
    }
}

impl<P: OutputPin> OutputPin for OpenDrain<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }
}

impl<P: InputPin + OutputPin> DataLine for OpenDrain<P> {
    fn set_as_input(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }

    fn set_as_output(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
