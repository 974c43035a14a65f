/// Measurement commands understood by the sensor.
///
/// The discriminant is the 8-bit command code, transmitted MSB first.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Command {
    /// Measure temperature (14-bit result).
    Temperature = 0b0000_0011,
    /// Measure relative humidity (12-bit result).
    Humidity = 0b0000_0101,
}

impl Command {
    /// Number of bits in a command.
    pub const BITS: usize = 8;

    /// The raw command code.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Command bits in transmission order (MSB first).
    pub fn bits(self) -> [bool; Self::BITS] {
        let code = self.code();
        core::array::from_fn(|i| (code >> (7 - i)) & 1 == 1)
    }

    /// Clock cycles carrying no data at the top of the first byte.
    pub const fn idle_bits(self) -> u8 {
        match self {
            Command::Temperature => 2,
            Command::Humidity => 4,
        }
    }

    /// Data bits in the first byte, after the idle bits.
    pub const fn leading_bits(self) -> u8 {
        8 - self.idle_bits()
    }

    /// Significant bits in the raw result.
    pub const fn resolution(self) -> u8 {
        self.leading_bits() + 8
    }

    /// Builds a command from a sequence of 0/1 values, MSB first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCommand` if the sequence is not exactly eight
    /// elements long, holds a value other than 0 or 1, or spells a code that
    /// is not a supported measurement command.
    pub fn from_bits(bits: &[u8]) -> Result<Self, InvalidCommand> {
        if bits.len() != Self::BITS {
            return Err(InvalidCommand);
        }

        let mut code = 0u8;
        for &bit in bits {
            if bit > 1 {
                return Err(InvalidCommand);
            }
            code = (code << 1) | bit;
        }

        Self::try_from(code).map_err(|_| InvalidCommand)
    }
}

/// Command bits that do not name a supported measurement.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidCommand;

impl TryFrom<u8> for Command {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0b0000_0011 => Ok(Command::Temperature),
            0b0000_0101 => Ok(Command::Humidity),
            other => Err(other),
        }
    }
}
