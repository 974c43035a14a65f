//! Raw sensor codes to degrees and percent relative humidity.
//!
//! Coefficients come from the SHT1x datasheet for a 14-bit temperature
//! reading (5 V supply, Fahrenheit output) and a 12-bit humidity reading.
//! The driver applies these for you; they are public for callers that keep
//! raw codes around.

/// Temperature offset in °F.
pub const D1_F: f32 = -39.5;
/// Temperature slope in °F per count.
pub const D2_F: f32 = 0.018;

/// Humidity linearization offset in %RH.
pub const C1: f32 = -2.0468;
/// Humidity linearization slope in %RH per count.
pub const C2: f32 = 0.0367;
/// Humidity linearization curvature in %RH per count squared.
pub const C3: f32 = -0.000_001_595_5;

/// Humidity temperature compensation, constant term in %RH per °C.
pub const T1: f32 = 0.01;
/// Humidity temperature compensation, term in %RH per °C per count.
pub const T2: f32 = 0.000_08;

/// Temperature the humidity linearization was calibrated at, in °C.
pub const REFERENCE_CELSIUS: f32 = 25.0;

/// Convert a 14-bit raw temperature code to degrees Fahrenheit.
pub fn temperature_f(raw: u16) -> f32 {
    let so_t: f32 = raw.into();
    D1_F + D2_F * so_t
}

/// Convert a 12-bit raw humidity code to linear relative humidity, in percent.
///
/// The quadratic is only meaningful for codes up to 4095.
pub fn humidity_linear(raw: u16) -> f32 {
    let so_rh: f32 = raw.into();
    C1 + C2 * so_rh + C3 * so_rh * so_rh
}

/// Convert a 12-bit raw humidity code to relative humidity compensated for
/// a measurement temperature other than 25 °C.
pub fn humidity_compensated(raw: u16, temperature_c: f32) -> f32 {
    let so_rh: f32 = raw.into();
    (temperature_c - REFERENCE_CELSIUS) * (T1 + T2 * so_rh) + humidity_linear(raw)
}

/// Convert degrees Fahrenheit to degrees Celsius.
pub fn fahrenheit_to_celsius(fahrenheit: f32) -> f32 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}
