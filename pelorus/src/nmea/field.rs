// Copyright (c) 2024 Rowan Calder. All rights reserved.
// Use of this source is governed by General Public License that can be found
// in the LICENSE file.

//! Typed field extractors. Each one consumes the fields it needs from
//! the walker and is total: a missing field becomes `Ok(None)` when the
//! caller marked it optional, otherwise a `FieldError` that fails the
//! whole sentence.

use std::fmt;

use super::line::LineWalker;
use crate::fixedpoint::{HundredthsU16, HundredthsU8, TenthsI16, TenthsU16, TenthsU32};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    Missing,
    Invalid,
}

/// A sentence-local validation failure; the sentence is dropped and the
/// parser stays ready for the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: FieldErrorKind,
}

impl FieldError {
    pub(super) const fn missing(field: &'static str) -> Self {
        Self {
            field,
            kind: FieldErrorKind::Missing,
        }
    }

    pub(super) const fn invalid(field: &'static str) -> Self {
        Self {
            field,
            kind: FieldErrorKind::Invalid,
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            FieldErrorKind::Missing => write!(f, "missing {} field", self.field),
            FieldErrorKind::Invalid => write!(f, "bad {} field", self.field),
        }
    }
}

fn take<'a>(
    walker: &mut LineWalker<'a>,
    field: &'static str,
    optional: bool,
) -> Result<Option<&'a str>, FieldError> {
    match walker.next_field() {
        Some(view) if !view.is_empty() => Ok(Some(view)),
        _ if optional => Ok(None),
        _ => Err(FieldError::missing(field)),
    }
}

macro_rules! unsigned_field {
    ($name: ident, $ty: ty) => {
        /// Decimal integer with an inclusive upper bound.
        pub fn $name(
            walker: &mut LineWalker,
            field: &'static str,
            optional: bool,
            max: $ty,
        ) -> Result<Option<$ty>, FieldError> {
            let Some(view) = take(walker, field, optional)? else {
                return Ok(None);
            };
            let value: $ty = view
                .parse()
                .map_err(|_| FieldError::invalid(field))?;
            if value > max {
                return Err(FieldError::invalid(field));
            }
            Ok(Some(value))
        }
    };
}

unsigned_field!(uint8, u8);
unsigned_field!(uint16, u16);
unsigned_field!(uint32, u32);

/// Signed decimal integer.
pub fn int8(
    walker: &mut LineWalker,
    field: &'static str,
    optional: bool,
) -> Result<Option<i8>, FieldError> {
    let Some(view) = take(walker, field, optional)? else {
        return Ok(None);
    };
    view.parse().map(Some).map_err(|_| FieldError::invalid(field))
}

/// Split a decimal field into whole digits and up to `max_digits` of
/// fraction, rounded half-up to exactly `max_digits` digits.
fn split_decimal(
    view: &str,
    max_digits: u32,
    field: &'static str,
) -> Result<(u32, u32), FieldError> {
    let (whole_view, frac_view) = match view.find('.') {
        Some(period) => (&view[..period], &view[period + 1..]),
        None => (view, ""),
    };

    let whole: u32 = if whole_view.is_empty() {
        0
    } else {
        whole_view.parse().map_err(|_| FieldError::invalid(field))?
    };

    let digits: Vec<u32> = frac_view
        .chars()
        .map(|c| c.to_digit(10).ok_or(FieldError::invalid(field)))
        .collect::<Result<_, _>>()?;

    let mut fraction: u32 = 0;
    for position in 0..max_digits as usize {
        fraction = fraction * 10 + digits.get(position).copied().unwrap_or(0);
    }
    // One extra digit decides the half-up rounding.
    if digits.get(max_digits as usize).copied().unwrap_or(0) >= 5 {
        fraction += 1;
    }

    Ok((whole, fraction))
}

/// Value with one decimal digit, rounded half-up.
pub fn tenths_u16(
    walker: &mut LineWalker,
    field: &'static str,
    optional: bool,
) -> Result<Option<TenthsU16>, FieldError> {
    let Some(view) = take(walker, field, optional)? else {
        return Ok(None);
    };
    parse_tenths_u16(view, field).map(Some)
}

fn parse_tenths_u16(view: &str, field: &'static str) -> Result<TenthsU16, FieldError> {
    let (whole, tenths) = split_decimal(view, 1, field)?;
    if whole > u32::from(u16::MAX) {
        return Err(FieldError::invalid(field));
    }
    Ok(TenthsU16::from_tenths(whole * 10 + tenths))
}

/// Signed value with one decimal digit, rounded half-up on the
/// magnitude.
pub fn tenths_i16(
    walker: &mut LineWalker,
    field: &'static str,
    optional: bool,
) -> Result<Option<TenthsI16>, FieldError> {
    let Some(view) = take(walker, field, optional)? else {
        return Ok(None);
    };
    let (negative, magnitude_view) = match view.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, view),
    };
    let (whole, tenths) = split_decimal(magnitude_view, 1, field)?;
    if whole > 32767 {
        return Err(FieldError::invalid(field));
    }
    #[allow(clippy::cast_possible_wrap)]
    let mut scaled = (whole * 10 + tenths) as i32;
    if negative {
        scaled = -scaled;
    }
    Ok(Some(TenthsI16::from_tenths(scaled)))
}

/// 32-bit value with one decimal digit, rounded half-up.
pub fn tenths_u32(
    walker: &mut LineWalker,
    field: &'static str,
    optional: bool,
) -> Result<Option<TenthsU32>, FieldError> {
    let Some(view) = take(walker, field, optional)? else {
        return Ok(None);
    };
    let (whole, tenths) = split_decimal(view, 1, field)?;
    Ok(Some(TenthsU32::from_tenths(
        u64::from(whole) * 10 + u64::from(tenths),
    )))
}

/// Value with two decimal digits, rounded half-up.
pub fn hundredths_u8(
    walker: &mut LineWalker,
    field: &'static str,
    optional: bool,
) -> Result<Option<HundredthsU8>, FieldError> {
    let Some(view) = take(walker, field, optional)? else {
        return Ok(None);
    };
    let (whole, hundredths) = split_decimal(view, 2, field)?;
    if whole > u32::from(u8::MAX) {
        return Err(FieldError::invalid(field));
    }
    #[allow(clippy::cast_possible_truncation)]
    let scaled = (whole * 100 + hundredths) as u16;
    Ok(Some(HundredthsU8::from_hundredths(scaled)))
}

/// 16-bit value with two decimal digits, rounded half-up.
pub fn hundredths_u16(
    walker: &mut LineWalker,
    field: &'static str,
    optional: bool,
) -> Result<Option<HundredthsU16>, FieldError> {
    let Some(view) = take(walker, field, optional)? else {
        return Ok(None);
    };
    let (whole, hundredths) = split_decimal(view, 2, field)?;
    if whole > u32::from(u16::MAX) {
        return Err(FieldError::invalid(field));
    }
    Ok(Some(HundredthsU16::from_hundredths(whole * 100 + hundredths)))
}

/// Unit tag letters that appear as literal words between data fields.
pub fn constant_word(
    walker: &mut LineWalker,
    field: &'static str,
    expected: &str,
) -> Result<(), FieldError> {
    match walker.next_field() {
        Some(view) if view == expected => Ok(()),
        Some(_) => Err(FieldError::invalid(field)),
        None => Err(FieldError::missing(field)),
    }
}

/// Time of day `HHMMSS[.ffffff...]` with strict range checks. The
/// fractional digit count is preserved for republication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NmeaTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub fraction: u32,
    pub precision: u8,
}

impl NmeaTime {
    #[must_use]
    pub fn to_wire(&self) -> String {
        let mut out = format!("{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds);
        if self.precision > 0 {
            out.push('.');
            out.push_str(&format!(
                "{:0width$}",
                self.fraction,
                width = self.precision as usize
            ));
        }
        out
    }
}

impl fmt::Display for NmeaTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

pub fn time(
    walker: &mut LineWalker,
    optional: bool,
) -> Result<Option<NmeaTime>, FieldError> {
    const FIELD: &str = "Time";
    let Some(view) = take(walker, FIELD, optional)? else {
        return Ok(None);
    };
    if view.len() < 6 || !view.is_ascii() {
        return Err(FieldError::invalid(FIELD));
    }

    let hours = fixed_digits(&view[0..2], FIELD)?;
    let minutes = fixed_digits(&view[2..4], FIELD)?;
    let seconds = fixed_digits(&view[4..6], FIELD)?;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return Err(FieldError::invalid(FIELD));
    }

    let (fraction, precision) = if view.len() > 6 {
        let frac_view = &view[6..];
        let Some(digits) = frac_view.strip_prefix('.') else {
            return Err(FieldError::invalid(FIELD));
        };
        if digits.is_empty() || digits.len() > 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FieldError::invalid(FIELD));
        }
        let fraction = digits.parse().map_err(|_| FieldError::invalid(FIELD))?;
        #[allow(clippy::cast_possible_truncation)]
        let precision = digits.len() as u8;
        (fraction, precision)
    } else {
        (0, 0)
    };

    Ok(Some(NmeaTime {
        hours,
        minutes,
        seconds,
        fraction,
        precision,
    }))
}

/// Date `DDMMYY`. Two digit years 70..99 resolve to 19xx, the rest to
/// 20xx; published as ISO `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NmeaDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl NmeaDate {
    #[must_use]
    pub fn to_wire(&self) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for NmeaDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

pub fn date(
    walker: &mut LineWalker,
    optional: bool,
) -> Result<Option<NmeaDate>, FieldError> {
    const FIELD: &str = "Date";
    let Some(view) = take(walker, FIELD, optional)? else {
        return Ok(None);
    };
    if view.len() != 6 || !view.is_ascii() {
        return Err(FieldError::invalid(FIELD));
    }

    let day = fixed_digits(&view[0..2], FIELD)?;
    let month = fixed_digits(&view[2..4], FIELD)?;
    let short_year = fixed_digits(&view[4..6], FIELD)?;
    if day == 0 || day > 31 || month == 0 || month > 12 {
        return Err(FieldError::invalid(FIELD));
    }

    let year = if short_year >= 70 {
        1900 + u16::from(short_year)
    } else {
        2000 + u16::from(short_year)
    };
    Ok(Some(NmeaDate { year, month, day }))
}

/// A latitude or longitude with its hemisphere suffix. Published as
/// `D°M.MMMMM'H`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub degrees: u8,
    pub minutes: f64,
    pub hemisphere: char,
}

impl Coordinate {
    #[must_use]
    pub fn to_wire(&self) -> String {
        format!("{}\u{00b0}{:.5}'{}", self.degrees, self.minutes, self.hemisphere)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_wire())
    }
}

/// Latitude `DDMM.mmm...` plus an `N`/`S` hemisphere field.
pub fn latitude(
    walker: &mut LineWalker,
    optional: bool,
) -> Result<Option<Coordinate>, FieldError> {
    coordinate(walker, "Latitude", optional, 2, 90, ['N', 'S'])
}

/// Longitude `DDDMM.mmm...` plus an `E`/`W` hemisphere field.
pub fn longitude(
    walker: &mut LineWalker,
    optional: bool,
) -> Result<Option<Coordinate>, FieldError> {
    coordinate(walker, "Longitude", optional, 3, 180, ['E', 'W'])
}

fn coordinate(
    walker: &mut LineWalker,
    field: &'static str,
    optional: bool,
    degree_digits: usize,
    max_degrees: u8,
    hemispheres: [char; 2],
) -> Result<Option<Coordinate>, FieldError> {
    let value_view = match walker.next_field() {
        Some(view) if !view.is_empty() => Some(view),
        Some(_) | None => None,
    };
    let hemisphere_view = match walker.next_field() {
        Some(view) if !view.is_empty() => Some(view),
        Some(_) | None => None,
    };

    let (Some(value_view), Some(hemisphere_view)) = (value_view, hemisphere_view) else {
        if optional {
            return Ok(None);
        }
        return Err(FieldError::missing(field));
    };

    if value_view.len() < degree_digits + 2 || !value_view.is_ascii() {
        return Err(FieldError::invalid(field));
    }
    let degrees: u8 = value_view[..degree_digits]
        .parse()
        .map_err(|_| FieldError::invalid(field))?;
    if degrees > max_degrees {
        return Err(FieldError::invalid(field));
    }

    let minutes_view = &value_view[degree_digits..];
    let whole_minutes: u8 = minutes_view[..2]
        .parse()
        .map_err(|_| FieldError::invalid(field))?;
    if whole_minutes > 59 {
        return Err(FieldError::invalid(field));
    }
    let minutes: f64 = if minutes_view.len() > 2 {
        if !minutes_view[2..].starts_with('.') {
            return Err(FieldError::invalid(field));
        }
        minutes_view.parse().map_err(|_| FieldError::invalid(field))?
    } else {
        f64::from(whole_minutes)
    };

    let mut chars = hemisphere_view.chars();
    let hemisphere = chars.next().ok_or(FieldError::invalid(field))?;
    if chars.next().is_some() || !hemispheres.contains(&hemisphere) {
        return Err(FieldError::invalid(field));
    }

    Ok(Some(Coordinate {
        degrees,
        minutes,
        hemisphere,
    }))
}

/// Heading offset: unsigned value plus an `E`/`W` direction field.
/// Westerly offsets are positive, easterly negative.
pub fn heading_offset(
    walker: &mut LineWalker,
    field: &'static str,
) -> Result<Option<TenthsI16>, FieldError> {
    let value_view = walker.next_field().ok_or(FieldError::missing(field))?;
    let direction_view = walker.next_field().ok_or(FieldError::missing(field))?;
    if value_view.is_empty() || direction_view.is_empty() {
        return Ok(None);
    }

    let magnitude = parse_tenths_u16(value_view, field)?;
    #[allow(clippy::cast_possible_wrap)]
    let scaled = magnitude.as_tenths() as i32;
    let signed = match direction_view {
        "W" => scaled,
        "E" => -scaled,
        _ => return Err(FieldError::invalid(field)),
    };
    Ok(Some(TenthsI16::from_tenths(signed)))
}

/// Data valid field: `A` valid, `V` invalid.
pub fn data_valid(walker: &mut LineWalker, optional: bool) -> Result<bool, FieldError> {
    const FIELD: &str = "Data Valid";
    let Some(view) = take(walker, FIELD, optional)? else {
        return Ok(false);
    };
    match view {
        "A" => Ok(true),
        "V" => Ok(false),
        _ => Err(FieldError::invalid(FIELD)),
    }
}

/// FAA mode indicator, absent on pre-2.3 sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaaMode {
    Autonomous,
    Caution,
    Differential,
    Estimated,
    RtkFloat,
    Manual,
    DataNotValid,
    Precise,
    RtkInteger,
    Simulated,
    Unsafe,
}

impl FaaMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Autonomous => "Autonomous",
            Self::Caution => "Caution",
            Self::Differential => "Differential",
            Self::Estimated => "Estimated",
            Self::RtkFloat => "RTK Float",
            Self::Manual => "Manual",
            Self::DataNotValid => "Data Not Valid",
            Self::Precise => "Precise",
            Self::RtkInteger => "RTK Integer",
            Self::Simulated => "Simulated",
            Self::Unsafe => "Unsafe",
        }
    }
}

impl fmt::Display for FaaMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn faa_mode(walker: &mut LineWalker) -> Result<Option<FaaMode>, FieldError> {
    const FIELD: &str = "FAA Mode Indicator";
    let Some(view) = take(walker, FIELD, true)? else {
        return Ok(None);
    };
    let mode = match view {
        "A" => FaaMode::Autonomous,
        "C" => FaaMode::Caution,
        "D" => FaaMode::Differential,
        "E" => FaaMode::Estimated,
        "F" => FaaMode::RtkFloat,
        "M" => FaaMode::Manual,
        "N" => FaaMode::DataNotValid,
        "P" => FaaMode::Precise,
        "R" => FaaMode::RtkInteger,
        "S" => FaaMode::Simulated,
        "U" => FaaMode::Unsafe,
        _ => return Err(FieldError::invalid(FIELD)),
    };
    Ok(Some(mode))
}

/// GPS quality digit from GGA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpsQuality {
    FixNotAvailable,
    Gps,
    DifferentialGps,
    Pps,
    RealTimeKinematic,
    FloatRtk,
    Estimated,
    ManualInput,
    Simulated,
}

impl GpsQuality {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FixNotAvailable => "Fix Not Available",
            Self::Gps => "GPS",
            Self::DifferentialGps => "Differential GPS",
            Self::Pps => "PPS",
            Self::RealTimeKinematic => "Real Time Kinematic",
            Self::FloatRtk => "Float RTK",
            Self::Estimated => "Estimated",
            Self::ManualInput => "Manual Input",
            Self::Simulated => "Simulated",
        }
    }
}

impl fmt::Display for GpsQuality {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn gps_quality(walker: &mut LineWalker) -> Result<GpsQuality, FieldError> {
    const FIELD: &str = "GPS Quality";
    let view = take(walker, FIELD, false)?.unwrap_or("");
    let quality = match view {
        "0" => GpsQuality::FixNotAvailable,
        "1" => GpsQuality::Gps,
        "2" => GpsQuality::DifferentialGps,
        "3" => GpsQuality::Pps,
        "4" => GpsQuality::RealTimeKinematic,
        "5" => GpsQuality::FloatRtk,
        "6" => GpsQuality::Estimated,
        "7" => GpsQuality::ManualInput,
        "8" => GpsQuality::Simulated,
        _ => return Err(FieldError::invalid(FIELD)),
    };
    Ok(quality)
}

/// GSA fix mode digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpsFixMode {
    None,
    TwoDimensional,
    ThreeDimensional,
}

impl GpsFixMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::TwoDimensional => "2D",
            Self::ThreeDimensional => "3D",
        }
    }
}

impl fmt::Display for GpsFixMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn gps_fix_mode(walker: &mut LineWalker) -> Result<GpsFixMode, FieldError> {
    const FIELD: &str = "GPS Fix Mode";
    let view = take(walker, FIELD, false)?.unwrap_or("");
    match view {
        "1" => Ok(GpsFixMode::None),
        "2" => Ok(GpsFixMode::TwoDimensional),
        "3" => Ok(GpsFixMode::ThreeDimensional),
        _ => Err(FieldError::invalid(FIELD)),
    }
}

/// Wind speed units letter in MWV.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedUnits {
    Knots,
    MilesPerHour,
    KilometersPerHour,
}

impl fmt::Display for SpeedUnits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Knots => "kn",
            Self::MilesPerHour => "mph",
            Self::KilometersPerHour => "km/h",
        };
        write!(f, "{name}")
    }
}

pub fn speed_units(walker: &mut LineWalker) -> Result<SpeedUnits, FieldError> {
    const FIELD: &str = "Speed Units";
    let view = take(walker, FIELD, false)?.unwrap_or("");
    match view {
        "N" => Ok(SpeedUnits::Knots),
        "M" => Ok(SpeedUnits::MilesPerHour),
        "K" => Ok(SpeedUnits::KilometersPerHour),
        _ => Err(FieldError::invalid(FIELD)),
    }
}

/// Water temperature units letter in MTW.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnits {
    Celsius,
    Fahrenheit,
}

impl fmt::Display for TemperatureUnits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        };
        write!(f, "{name}")
    }
}

pub fn temperature_units(walker: &mut LineWalker) -> Result<TemperatureUnits, FieldError> {
    const FIELD: &str = "Temperature Units";
    let view = take(walker, FIELD, false)?.unwrap_or("");
    match view {
        "C" => Ok(TemperatureUnits::Celsius),
        "F" => Ok(TemperatureUnits::Fahrenheit),
        _ => Err(FieldError::invalid(FIELD)),
    }
}

/// Relative indicator letter in MWV: relative (apparent) or theoretical
/// (true) wind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeIndicator {
    Relative,
    Theoretical,
}

impl fmt::Display for RelativeIndicator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Relative => "Relative",
            Self::Theoretical => "Theoretical",
        };
        write!(f, "{name}")
    }
}

pub fn relative_indicator(walker: &mut LineWalker) -> Result<RelativeIndicator, FieldError> {
    const FIELD: &str = "Relative Indicator";
    let view = take(walker, FIELD, false)?.unwrap_or("");
    match view {
        "R" => Ok(RelativeIndicator::Relative),
        "T" => Ok(RelativeIndicator::Theoretical),
        _ => Err(FieldError::invalid(FIELD)),
    }
}

fn fixed_digits(view: &str, field: &'static str) -> Result<u8, FieldError> {
    if !view.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FieldError::invalid(field));
    }
    view.parse().map_err(|_| FieldError::invalid(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walker(body: &str) -> LineWalker {
        LineWalker::new(body)
    }

    #[test]
    fn test_uint8_range_check() {
        let mut w = walker("08,13");
        assert_eq!(uint8(&mut w, "n", false, 12), Ok(Some(8)));
        assert!(uint8(&mut w, "n", false, 12).is_err());
    }

    #[test]
    fn test_optional_missing_field() {
        let mut w = walker(",5");
        assert_eq!(uint16(&mut w, "n", true, 1023), Ok(None));
        assert_eq!(uint16(&mut w, "n", false, 1023), Ok(Some(5)));
        assert_eq!(
            uint16(&mut w, "n", false, 1023),
            Err(FieldError::missing("n"))
        );
    }

    #[test]
    fn test_tenths_rounding() {
        let mut w = walker("545.4,0.95,3,12.34");
        assert_eq!(
            tenths_i16(&mut w, "v", false).unwrap().unwrap().to_string(),
            "545.4"
        );
        // Two fraction digits round half-up to one.
        assert_eq!(
            tenths_u16(&mut w, "v", false).unwrap().unwrap().to_string(),
            "1.0"
        );
        assert_eq!(
            tenths_u16(&mut w, "v", false).unwrap().unwrap().to_string(),
            "3.0"
        );
        assert_eq!(
            tenths_u16(&mut w, "v", false).unwrap().unwrap().to_string(),
            "12.3"
        );
    }

    #[test]
    fn test_negative_tenths() {
        let mut w = walker("-0.5,-3.2");
        assert_eq!(
            tenths_i16(&mut w, "v", false).unwrap().unwrap().to_string(),
            "-0.5"
        );
        assert_eq!(
            tenths_i16(&mut w, "v", false).unwrap().unwrap().to_string(),
            "-3.2"
        );
    }

    #[test]
    fn test_hundredths() {
        let mut w = walker("0.9,1.056");
        assert_eq!(
            hundredths_u16(&mut w, "v", false).unwrap().unwrap().to_string(),
            "0.90"
        );
        // Three digits round half-up to two.
        assert_eq!(
            hundredths_u8(&mut w, "v", false).unwrap().unwrap().to_string(),
            "1.06"
        );
    }

    #[test]
    fn test_time_parse_and_format() {
        let mut w = walker("123519,235960,0912.5");
        assert_eq!(time(&mut w, false).unwrap().unwrap().to_wire(), "12:35:19");
        assert!(time(&mut w, false).is_err());
        assert!(time(&mut w, false).is_err());

        let mut w = walker("123519.25");
        assert_eq!(
            time(&mut w, false).unwrap().unwrap().to_wire(),
            "12:35:19.25"
        );
    }

    #[test]
    fn test_time_preserves_leading_zero_fraction() {
        let mut w = walker("123519.05");
        assert_eq!(
            time(&mut w, false).unwrap().unwrap().to_wire(),
            "12:35:19.05"
        );
    }

    #[test]
    fn test_date_pivot() {
        let mut w = walker("230394,010190,311299");
        assert_eq!(date(&mut w, false).unwrap().unwrap().to_wire(), "1994-03-23");
        assert_eq!(date(&mut w, false).unwrap().unwrap().to_wire(), "2090-01-01");
        assert_eq!(date(&mut w, false).unwrap().unwrap().to_wire(), "1999-12-31");
    }

    #[test]
    fn test_latitude() {
        let mut w = walker("4807.038,N");
        let coordinate = latitude(&mut w, false).unwrap().unwrap();
        assert_eq!(coordinate.to_wire(), "48\u{00b0}7.03800'N");
    }

    #[test]
    fn test_longitude_range() {
        let mut w = walker("01131.000,E");
        let coordinate = longitude(&mut w, false).unwrap().unwrap();
        assert_eq!(coordinate.to_wire(), "11\u{00b0}31.00000'E");

        let mut w = walker("18131.000,E");
        assert!(longitude(&mut w, false).is_err());
    }

    #[test]
    fn test_heading_offset_sign() {
        let mut w = walker("3.1,W,3.1,E");
        assert_eq!(
            heading_offset(&mut w, "Variation").unwrap().unwrap().to_string(),
            "3.1"
        );
        assert_eq!(
            heading_offset(&mut w, "Variation").unwrap().unwrap().to_string(),
            "-3.1"
        );
    }

    #[test]
    fn test_constant_word() {
        let mut w = walker("M,x");
        assert!(constant_word(&mut w, "Units", "M").is_ok());
        assert!(constant_word(&mut w, "Units", "M").is_err());
    }

    #[test]
    fn test_data_valid() {
        let mut w = walker("A,V,x");
        assert_eq!(data_valid(&mut w, false), Ok(true));
        assert_eq!(data_valid(&mut w, false), Ok(false));
        assert!(data_valid(&mut w, false).is_err());
    }
}
