use std::str::FromStr;

use crate::core::domain::{Axis, Hemisphere};
use crate::core::error::{DmsSegment, MalformedCoordinate};

/// A parsed degrees-minutes-seconds coordinate component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    pub degrees: u32,
    pub minutes: u32,
    pub seconds: f64,
    pub hemisphere: Hemisphere,
}

impl Dms {
    /// Signed decimal degrees: `D + M/60 + S/3600`, negated for S and W.
    pub fn to_decimal(&self) -> f64 {
        let magnitude =
            self.degrees as f64 + self.minutes as f64 / 60.0 + self.seconds / 3600.0;
        self.hemisphere.sign() * magnitude
    }

    pub fn axis(&self) -> Axis {
        self.hemisphere.axis()
    }
}

impl FromStr for Dms {
    type Err = MalformedCoordinate;

    /// Parse `"D-M-S.sssH"`.
    ///
    /// The input is split on `-` into exactly three parts and the hemisphere
    /// letter is stripped from the last part before it is read as seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let last = input.chars().last().ok_or(MalformedCoordinate::Empty)?;

        let hemisphere =
            Hemisphere::from_char(last).ok_or_else(|| MalformedCoordinate::MissingHemisphere {
                input: input.to_string(),
            })?;

        let parts: Vec<&str> = input.split('-').collect();
        if parts.len() != 3 {
            return Err(MalformedCoordinate::SegmentCount {
                input: input.to_string(),
                found: parts.len(),
            });
        }

        // The hemisphere letter is ASCII, so slicing one byte off is safe.
        let seconds_text = &parts[2][..parts[2].len() - 1];

        let degrees = parse_whole(input, DmsSegment::Degrees, parts[0])?;
        let minutes = parse_whole(input, DmsSegment::Minutes, parts[1])?;
        let seconds = parse_fraction(input, seconds_text)?;

        let max_degrees = hemisphere.axis().max_degrees() as u32;
        if degrees > max_degrees
            || (degrees == max_degrees && (minutes > 0 || seconds > 0.0))
        {
            return Err(out_of_range(input, DmsSegment::Degrees, degrees as f64));
        }
        if minutes > 59 {
            return Err(out_of_range(input, DmsSegment::Minutes, minutes as f64));
        }
        if seconds >= 60.0 {
            return Err(out_of_range(input, DmsSegment::Seconds, seconds));
        }

        Ok(Dms {
            degrees,
            minutes,
            seconds,
            hemisphere,
        })
    }
}

fn out_of_range(input: &str, segment: DmsSegment, value: f64) -> MalformedCoordinate {
    MalformedCoordinate::OutOfRange {
        input: input.to_string(),
        segment,
        value,
    }
}

fn invalid(input: &str, segment: DmsSegment, value: &str) -> MalformedCoordinate {
    MalformedCoordinate::InvalidSegment {
        input: input.to_string(),
        segment,
        value: value.to_string(),
    }
}

fn parse_whole(input: &str, segment: DmsSegment, text: &str) -> Result<u32, MalformedCoordinate> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(input, segment, text));
    }
    text.parse::<u32>()
        .map_err(|_| invalid(input, segment, text))
}

fn parse_fraction(input: &str, text: &str) -> Result<f64, MalformedCoordinate> {
    let text = text.trim();
    let well_formed = !text.is_empty()
        && text.bytes().all(|b| b.is_ascii_digit() || b == b'.')
        && text.bytes().filter(|b| *b == b'.').count() <= 1
        && text.bytes().any(|b| b.is_ascii_digit());
    if !well_formed {
        return Err(invalid(input, DmsSegment::Seconds, text));
    }
    text.parse::<f64>()
        .map_err(|_| invalid(input, DmsSegment::Seconds, text))
}

/// Convert a DMS string such as `"40-26-46.00N"` to signed decimal degrees.
///
/// # Arguments
/// * `text` - `D-M-S.sssH` with H one of N, S, E, W
///
/// # Returns
/// * `Ok(f64)` - degrees, negative for S and W
/// * `Err(MalformedCoordinate)` - shape or range violation
///
/// # Example
/// ```
/// use dashfeed::parsing::dms::parse_dms;
/// let lat = parse_dms("40-26-46.00N").unwrap();
/// assert!((lat - 40.446111).abs() < 1e-4);
/// ```
pub fn parse_dms(text: &str) -> Result<f64, MalformedCoordinate> {
    text.parse::<Dms>().map(|dms| dms.to_decimal())
}

/// Like [`parse_dms`], but also requires the hemisphere letter to belong to
/// `axis` (N/S for latitude, E/W for longitude).
pub fn parse_dms_on_axis(text: &str, axis: Axis) -> Result<f64, MalformedCoordinate> {
    let dms = text.parse::<Dms>()?;
    if dms.axis() != axis {
        return Err(MalformedCoordinate::WrongAxis {
            input: text.trim().to_string(),
            expected: match axis {
                Axis::Latitude => "latitude",
                Axis::Longitude => "longitude",
            },
        });
    }
    Ok(dms.to_decimal())
}
