// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to parse strings into plain numbers or some quantity with a unit.

mod error;

pub use error::UnitParseError;

use strum::IntoEnumIterator;
use strum_macros::{EnumIter, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub(crate) enum TimeFormat {
    /// Seconds
    S,

    /// Milliseconds
    Ms,
}

impl TimeFormat {
    /// Convert a quantity in this unit to seconds.
    pub(crate) fn to_seconds(self, quantity: f64) -> f64 {
        match self {
            TimeFormat::S => quantity,
            TimeFormat::Ms => quantity / 1e3,
        }
    }
}

/// Parse a string that may have a unit of time attached to it. If there's no
/// unit, the second member of the returned tuple is `None`.
pub(crate) fn parse_time(s: &str) -> Result<(f64, Option<TimeFormat>), UnitParseError> {
    // Try to parse a naked number.
    let maybe_number: Option<f64> = s.trim().parse().ok();
    if let Some(number) = maybe_number {
        return Ok((number, None));
    };

    // That didn't work; let's search over our supported formats.
    let suffix = s
        .trim()
        .trim_start_matches(|c| char::is_numeric(c) || c == '.')
        .trim();
    for time_format in TimeFormat::iter() {
        let time_format_str: &'static str = time_format.into();
        if suffix.to_uppercase() == time_format_str.to_uppercase() {
            let prefix = s.trim().trim_end_matches(char::is_alphabetic).trim();
            let number: f64 = match prefix.parse() {
                Ok(n) => n,
                Err(_) => return Err(UnitParseError::GotTimeUnitButCantParse(s.to_string())),
            };
            return Ok((number, Some(time_format)));
        }
    }

    // If we made it this far, we don't know how to parse the string.
    Err(UnitParseError::Unknown(s.to_string()))
}
