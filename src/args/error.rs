// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{averaging::AverageFactorError, taper::TaperError};

#[derive(Error, Debug)]
pub enum FrfArgsError {
    #[error("Argument file '{0}' doesn't have a recognised file extension! Valid extensions are: {1}")]
    UnrecognisedArgFileExt(String, String),

    #[error("Couldn't decode toml structure from {file}:\n{err}")]
    TomlDecode { file: String, err: String },

    #[error("Couldn't decode json structure from {file}:\n{err}")]
    JsonDecode { file: String, err: String },

    #[error("Error when trying to parse the time average factor: {0}")]
    TimeAverageFactor(#[from] AverageFactorError),

    #[error("Unrecognised taper '{got}'; valid tapers are: {valid}")]
    UnrecognisedTaper { got: String, valid: String },

    #[error("The filter axis must be 0 (time) or 1 (frequency), but got {0}")]
    InvalidAxis(usize),

    #[error("The latitude must be between -90 and 90 degrees, but got {0}")]
    InvalidLatitude(f64),

    #[error(transparent)]
    Taper(#[from] TaperError),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}
