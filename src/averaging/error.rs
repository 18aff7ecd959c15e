// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::vis::VisError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AveragingError {
    #[error("The time average factor ({navg}) must satisfy 0 < factor <= the number of timesteps ({num_times})")]
    InvalidNavg { navg: usize, num_times: usize },

    #[error("Rephasing was requested, but the following were not supplied: {missing}")]
    RephaseMissingInputs { missing: String },

    #[error("The {what} have length {got}, but {expected} was expected")]
    LengthMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    #[error(transparent)]
    Shape(#[from] VisError),
}

#[derive(Error, Debug)]
pub enum AverageFactorError {
    #[error("The user input was 0; this is not permitted")]
    Zero,

    #[error("The user input has no units and isn't an integer; this is not permitted")]
    NotInteger,

    #[error("A time average of {t_avg}s with a time resolution of {time_res}s makes the averaging factor 0, which is too small")]
    TooSmall { t_avg: f64, time_res: f64 },

    #[error(transparent)]
    Parse(#[from] crate::unit_parsing::UnitParseError),
}
