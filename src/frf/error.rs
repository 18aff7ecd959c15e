// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

use crate::{
    averaging::{AverageFactorError, AveragingError},
    fir::FirError,
    taper::TaperError,
    vis::{AntPair, BaselineKey, VisError},
};

#[derive(Error, Debug)]
pub enum FrfError {
    #[error("No {0} were supplied")]
    MissingMetadata(&'static str),

    #[error("There are {got} {what}, but there are {expected} timestamps")]
    MetadataLength {
        what: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("No {0} was supplied; one must be given before the filter can be built")]
    MissingCapability(&'static str),

    #[error("{0} is not in the input data")]
    MissingKey(BaselineKey),

    #[error("Rephasing {key} requires the baseline vector of {ants}, but it is unknown")]
    MissingBaseline { key: BaselineKey, ants: AntPair },

    #[error("There is no fringe-rate profile for {0}")]
    MissingProfile(BaselineKey),

    #[error("The waterfall of {key} has shape {got:?}, but the metadata expects {expected:?}")]
    WaterfallShape {
        key: BaselineKey,
        got: (usize, usize),
        expected: (usize, usize),
    },

    #[error("The fringe-rate profile has shape {got:?}, but its waterfall has shape {expected:?}")]
    ProfileShape {
        got: (usize, usize),
        expected: (usize, usize),
    },

    #[error("Failed to process {key}: {err}")]
    KeyFailed {
        key: BaselineKey,
        #[source]
        err: Box<FrfError>,
    },

    #[error(transparent)]
    AverageFactor(#[from] AverageFactorError),

    #[error(transparent)]
    Averaging(#[from] AveragingError),

    #[error(transparent)]
    Fir(#[from] FirError),

    #[error(transparent)]
    Taper(#[from] TaperError),

    #[error(transparent)]
    Vis(#[from] VisError),
}
