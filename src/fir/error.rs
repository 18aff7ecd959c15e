// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FirError {
    #[error("Axis {axis} is invalid for an array with {ndim} dimensions")]
    InvalidAxis { axis: usize, ndim: usize },

    #[error("The {what} has shape {got:?}, but shape {expected:?} was expected")]
    ShapeMismatch {
        what: &'static str,
        got: Vec<usize>,
        expected: Vec<usize>,
    },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}
