// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaperError {
    #[error("Edge cuts of {low} (low) and {hi} (high) samples leave nothing of an axis with length {length}")]
    EdgecutsTooBig { low: usize, hi: usize, length: usize },

    #[error("Tukey window alpha must be between 0 and 1 (inclusive), but got {0}")]
    InvalidTukeyAlpha(f64),
}
