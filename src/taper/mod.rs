// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Taper (window) functions used to down-weight the edges of an axis before
//! filtering.

mod error;
#[cfg(test)]
mod tests;

pub use error::TaperError;

use itertools::Itertools;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::constants::{DEFAULT_TUKEY_ALPHA, PI};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumIter, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum TaperKind {
    /// All ones (a.k.a. boxcar or top hat).
    #[default]
    #[strum(to_string = "none", serialize = "boxcar", serialize = "tophat")]
    None,

    #[strum(to_string = "hann")]
    Hann,

    #[strum(to_string = "blackman")]
    Blackman,

    #[strum(to_string = "blackmanharris")]
    BlackmanHarris,

    /// A cosine-tapered top hat.
    #[strum(to_string = "tukey")]
    Tukey,
}

impl TaperKind {
    /// All supported taper names, for help and error messages.
    pub fn all_names() -> String {
        TaperKind::iter().join(", ")
    }
}

/// Something that generates taper windows. Implementors must be usable from
/// many threads at once.
pub trait Taper: Send + Sync {
    /// Generate a window of `length` samples, each in [0, 1]. The first
    /// `edgecut_low` and last `edgecut_hi` samples are zero and the window
    /// function occupies everything in between.
    fn window(
        &self,
        kind: TaperKind,
        length: usize,
        edgecut_low: usize,
        edgecut_hi: usize,
    ) -> Result<Vec<f64>, TaperError>;
}

/// The standard (symmetric) window functions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardTaper {
    /// The fraction of a Tukey window inside the cosine taper. 0 is a top hat,
    /// 1 is a Hann window.
    pub tukey_alpha: f64,
}

impl Default for StandardTaper {
    fn default() -> Self {
        StandardTaper {
            tukey_alpha: DEFAULT_TUKEY_ALPHA,
        }
    }
}

impl StandardTaper {
    pub fn new(tukey_alpha: f64) -> Result<StandardTaper, TaperError> {
        if !(0.0..=1.0).contains(&tukey_alpha) {
            return Err(TaperError::InvalidTukeyAlpha(tukey_alpha));
        }
        Ok(StandardTaper { tukey_alpha })
    }
}

impl Taper for StandardTaper {
    fn window(
        &self,
        kind: TaperKind,
        length: usize,
        edgecut_low: usize,
        edgecut_hi: usize,
    ) -> Result<Vec<f64>, TaperError> {
        let n = length
            .checked_sub(edgecut_low)
            .and_then(|l| l.checked_sub(edgecut_hi))
            .filter(|&n| n > 0)
            .ok_or(TaperError::EdgecutsTooBig {
                low: edgecut_low,
                hi: edgecut_hi,
                length,
            })?;

        let mut window = vec![0.0; length];
        let centre = &mut window[edgecut_low..edgecut_low + n];
        match kind {
            TaperKind::None => centre.fill(1.0),
            TaperKind::Hann => cosine_sum(centre, &[0.5, 0.5]),
            TaperKind::Blackman => cosine_sum(centre, &[0.42, 0.5, 0.08]),
            TaperKind::BlackmanHarris => {
                cosine_sum(centre, &[0.35875, 0.48829, 0.14128, 0.01168])
            }
            TaperKind::Tukey => tukey(centre, self.tukey_alpha),
        }
        Ok(window)
    }
}

/// Fill `out` with the symmetric generalised cosine window
/// `sum_k (-1)^k a_k cos(2 pi k i / (n - 1))`.
fn cosine_sum(out: &mut [f64], coeffs: &[f64]) {
    let n = out.len();
    if n == 1 {
        out[0] = 1.0;
        return;
    }
    let denom = (n - 1) as f64;
    out.iter_mut().enumerate().for_each(|(i, w)| {
        let x = 2.0 * PI * i as f64 / denom;
        *w = coeffs
            .iter()
            .enumerate()
            .map(|(k, a)| {
                let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
                sign * a * (k as f64 * x).cos()
            })
            .sum();
    });
}

fn tukey(out: &mut [f64], alpha: f64) {
    let n = out.len();
    if alpha <= 0.0 || n == 1 {
        out.fill(1.0);
        return;
    }
    if alpha >= 1.0 {
        cosine_sum(out, &[0.5, 0.5]);
        return;
    }

    let denom = (n - 1) as f64;
    let taper_width = (alpha * denom / 2.0).floor() as usize;
    out.iter_mut().enumerate().for_each(|(i, w)| {
        let x = i as f64;
        *w = if i <= taper_width {
            0.5 * (1.0 + (PI * (-1.0 + 2.0 * x / (alpha * denom))).cos())
        } else if i >= n - taper_width - 1 {
            0.5 * (1.0 + (PI * (-2.0 / alpha + 1.0 + 2.0 * x / (alpha * denom))).cos())
        } else {
            1.0
        };
    });
}
