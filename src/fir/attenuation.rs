// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The noise attenuation of fringe-rate filters.

use ndarray::{prelude::*, CowArray, RemoveAxis, Zip};

use super::{check_axis, FirError};
use crate::{c64, constants::WEIGHT_FLOOR};

/// Calculate the ratio of the effective integration time after applying the
/// fringe-rate profile `profile` to the integration time before (see Ali et
/// al. 2015, Eqn. 9):
///
/// sum(|noise|^2) / max(sum(|profile|^2 |noise|^2), 1e-10)
///
/// Sums are taken along `axis`, which is kept with a length of 1 in the
/// output. `noise_amp` is the noise amplitude (standard deviation, not
/// variance) in fringe-rate space with the same shape as `profile`; if it isn't
/// supplied, the noise is white (all ones).
///
/// A profile passing only a fraction `f` of fringe-rate bins gives a ratio of
/// `1 / f` for white noise.
pub fn effective_integration_ratio<D>(
    profile: ArrayView<c64, D>,
    noise_amp: Option<ArrayView<f64, D>>,
    axis: Axis,
) -> Result<Array<f64, D>, FirError>
where
    D: Dimension + RemoveAxis,
{
    check_axis(axis, profile.ndim())?;
    let noise_amp: CowArray<f64, D> = match noise_amp {
        Some(n) => {
            if n.shape() != profile.shape() {
                return Err(FirError::ShapeMismatch {
                    what: "noise amplitude",
                    got: n.shape().to_vec(),
                    expected: profile.shape().to_vec(),
                });
            }
            n.into()
        }
        None => Array::ones(profile.raw_dim()).into(),
    };

    let noise_power = noise_amp.mapv(|n| n * n);
    let filtered_power = Zip::from(&profile)
        .and(&noise_power)
        .map_collect(|p, &n| p.norm_sqr() * n);
    let ratio = Zip::from(&noise_power.sum_axis(axis))
        .and(&filtered_power.sum_axis(axis))
        .map_collect(|&before, &after| before / after.max(WEIGHT_FLOOR));

    Ok(ratio.insert_axis(axis).into_dimensionality::<D>()?)
}
