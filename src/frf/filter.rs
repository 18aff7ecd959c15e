// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fringe-rate filtering a single waterfall.

use log::trace;
use ndarray::{prelude::*, Zip};

use super::FrfError;
use crate::{
    c64,
    constants::{WEIGHT_FLOOR, ZERO_WEIGHT_TOLERANCE},
    fir::{check_axis, convolve_fir, effective_integration_ratio, profile_to_kernel},
    taper::{Taper, TaperKind},
    vis::{check_shape, Waterfall},
};

/// How to taper the edges of the filtered axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeTaper {
    pub kind: TaperKind,

    /// The number of samples to zero at the start of the axis.
    pub edgecut_low: usize,

    /// The number of samples to zero at the end of the axis.
    pub edgecut_hi: usize,
}

impl Default for EdgeTaper {
    fn default() -> Self {
        EdgeTaper {
            kind: TaperKind::None,
            edgecut_low: 0,
            edgecut_hi: 0,
        }
    }
}

/// Apply the fringe-rate profile `profile` (same shape as the waterfall) to a
/// waterfall along `axis`.
///
/// The weights are the unflagged samples multiplied by the taper window
/// (placed along `axis`); output samples with (numerically) zero weight are
/// flagged. The output sample counts are the weighted mean of the input sample
/// counts along `axis`, scaled by the effective integration ratio of the
/// profile and the fraction of `axis` with weight, and are constant along
/// `axis`.
pub fn filter_waterfall(
    waterfall: &Waterfall,
    profile: ArrayView2<c64>,
    taper: &dyn Taper,
    edge_taper: EdgeTaper,
    axis: Axis,
) -> Result<Waterfall, FrfError> {
    check_axis(axis, 2)?;
    check_shape("flags", waterfall.flags.dim(), waterfall.dim())?;
    check_shape("nsamples", waterfall.nsamples.dim(), waterfall.dim())?;
    if profile.dim() != waterfall.dim() {
        return Err(FrfError::ProfileShape {
            got: profile.dim(),
            expected: waterfall.dim(),
        });
    }
    let n = waterfall.data.len_of(axis);
    let other_axis = Axis(1 - axis.index());

    let window = taper.window(
        edge_taper.kind,
        n,
        edge_taper.edgecut_low,
        edge_taper.edgecut_hi,
    )?;
    let window = ArrayView1::from(window.as_slice()).insert_axis(other_axis);
    let weights = Zip::from(&waterfall.flags)
        .and_broadcast(&window)
        .map_collect(|&flag, &w| if flag { 0.0 } else { w });
    let flags = weights.mapv(|w: f64| w.abs() <= ZERO_WEIGHT_TOLERANCE);

    let kernel = profile_to_kernel(profile, None, axis, false)?.values;
    trace!("Convolving a {:?} waterfall along axis {}", waterfall.dim(), axis.index());
    let data = convolve_fir(waterfall.data.view(), kernel.view(), Some(weights.view()), axis)?;

    let ratio = effective_integration_ratio(profile, None, axis)?;
    let weight_sums = weights
        .sum_axis(axis)
        .mapv(|s| s.max(WEIGHT_FLOOR))
        .insert_axis(axis);
    let nsample_sums = (&waterfall.nsamples * &weights)
        .sum_axis(axis)
        .insert_axis(axis);
    let effective = Zip::from(&nsample_sums)
        .and(&weight_sums)
        .and(&ratio)
        .map_collect(|&ns, &w, &r| ns / w * r * w / n as f64);
    let mut nsamples = Array2::zeros(waterfall.dim());
    nsamples += &effective;

    Ok(Waterfall {
        data,
        flags,
        nsamples,
    })
}
