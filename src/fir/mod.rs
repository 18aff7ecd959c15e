// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Finite-impulse-response (FIR) filtering in time.

A fringe-rate profile is a weighting of a waterfall's fringe rates (the
Fourier dual of time). The profile's bins must be monotonically increasing,
i.e. the lowest fringe rate is at index 0 and zero fringe rate is at index
`n / 2`. The convention used here is a forward FFT for time -> fringe rate
and a (normalised) inverse FFT for fringe rate -> time.
 */

mod attenuation;
mod convolve;
mod error;

pub use attenuation::effective_integration_ratio;
pub use convolve::convolve_fir;
pub use error::FirError;

use log::trace;
use ndarray::prelude::*;
use rustfft::FftPlanner;

use crate::c64;

/// The output of [profile_to_kernel].
#[derive(Debug, Clone, PartialEq)]
pub struct FirConversion<D: Dimension> {
    /// The FIR kernel, or the fringe-rate profile if the conversion was
    /// inverted. Has the same shape as the input.
    pub values: Array<c64, D>,

    /// The centres of the output bins along the transformed axis, in
    /// increasing order. Only present if a bin width was supplied. The units
    /// are the reciprocal of the bin width's units.
    pub bins: Option<Vec<f64>>,
}

pub(crate) fn check_axis(axis: Axis, ndim: usize) -> Result<(), FirError> {
    if axis.index() < ndim {
        Ok(())
    } else {
        Err(FirError::InvalidAxis {
            axis: axis.index(),
            ndim,
        })
    }
}

/// Convert a fringe-rate profile into an FIR kernel along `axis`, or, if
/// `invert` is `true`, convert an FIR kernel back into a fringe-rate profile.
///
/// Going forward, the profile is inverse-FFT-shifted, inverse FFT'd, then
/// FFT-shifted; so the kernel's "zero lag" is also in the middle of the axis.
/// The inverse substitutes a forward FFT. Converting forward and then back
/// recovers the original profile.
///
/// If `bin_width` is supplied (the width of the input bins along `axis`), the
/// centres of the output bins are also returned.
pub fn profile_to_kernel<D: Dimension>(
    profile: ArrayView<c64, D>,
    bin_width: Option<f64>,
    axis: Axis,
    invert: bool,
) -> Result<FirConversion<D>, FirError> {
    check_axis(axis, profile.ndim())?;
    let n = profile.len_of(axis);
    let mut values = profile.to_owned();

    if n > 0 {
        trace!(
            "Converting a {} along axis {} with {n} bins",
            if invert { "kernel to a profile" } else { "profile to a kernel" },
            axis.index()
        );
        let mut planner = FftPlanner::<f64>::new();
        let (fft, scale) = if invert {
            (planner.plan_fft_forward(n), 1.0)
        } else {
            (planner.plan_fft_inverse(n), 1.0 / n as f64)
        };
        let mut buffer = vec![c64::default(); n];
        let mut scratch = vec![c64::default(); fft.get_inplace_scratch_len()];
        let half = n / 2;

        for mut lane in values.lanes_mut(axis) {
            ifftshift_into(lane.view(), &mut buffer);
            fft.process_with_scratch(&mut buffer, &mut scratch);
            // fftshift
            buffer.iter().enumerate().for_each(|(i, &v)| {
                lane[(i + half) % n] = v * scale;
            });
        }
    }

    let bins = bin_width.map(|width| shifted_fft_freqs(n, width));

    Ok(FirConversion { values, bins })
}

/// Undo an FFT shift, i.e. move the middle element (index `n / 2`) to index 0.
fn ifftshift_into(lane: ArrayView1<c64>, buffer: &mut [c64]) {
    let n = lane.len();
    let half = n / 2;
    buffer.iter_mut().enumerate().for_each(|(i, b)| {
        *b = lane[(i + half) % n];
    });
}

/// The sample frequencies of an `n`-point discrete Fourier transform with
/// sample spacing `d`, in the "natural" FFT order: [0, 1, ..., -2, -1] / (d n).
pub fn fft_freqs(n: usize, d: f64) -> Vec<f64> {
    let scale = 1.0 / (n as f64 * d);
    let num_positive = (n + 1) / 2;
    (0..n)
        .map(|i| {
            if i < num_positive {
                i as f64 * scale
            } else {
                -((n - i) as f64) * scale
            }
        })
        .collect()
}

/// [fft_freqs], FFT-shifted so that they are monotonically increasing.
pub fn shifted_fft_freqs(n: usize, d: f64) -> Vec<f64> {
    let freqs = fft_freqs(n, d);
    let half = n / 2;
    let mut shifted = vec![0.0; n];
    freqs.into_iter().enumerate().for_each(|(i, f)| {
        shifted[(i + half) % n] = f;
    });
    shifted
}
