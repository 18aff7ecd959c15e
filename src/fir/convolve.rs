// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Convolving FIR kernels against waterfalls.

use ndarray::{prelude::*, CowArray, Zip};

use super::{check_axis, FirError};
use crate::c64;

/// Convolve `kernel` against `data * weights` along `axis` of a 2D waterfall.
/// Every lane along `axis` is convolved independently; the output has the same
/// shape as `data` ("same" mode, kernel centred).
///
/// A 1D kernel is used for every lane, and so must be as long as `axis`.
/// Otherwise, the kernel must have the same shape as the data. If `weights`
/// aren't supplied, they are all 1.
pub fn convolve_fir<D: Dimension>(
    data: ArrayView2<c64>,
    kernel: ArrayView<c64, D>,
    weights: Option<ArrayView2<f64>>,
    axis: Axis,
) -> Result<Array2<c64>, FirError> {
    check_axis(axis, 2)?;
    let shape = data.shape().to_vec();

    let kernel: CowArray<c64, Ix2> = match kernel.ndim() {
        1 => {
            let kernel = kernel.into_dimensionality::<Ix1>()?;
            if kernel.len() != data.len_of(axis) {
                return Err(FirError::ShapeMismatch {
                    what: "FIR kernel",
                    got: kernel.shape().to_vec(),
                    expected: vec![data.len_of(axis)],
                });
            }
            let other_axis = Axis(1 - axis.index());
            let kernel = kernel.insert_axis(other_axis);
            match kernel.broadcast(data.raw_dim()) {
                Some(k) => k.to_owned().into(),
                None => {
                    return Err(FirError::ShapeMismatch {
                        what: "FIR kernel",
                        got: kernel.shape().to_vec(),
                        expected: shape,
                    })
                }
            }
        }
        2 => {
            let kernel = kernel.into_dimensionality::<Ix2>()?;
            if kernel.shape() != data.shape() {
                return Err(FirError::ShapeMismatch {
                    what: "FIR kernel",
                    got: kernel.shape().to_vec(),
                    expected: shape,
                });
            }
            kernel.into()
        }
        _ => {
            return Err(FirError::ShapeMismatch {
                what: "FIR kernel",
                got: kernel.shape().to_vec(),
                expected: shape,
            })
        }
    };

    let weights: CowArray<f64, Ix2> = match weights {
        Some(w) => {
            if w.shape() != data.shape() {
                return Err(FirError::ShapeMismatch {
                    what: "weights",
                    got: w.shape().to_vec(),
                    expected: shape,
                });
            }
            w.into()
        }
        None => Array2::ones(data.raw_dim()).into(),
    };

    let mut out = Array2::zeros(data.raw_dim());
    Zip::from(out.lanes_mut(axis))
        .and(data.lanes(axis))
        .and(kernel.lanes(axis))
        .and(weights.lanes(axis))
        .par_for_each(|out, data, kernel, weights| {
            let weighted = data
                .iter()
                .zip(weights.iter())
                .map(|(&d, &w)| d * w)
                .collect::<Vec<_>>();
            convolve_same(&weighted, kernel, out);
        });

    Ok(out)
}

/// Discrete linear convolution of `a` and `v`, keeping only the central
/// `max(len(a), len(v))` samples of the full convolution.
fn convolve_same(a: &[c64], v: ArrayView1<c64>, mut out: ArrayViewMut1<c64>) {
    let n = a.len();
    let m = v.len();
    if n == 0 || m == 0 {
        return;
    }
    // The index of the full convolution that lands at output index 0.
    let offset = (n.min(m) - 1) / 2;
    out.iter_mut().enumerate().for_each(|(i, out)| {
        let k = i + offset;
        // Sum over a[j] * v[k - j] for all valid j.
        let j_start = k.saturating_sub(m - 1);
        let j_end = k.min(n - 1);
        *out = (j_start..=j_end).map(|j| a[j] * v[k - j]).sum();
    });
}
