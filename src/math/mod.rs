// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use hifitime::{Duration, Epoch};

use crate::{
    c64,
    constants::{PI, TAU},
};

/// Complex exponential. The argument is assumed to be purely imaginary.
///
/// This function doesn't actually use complex numbers; it just returns the real
/// and imag components from Euler's formula (i.e. e^{ix} = cos{x} + i sin{x}).
///
/// # Examples
///
/// `assert_abs_diff_eq!(cexp(PI), c64::new(-1.0, 0.0));`
#[inline]
pub(crate) fn cexp(x: f64) -> c64 {
    let (im, re) = x.sin_cos();
    c64::new(re, im)
}

/// Remove the 2π discontinuities from a sequence of angles \[radians\]. Any
/// jump between consecutive angles larger than π is replaced by its 2π
/// complement, so the output is a continuous (but possibly > 2π) sequence.
pub(crate) fn unwrap_angles(angles: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(angles.len());
    let mut correction = 0.0;
    for (i, &angle) in angles.iter().enumerate() {
        if i > 0 {
            let diff = angle - angles[i - 1];
            let mut wrapped = (diff + PI).rem_euclid(TAU) - PI;
            if wrapped == -PI && diff > 0.0 {
                wrapped = PI;
            }
            if diff.abs() >= PI {
                correction += wrapped - diff;
            }
        }
        out.push(angle + correction);
    }
    out
}

/// Wrap an angle \[radians\] into [0, 2π).
#[inline]
pub(crate) fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // `rem_euclid` can round up to exactly 2π for tiny negative inputs.
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// The arithmetic mean of some numbers. An empty slice has a mean of 0.
#[inline]
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// The median of some numbers. For an even number of values, the mean of the
/// middle two values is used. `None` is returned if there aren't any values.
pub(crate) fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Get the average of some [Epoch]s. The average is taken relative to the first
/// epoch so that precision isn't lost to the large GPS-seconds values.
pub(crate) fn average_epoch<I: IntoIterator<Item = Epoch>>(es: I) -> Option<Epoch> {
    let mut iter = es.into_iter();
    let first = iter.next()?;
    let mut offsets = vec![0.0];
    offsets.extend(iter.map(|e| (e - first).to_seconds()));
    Some(first + Duration::from_seconds(mean(&offsets)))
}
