// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Rephasing drift-scan visibilities to a different local sidereal time.

While the sky drifts overhead, the phase centre of a drift-scan visibility
(zenith) tracks a different part of the sky. Before averaging visibilities
over some time, each integration can be rotated to the sky position of the
averaging window centre, which mitigates decorrelation.
 */

use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{c64, constants::*, math::cexp};

/// A baseline vector in the local topocentric frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BaselineVector {
    /// East \[metres\]
    pub e: f64,
    /// North \[metres\]
    pub n: f64,
    /// Up \[metres\]
    pub u: f64,
}

impl BaselineVector {
    pub fn new(e: f64, n: f64, u: f64) -> BaselineVector {
        BaselineVector { e, n, u }
    }

    fn dot(self, v: [f64; 3]) -> f64 {
        self.e * v[0] + self.n * v[1] + self.u * v[2]
    }
}

impl From<[f64; 3]> for BaselineVector {
    fn from([e, n, u]: [f64; 3]) -> Self {
        BaselineVector { e, n, u }
    }
}

/// Something that can rephase a waterfall. Implementors must be usable from
/// many threads at once.
pub trait Rephase: Send + Sync {
    /// Rephase each row of `data` (shape `(num_times, num_freqs)`) by its LST
    /// offset `dlsts[i_time]` \[radians\]. `freqs` are in Hz, `latitude_rad` is
    /// the observatory latitude \[radians\]. The input is not modified.
    fn rephase(
        &self,
        data: ArrayView2<c64>,
        baseline: BaselineVector,
        freqs: &[f64],
        dlsts: &[f64],
        latitude_rad: f64,
    ) -> Array2<c64>;
}

/// Rephase drift-scan visibilities by rotating the zenith pointing vector
/// about the celestial pole.
///
/// For an LST offset `dlst`, the zenith direction `s` (in the topocentric
/// frame) is rotated into `s'`, the direction of zenith `dlst` radians of
/// sidereal time away. The projection of `s' - s` onto the baseline gives the
/// extra geometric delay `tau`, which is removed by multiplying each
/// visibility by `exp(-2πi f tau)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LstRephaser;

impl LstRephaser {
    /// The change in the (topocentric, east-north-up) pointing vector of
    /// zenith after `dlst` radians of sidereal time.
    fn pointing_difference(dlst: f64, latitude_rad: f64) -> [f64; 3] {
        // Go from topocentric to equatorial coordinates (hour angle 0), then
        // back to topocentric at an hour angle of -dlst. Zenith is at a
        // declination equal to the latitude.
        let (s_ha, c_ha) = (-dlst).sin_cos();
        let (s_lat, c_lat) = latitude_rad.sin_cos();
        let s_prime = [
            s_ha * c_lat,
            c_lat * s_lat * (1.0 - c_ha),
            c_lat * c_lat * c_ha + s_lat * s_lat,
        ];
        [s_prime[0], s_prime[1], s_prime[2] - 1.0]
    }
}

impl Rephase for LstRephaser {
    fn rephase(
        &self,
        data: ArrayView2<c64>,
        baseline: BaselineVector,
        freqs: &[f64],
        dlsts: &[f64],
        latitude_rad: f64,
    ) -> Array2<c64> {
        let mut out = data.to_owned();
        out.outer_iter_mut()
            .zip(dlsts)
            .for_each(|(mut row, &dlst)| {
                let s_diff = Self::pointing_difference(dlst, latitude_rad);
                let tau = baseline.dot(s_diff) / VEL_C;
                row.iter_mut().zip(freqs).for_each(|(vis, &freq)| {
                    *vis *= cexp(-TAU * freq * tau);
                });
            });
        out
    }
}
